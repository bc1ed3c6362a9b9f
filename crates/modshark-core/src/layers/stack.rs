use crate::protocols::modbus::Mbap;

use super::{DecodeError, DecodedLayer, Layer, LayerType};

/// Raw bytes a decoder rejected, kept as an undecoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure<'a> {
    pub layer_type: LayerType,
    pub error: DecodeError,
    pub data: &'a [u8],
}

/// Decoded layers of one packet, in wire order.
#[derive(Debug, Default)]
pub struct LayerStack<'a> {
    layers: Vec<Layer<'a>>,
    application: Option<usize>,
    failure: Option<DecodeFailure<'a>>,
}

impl<'a> LayerStack<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: Layer<'a>) {
        self.layers.push(layer);
    }

    /// Claim the most recently added layer as the application layer.
    ///
    /// Returns `false` when another layer already holds the claim or the
    /// stack is empty.
    pub fn set_application_layer(&mut self) -> bool {
        if self.application.is_some() || self.layers.is_empty() {
            return false;
        }
        self.application = Some(self.layers.len() - 1);
        true
    }

    pub fn application_layer(&self) -> Option<&Layer<'a>> {
        self.application.and_then(|index| self.layers.get(index))
    }

    pub fn layers(&self) -> &[Layer<'a>] {
        &self.layers
    }

    pub fn last(&self) -> Option<&Layer<'a>> {
        self.layers.last()
    }

    /// First layer of the given type.
    pub fn layer(&self, layer_type: LayerType) -> Option<&Layer<'a>> {
        self.layers
            .iter()
            .find(|layer| layer.layer_type() == layer_type)
    }

    pub fn mbap(&self) -> Option<&Mbap<'a>> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Mbap(mbap) => Some(mbap),
            _ => None,
        })
    }

    pub fn set_failure(&mut self, failure: DecodeFailure<'a>) {
        self.failure = Some(failure);
    }

    pub fn failure(&self) -> Option<&DecodeFailure<'a>> {
        self.failure.as_ref()
    }
}
