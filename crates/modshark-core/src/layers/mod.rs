//! Layer contract shared by protocol decoders.
//!
//! A decoder turns the bytes handed to it into one typed layer, pushes it on
//! the packet's `LayerStack` and names the layer type of its payload. The
//! registry follows that chain until a layer reports no successor or no
//! decoder is registered for the next type, in which case the remaining bytes
//! become a generic `Payload` layer.

use std::fmt;

use crate::protocols::modbus::Mbap;

pub mod error;
mod stack;

pub use error::DecodeError;
pub use stack::{DecodeFailure, LayerStack};

/// Type tag carried by every decoded layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerType {
    /// Modbus/TCP application protocol header.
    ModbusMbap,
    /// Opaque bytes with no further decoding.
    Payload,
}

impl LayerType {
    pub fn name(self) -> &'static str {
        match self {
            LayerType::ModbusMbap => "ModbusMBAP",
            LayerType::Payload => "Payload",
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of layer types a decoder is able to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerClass(&'static [LayerType]);

impl LayerClass {
    pub const fn new(types: &'static [LayerType]) -> Self {
        Self(types)
    }

    pub fn contains(&self, layer_type: LayerType) -> bool {
        self.0.contains(&layer_type)
    }

    pub fn types(&self) -> &'static [LayerType] {
        self.0
    }
}

/// Common view over a decoded layer.
pub trait DecodedLayer<'a> {
    fn layer_type(&self) -> LayerType;

    /// Bytes that make up this layer's own header.
    fn contents(&self) -> &'a [u8];

    /// Bytes handed to the next layer.
    fn payload(&self) -> &'a [u8];

    /// Layer type expected for `payload()`, `None` when decoding stops here.
    fn next_layer_type(&self) -> Option<LayerType>;
}

/// Decoder bound to one layer type, shared across threads through the registry.
pub trait LayerDecoder: Send + Sync {
    fn layer_type(&self) -> LayerType;

    fn can_decode(&self) -> LayerClass;

    /// Decode `data` and push the resulting layer on `stack`.
    ///
    /// On error nothing is pushed.
    fn decode<'a>(&self, data: &'a [u8], stack: &mut LayerStack<'a>) -> Result<(), DecodeError>;
}

/// Bytes left undecoded at the end of the layer chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    pub data: &'a [u8],
}

impl<'a> Payload<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> DecodedLayer<'a> for Payload<'a> {
    fn layer_type(&self) -> LayerType {
        LayerType::Payload
    }

    fn contents(&self) -> &'a [u8] {
        self.data
    }

    fn payload(&self) -> &'a [u8] {
        &[]
    }

    fn next_layer_type(&self) -> Option<LayerType> {
        None
    }
}

/// Concrete layers a stack can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer<'a> {
    Mbap(Mbap<'a>),
    Payload(Payload<'a>),
}

impl<'a> DecodedLayer<'a> for Layer<'a> {
    fn layer_type(&self) -> LayerType {
        match self {
            Layer::Mbap(layer) => layer.layer_type(),
            Layer::Payload(layer) => layer.layer_type(),
        }
    }

    fn contents(&self) -> &'a [u8] {
        match self {
            Layer::Mbap(layer) => layer.contents(),
            Layer::Payload(layer) => layer.contents(),
        }
    }

    fn payload(&self) -> &'a [u8] {
        match self {
            Layer::Mbap(layer) => layer.payload(),
            Layer::Payload(layer) => layer.payload(),
        }
    }

    fn next_layer_type(&self) -> Option<LayerType> {
        match self {
            Layer::Mbap(layer) => layer.next_layer_type(),
            Layer::Payload(layer) => layer.next_layer_type(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodedLayer, LayerClass, LayerType, Payload};

    #[test]
    fn layer_type_names() {
        assert_eq!(LayerType::ModbusMbap.to_string(), "ModbusMBAP");
        assert_eq!(LayerType::Payload.to_string(), "Payload");
    }

    #[test]
    fn layer_class_membership() {
        let class = LayerClass::new(&[LayerType::ModbusMbap]);
        assert!(class.contains(LayerType::ModbusMbap));
        assert!(!class.contains(LayerType::Payload));
    }

    #[test]
    fn payload_layer_ends_the_chain() {
        let data = [0x03, 0x02, 0x00, 0x2A];
        let payload = Payload::new(&data);
        assert_eq!(payload.layer_type(), LayerType::Payload);
        assert_eq!(payload.contents(), &data);
        assert!(payload.payload().is_empty());
        assert_eq!(payload.next_layer_type(), None);
    }
}
