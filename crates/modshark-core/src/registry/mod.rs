//! Explicit port-based decoder registry.
//!
//! The registry is built once by its owner, then shared read-only by every
//! thread that decodes. It maps TCP ports to layer types and layer types to
//! decoders, and drives the layer chain for one TCP payload.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::config::AnalysisConfig;
use crate::layers::{
    DecodeFailure, DecodedLayer, Layer, LayerDecoder, LayerStack, LayerType, Payload,
};
use crate::protocols::modbus;

pub mod error;

pub use error::RegistryError;

#[derive(Default)]
pub struct PortRegistry {
    tcp_ports: BTreeMap<u16, LayerType>,
    decoders: HashMap<LayerType, Arc<dyn LayerDecoder>>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in decoder bound as configured.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        modbus::register(&mut registry, &config.modbus)?;
        Ok(registry)
    }

    pub fn register_decoder(
        &mut self,
        decoder: Arc<dyn LayerDecoder>,
    ) -> Result<(), RegistryError> {
        let layer_type = decoder.layer_type();
        if self.decoders.contains_key(&layer_type) {
            return Err(RegistryError::DuplicateDecoder { layer_type });
        }
        debug!("registered decoder for {layer_type}");
        self.decoders.insert(layer_type, decoder);
        Ok(())
    }

    pub fn register_tcp_port(
        &mut self,
        port: u16,
        layer_type: LayerType,
    ) -> Result<(), RegistryError> {
        if port == 0 {
            return Err(RegistryError::InvalidPort { port });
        }
        if !self.decoders.contains_key(&layer_type) {
            return Err(RegistryError::UnknownLayerType { layer_type });
        }
        if let Some(existing) = self.tcp_ports.get(&port) {
            return Err(RegistryError::PortInUse {
                port,
                existing: *existing,
            });
        }
        debug!("bound TCP port {port} to {layer_type}");
        self.tcp_ports.insert(port, layer_type);
        Ok(())
    }

    pub fn tcp_port_layer_type(&self, port: u16) -> Option<LayerType> {
        self.tcp_ports.get(&port).copied()
    }

    /// Bound ports in ascending order.
    pub fn tcp_ports(&self) -> impl Iterator<Item = (u16, LayerType)> + '_ {
        self.tcp_ports.iter().map(|(port, layer_type)| (*port, *layer_type))
    }

    /// Layer type for a segment: destination port first, then source port.
    pub fn layer_for_ports(&self, src_port: u16, dst_port: u16) -> LayerType {
        self.tcp_port_layer_type(dst_port)
            .or_else(|| self.tcp_port_layer_type(src_port))
            .unwrap_or(LayerType::Payload)
    }

    pub fn decoder(&self, layer_type: LayerType) -> Option<&dyn LayerDecoder> {
        self.decoders.get(&layer_type).map(|decoder| decoder.as_ref())
    }

    /// Decode one TCP application-layer record.
    ///
    /// Never fails: a decoder error ends the chain with a `DecodeFailure`
    /// holding the rejected bytes.
    pub fn decode_tcp_payload<'a>(
        &self,
        src_port: u16,
        dst_port: u16,
        data: &'a [u8],
    ) -> LayerStack<'a> {
        let mut stack = LayerStack::new();
        self.decode_chain(self.layer_for_ports(src_port, dst_port), data, &mut stack);
        stack
    }

    fn decode_chain<'a>(&self, first: LayerType, data: &'a [u8], stack: &mut LayerStack<'a>) {
        let mut next = Some(first);
        let mut data = data;
        while let Some(layer_type) = next {
            let Some(decoder) = self.decoder(layer_type) else {
                if !data.is_empty() {
                    stack.add_layer(Layer::Payload(Payload::new(data)));
                }
                return;
            };
            if let Err(error) = decoder.decode(data, stack) {
                stack.set_failure(DecodeFailure {
                    layer_type,
                    error,
                    data,
                });
                return;
            }
            let Some(top) = stack.last() else {
                return;
            };
            next = top.next_layer_type();
            data = top.payload();
        }
    }
}

impl fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decoders: Vec<_> = self.decoders.keys().collect();
        decoders.sort();
        f.debug_struct("PortRegistry")
            .field("tcp_ports", &self.tcp_ports)
            .field("decoders", &decoders)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{PortRegistry, RegistryError};
    use crate::config::AnalysisConfig;
    use crate::layers::{DecodeError, Layer, LayerType};
    use crate::protocols::modbus::{MbapDecoder, MbapError, layout};

    const REQUEST: [u8; 12] = [
        0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x0A,
    ];

    fn registry() -> PortRegistry {
        PortRegistry::from_config(&AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn request_to_modbus_port_decodes_mbap_then_payload() {
        let registry = registry();
        let stack = registry.decode_tcp_payload(49152, layout::MODBUS_TCP_PORT, &REQUEST);

        assert!(stack.failure().is_none());
        assert_eq!(stack.layers().len(), 2);
        assert!(matches!(stack.layers()[0], Layer::Mbap(_)));
        match &stack.layers()[1] {
            Layer::Payload(payload) => assert_eq!(payload.data, &REQUEST[7..]),
            other => panic!("unexpected layer {other:?}"),
        }
        assert!(matches!(stack.application_layer(), Some(Layer::Mbap(_))));
    }

    #[test]
    fn response_from_modbus_port_uses_source_port() {
        let registry = registry();
        assert_eq!(
            registry.layer_for_ports(layout::MODBUS_TCP_PORT, 49152),
            LayerType::ModbusMbap
        );
        let stack = registry.decode_tcp_payload(layout::MODBUS_TCP_PORT, 49152, &REQUEST);
        assert_eq!(stack.mbap().unwrap().unit_id, 1);
    }

    #[test]
    fn unregistered_ports_yield_plain_payload() {
        let registry = registry();
        assert_eq!(registry.layer_for_ports(1000, 2000), LayerType::Payload);
        let stack = registry.decode_tcp_payload(1000, 2000, &REQUEST);
        assert_eq!(stack.layers().len(), 1);
        assert!(matches!(stack.layers()[0], Layer::Payload(_)));
        assert!(stack.application_layer().is_none());
    }

    #[test]
    fn unit_id_only_record_has_no_payload_layer() {
        let registry = registry();
        let record = [0x00, 0x09, 0x00, 0x00, 0x00, 0x01, 0x01];
        let stack = registry.decode_tcp_payload(49152, layout::MODBUS_TCP_PORT, &record);
        assert_eq!(stack.layers().len(), 1);
        assert!(stack.mbap().unwrap().payload.is_empty());
    }

    #[test]
    fn decode_failure_keeps_raw_bytes() {
        let registry = registry();
        let data = [0x00, 0x01, 0x00, 0x05, 0x00, 0x02, 0x01, 0x03];
        let stack = registry.decode_tcp_payload(49152, layout::MODBUS_TCP_PORT, &data);

        assert!(stack.layers().is_empty());
        let failure = stack.failure().unwrap();
        assert_eq!(failure.layer_type, LayerType::ModbusMbap);
        assert_eq!(failure.data, &data);
        assert_eq!(
            failure.error,
            DecodeError::Mbap(MbapError::UnsupportedProtocol { value: 5 })
        );
    }

    #[test]
    fn duplicate_decoder_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register_decoder(Arc::new(MbapDecoder::default()))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateDecoder {
                layer_type: LayerType::ModbusMbap
            }
        );
    }

    #[test]
    fn port_collision_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register_tcp_port(layout::MODBUS_TCP_PORT, LayerType::ModbusMbap)
            .unwrap_err();
        assert!(matches!(err, RegistryError::PortInUse { port: 502, .. }));
    }

    #[test]
    fn port_needs_a_decoder() {
        let mut registry = PortRegistry::new();
        let err = registry
            .register_tcp_port(502, LayerType::ModbusMbap)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownLayerType { .. }));
    }

    #[test]
    fn port_zero_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register_tcp_port(0, LayerType::ModbusMbap)
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidPort { port: 0 });
    }

    #[test]
    fn extra_ports_can_share_a_decoder() {
        let mut registry = registry();
        registry
            .register_tcp_port(5020, LayerType::ModbusMbap)
            .unwrap();
        let ports: Vec<u16> = registry.tcp_ports().map(|(port, _)| port).collect();
        assert_eq!(ports, vec![502, 5020]);
    }
}
