use std::sync::Arc;

use crate::config::ModbusConfig;
use crate::layers::{
    DecodeError, DecodedLayer, Layer, LayerClass, LayerDecoder, LayerStack, LayerType,
};
use crate::registry::{PortRegistry, RegistryError};

use super::parser::{Mbap, parse_mbap};

const MBAP_CLASS: LayerClass = LayerClass::new(&[LayerType::ModbusMbap]);

impl<'a> DecodedLayer<'a> for Mbap<'a> {
    fn layer_type(&self) -> LayerType {
        LayerType::ModbusMbap
    }

    fn contents(&self) -> &'a [u8] {
        self.contents
    }

    fn payload(&self) -> &'a [u8] {
        self.payload
    }

    fn next_layer_type(&self) -> Option<LayerType> {
        Some(LayerType::Payload)
    }
}

/// Layer decoder for MBAP records.
#[derive(Debug, Clone, Copy)]
pub struct MbapDecoder {
    claim_application_layer: bool,
}

impl MbapDecoder {
    pub fn new(claim_application_layer: bool) -> Self {
        Self {
            claim_application_layer,
        }
    }
}

impl Default for MbapDecoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LayerDecoder for MbapDecoder {
    fn layer_type(&self) -> LayerType {
        LayerType::ModbusMbap
    }

    fn can_decode(&self) -> LayerClass {
        MBAP_CLASS
    }

    fn decode<'a>(&self, data: &'a [u8], stack: &mut LayerStack<'a>) -> Result<(), DecodeError> {
        let mbap = parse_mbap(data)?;
        stack.add_layer(Layer::Mbap(mbap));
        if self.claim_application_layer {
            stack.set_application_layer();
        }
        Ok(())
    }
}

/// Bind the MBAP decoder to the configured TCP port.
pub fn register(registry: &mut PortRegistry, config: &ModbusConfig) -> Result<(), RegistryError> {
    let decoder = MbapDecoder::new(config.claim_application_layer);
    registry.register_decoder(Arc::new(decoder))?;
    registry.register_tcp_port(config.port, LayerType::ModbusMbap)
}

#[cfg(test)]
mod tests {
    use super::{MbapDecoder, register};
    use crate::config::ModbusConfig;
    use crate::layers::{DecodeError, DecodedLayer, Layer, LayerDecoder, LayerStack, LayerType};
    use crate::protocols::modbus::{MbapError, layout};
    use crate::registry::PortRegistry;

    const RECORD: [u8; 12] = [
        0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0xFF, 0x03, 0x00, 0x00, 0x00, 0x0A,
    ];

    #[test]
    fn decode_pushes_layer_and_claims_application() {
        let decoder = MbapDecoder::default();
        let mut stack = LayerStack::new();
        decoder.decode(&RECORD, &mut stack).unwrap();

        let app = stack.application_layer().unwrap();
        assert_eq!(app.layer_type(), LayerType::ModbusMbap);
        assert_eq!(app.next_layer_type(), Some(LayerType::Payload));
        assert_eq!(app.payload(), &RECORD[layout::PDU_OFFSET..]);
        assert_eq!(app.contents(), &RECORD[..layout::HEADER_LEN]);
    }

    #[test]
    fn decode_without_claim_leaves_application_unset() {
        let decoder = MbapDecoder::new(false);
        let mut stack = LayerStack::new();
        decoder.decode(&RECORD, &mut stack).unwrap();
        assert!(matches!(stack.last(), Some(Layer::Mbap(_))));
        assert!(stack.application_layer().is_none());
    }

    #[test]
    fn decode_error_pushes_nothing() {
        let decoder = MbapDecoder::default();
        let mut stack = LayerStack::new();
        let err = decoder.decode(&RECORD[..5], &mut stack).unwrap_err();
        assert!(matches!(err, DecodeError::Mbap(MbapError::TooShort { .. })));
        assert!(stack.layers().is_empty());
    }

    #[test]
    fn decoder_advertises_mbap_class() {
        let decoder = MbapDecoder::default();
        assert_eq!(decoder.layer_type(), LayerType::ModbusMbap);
        assert!(decoder.can_decode().contains(LayerType::ModbusMbap));
    }

    #[test]
    fn register_binds_default_port() {
        let mut registry = PortRegistry::new();
        register(&mut registry, &ModbusConfig::default()).unwrap();
        assert_eq!(
            registry.tcp_port_layer_type(layout::MODBUS_TCP_PORT),
            Some(LayerType::ModbusMbap)
        );
    }

    #[test]
    fn register_honours_configured_port() {
        let mut registry = PortRegistry::new();
        let config = ModbusConfig {
            port: 5020,
            ..ModbusConfig::default()
        };
        register(&mut registry, &config).unwrap();
        assert_eq!(registry.tcp_port_layer_type(5020), Some(LayerType::ModbusMbap));
        assert_eq!(registry.tcp_port_layer_type(layout::MODBUS_TCP_PORT), None);
    }
}
