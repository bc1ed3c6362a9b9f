use thiserror::Error;

use crate::layers::LayerType;

/// Errors returned while building a `PortRegistry`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("decoder already registered for layer type {layer_type}")]
    DuplicateDecoder { layer_type: LayerType },
    #[error("TCP port {port} already bound to {existing}")]
    PortInUse { port: u16, existing: LayerType },
    #[error("no decoder registered for layer type {layer_type}")]
    UnknownLayerType { layer_type: LayerType },
    #[error("invalid TCP port: {port}")]
    InvalidPort { port: u16 },
}
