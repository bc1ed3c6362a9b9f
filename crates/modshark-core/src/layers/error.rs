use thiserror::Error;

use crate::protocols::modbus::MbapError;

/// Errors surfaced by layer decoders to the dispatching registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("MBAP decode failed: {0}")]
    Mbap(#[from] MbapError),
}
