use thiserror::Error;

/// Errors returned by MBAP decoding and encoding.
///
/// Every variant is an expected outcome of reading untrusted bytes; none of
/// them indicates a bug in the caller.
///
/// # Examples
/// ```
/// use modshark_core::MbapError;
///
/// let err = MbapError::UnsupportedProtocol { value: 1 };
/// assert!(err.to_string().contains("unsupported protocol identifier"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MbapError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("unsupported protocol identifier: {value:#06x}")]
    UnsupportedProtocol { value: u16 },
    #[error("invalid MBAP length: {length}")]
    InvalidLength { length: u16 },
    #[error("truncated record: length field declares {declared} bytes, {available} available")]
    Truncated { declared: usize, available: usize },
    #[error("PDU too large for the MBAP length field: {len} bytes")]
    PduTooLarge { len: usize },
}
