//! Modbus/TCP MBAP decoding.
//!
//! The parser validates the 7-byte MBAP header (transaction identifier,
//! protocol identifier, length, unit identifier) and exposes the Modbus PDU
//! that follows it as a borrowed view. Checks run in wire order: minimum
//! size, protocol identifier zero, non-zero length, then the declared record
//! size against the bytes actually present. Bytes past the declared record
//! are not part of the PDU.
//!
//! Function codes and PDU contents are left to downstream interpreters. The
//! decoder binds to TCP port 502 unless configured otherwise; see `decoder`.

pub mod decoder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod writer;

pub use decoder::{MbapDecoder, register};
pub use error::MbapError;
pub use parser::{Mbap, parse_mbap};
pub use writer::encode_mbap;
