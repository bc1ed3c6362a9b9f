//! PCAP/PCAPNG file source.
//!
//! The format is detected from the magic bytes. Timestamps honour the
//! capture's resolution (microseconds or nanoseconds for legacy PCAP, the
//! interface `if_tsresol` option for PCAPNG).

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
