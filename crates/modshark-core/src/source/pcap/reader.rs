use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::error::PcapSourceError;
use super::layout;

/// Link type and timestamp resolution of one PCAPNG interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface {
    pub linktype: Linktype,
    pub tsresol: u8,
}

/// Read the magic bytes and rewind the reader to the start.
///
/// # Errors
/// Returns `PcapSourceError::Io` when fewer than four bytes are available or
/// the reader cannot be rewound.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], PcapSourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Resolve the interface for a packet, defaulting to Ethernet with
/// microsecond timestamps when the id is unknown.
pub fn interface_for(interfaces: &[Interface], if_id: u32) -> Interface {
    interfaces
        .get(if_id as usize)
        .copied()
        .unwrap_or(Interface {
            linktype: Linktype::ETHERNET,
            tsresol: layout::PCAPNG_DEFAULT_TSRESOL,
        })
}

/// Convert a legacy PCAP timestamp to seconds.
pub fn legacy_ts_to_seconds(ts_sec: u32, ts_frac: u32, nanosecond: bool) -> f64 {
    let scale = if nanosecond { 1e-9 } else { 1e-6 };
    ts_sec as f64 + ts_frac as f64 * scale
}

/// Convert a PCAPNG high/low timestamp to seconds using `if_tsresol`.
pub fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32, tsresol: u8) -> f64 {
    let ts = ((ts_high as u64) << 32) | (ts_low as u64);
    let exponent = i32::from(tsresol & !layout::PCAPNG_TSRESOL_BINARY_FLAG);
    let units_per_second = if tsresol & layout::PCAPNG_TSRESOL_BINARY_FLAG != 0 {
        2f64.powi(exponent)
    } else {
        10f64.powi(exponent)
    };
    ts as f64 / units_per_second
}
