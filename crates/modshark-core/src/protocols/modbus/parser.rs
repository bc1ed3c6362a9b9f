use super::error::MbapError;
use super::layout;
use super::reader::{self, MbapReader};

/// Decoded MBAP header with zero-copy views into the caller's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mbap<'a> {
    pub transaction_id: u16,
    pub protocol_id: u16,
    /// Bytes following the length field: unit identifier plus PDU.
    pub length: u16,
    pub unit_id: u8,
    /// The 7 header bytes.
    pub contents: &'a [u8],
    /// Modbus PDU (function code and data), `length - 1` bytes.
    pub payload: &'a [u8],
    /// Bytes after the record that the length field does not cover.
    pub trailing: &'a [u8],
}

impl Mbap<'_> {
    /// Total record size on the wire, header included.
    pub fn record_len(&self) -> usize {
        layout::LENGTH_PREFIX_LEN + self.length as usize
    }

    /// Unit identifiers 0x00 and 0xFF address no particular device.
    pub fn is_unaddressed(&self) -> bool {
        reader::is_unaddressed(self.unit_id)
    }
}

/// Decode one MBAP record from the start of `payload`.
///
/// Checks run in wire order and stop at the first failure: minimum size,
/// protocol identifier, length field, then the declared record size.
pub fn parse_mbap(payload: &[u8]) -> Result<Mbap<'_>, MbapError> {
    let reader = MbapReader::new(payload);
    reader.require_len(layout::HEADER_LEN)?;

    let transaction_id = reader.read_u16_be(layout::TRANSACTION_ID_RANGE.clone())?;
    let protocol_id = reader.read_u16_be(layout::PROTOCOL_ID_RANGE.clone())?;
    if protocol_id != layout::MODBUS_PROTOCOL_ID {
        return Err(MbapError::UnsupportedProtocol { value: protocol_id });
    }

    let length = reader.read_u16_be(layout::LENGTH_RANGE.clone())?;
    if length < layout::MIN_LENGTH {
        return Err(MbapError::InvalidLength { length });
    }
    let record_len = reader.require_record(length)?;

    let unit_id = reader.read_u8(layout::UNIT_ID_OFFSET)?;
    let contents = reader.read_slice(0..layout::HEADER_LEN)?;
    let pdu = reader.read_slice(layout::PDU_OFFSET..record_len)?;
    let trailing = reader.read_rest(record_len);

    Ok(Mbap {
        transaction_id,
        protocol_id,
        length,
        unit_id,
        contents,
        payload: pdu,
        trailing,
    })
}
