/// IANA-assigned Modbus/TCP port.
pub const MODBUS_TCP_PORT: u16 = 502;

pub const TRANSACTION_ID_RANGE: std::ops::Range<usize> = 0..2;
pub const PROTOCOL_ID_RANGE: std::ops::Range<usize> = 2..4;
pub const LENGTH_RANGE: std::ops::Range<usize> = 4..6;
pub const UNIT_ID_OFFSET: usize = 6;
pub const PDU_OFFSET: usize = 7;

/// Bytes preceding the unit identifier; the length field counts from here.
pub const LENGTH_PREFIX_LEN: usize = 6;
pub const HEADER_LEN: usize = PDU_OFFSET;

pub const MODBUS_PROTOCOL_ID: u16 = 0x0000;
pub const MIN_LENGTH: u16 = 1;
/// Unit identifier plus the largest PDU allowed by the Modbus application protocol (253).
pub const MAX_LENGTH: u16 = 254;

pub const UNIT_ID_UNADDRESSED: [u8; 2] = [0x00, 0xFF];
