pub const DATA_OFFSET_OFFSET: usize = 12;
pub const DATA_OFFSET_SHIFT: u8 = 4;
/// Data offset is counted in 32-bit words.
pub const DATA_OFFSET_UNIT: usize = 4;
pub const TCP_MIN_HEADER_LEN: usize = 20;
