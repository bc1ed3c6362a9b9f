use super::error::MbapError;
use super::layout;

pub struct MbapReader<'a> {
    payload: &'a [u8],
}

impl<'a> MbapReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), MbapError> {
        if self.payload.len() < needed {
            return Err(MbapError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    /// Check that the record announced by the length field fits in the buffer.
    pub fn require_record(&self, length: u16) -> Result<usize, MbapError> {
        let record_len = layout::LENGTH_PREFIX_LEN + length as usize;
        if self.payload.len() < record_len {
            return Err(MbapError::Truncated {
                declared: record_len,
                available: self.payload.len(),
            });
        }
        Ok(record_len)
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, MbapError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(MbapError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, MbapError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(MbapError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], MbapError> {
        self.payload.get(range.clone()).ok_or(MbapError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    pub fn read_rest(&self, offset: usize) -> &'a [u8] {
        self.payload.get(offset..).unwrap_or(&[])
    }
}

pub(crate) fn is_unaddressed(unit_id: u8) -> bool {
    layout::UNIT_ID_UNADDRESSED.contains(&unit_id)
}
