use super::error::TcpError;
use super::layout;

pub struct TcpReader<'a> {
    segment: &'a [u8],
}

impl<'a> TcpReader<'a> {
    pub fn new(segment: &'a [u8]) -> Self {
        Self { segment }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), TcpError> {
        if self.segment.len() < needed {
            return Err(TcpError::TooShort {
                needed,
                actual: self.segment.len(),
            });
        }
        Ok(())
    }

    /// Header length announced by the data offset field, options included.
    pub fn header_len(&self) -> Result<usize, TcpError> {
        self.require_len(layout::TCP_MIN_HEADER_LEN)?;
        let words = self.segment[layout::DATA_OFFSET_OFFSET] >> layout::DATA_OFFSET_SHIFT;
        let len = words as usize * layout::DATA_OFFSET_UNIT;
        if len < layout::TCP_MIN_HEADER_LEN {
            return Err(TcpError::InvalidHeaderLength { len });
        }
        Ok(len)
    }

    pub fn payload_without_header(&self) -> Result<&'a [u8], TcpError> {
        let header_len = self.header_len()?;
        self.require_len(header_len)?;
        self.segment
            .get(header_len..)
            .ok_or(TcpError::TooShort {
                needed: header_len,
                actual: self.segment.len(),
            })
    }
}
