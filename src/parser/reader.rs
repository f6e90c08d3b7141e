use byteorder::{ByteOrder, LittleEndian};

use super::error::{ParseError, ParseErrorKind};

/// Sequential cursor over a borrowed module binary.
///
/// Offsets reported in errors are absolute: a reader created with [`Reader::sub_reader`]
/// carries the offset of its first byte within the original buffer.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0, base: 0 }
    }
}

impl<'a> Reader<'a> {
    // Basic operations --------------------------------------------------------

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.offset())
    }

    fn err_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, offset)
    }

    pub fn read_byte(&mut self) -> Result<u8, ParseError> {
        match self.bytes.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(self.err(ParseErrorKind::UnexpectedEnd)),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() {
            return Err(self.err(ParseErrorKind::UnexpectedEnd));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Splits off the next `len` bytes as an independent reader and advances past them.
    pub fn sub_reader(&mut self, len: usize) -> Result<Reader<'a>, ParseError> {
        let base = self.offset();
        let bytes = self.read_bytes(len)?;
        Ok(Reader { bytes, pos: 0, base })
    }

    // Read and interpret types ------------------------------------------------

    // le
    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        let bytes = self.read_bytes(4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    pub fn read_f32(&mut self) -> Result<f32, ParseError> {
        let bytes = self.read_bytes(4)?;
        Ok(LittleEndian::read_f32(bytes))
    }

    pub fn read_f64(&mut self) -> Result<f64, ParseError> {
        let bytes = self.read_bytes(8)?;
        Ok(LittleEndian::read_f64(bytes))
    }

    pub fn read_vu32(&mut self) -> Result<u32, ParseError> {
        self.read_leb(32, false).map(|v| v as u32)
    }

    pub fn read_vu64(&mut self) -> Result<u64, ParseError> {
        self.read_leb(64, false)
    }

    pub fn read_vs32(&mut self) -> Result<i32, ParseError> {
        self.read_leb(32, true).map(|v| v as i32)
    }

    pub fn read_vs64(&mut self) -> Result<i64, ParseError> {
        self.read_leb(64, true).map(|v| v as i64)
    }

    pub fn read_utf8(&mut self, len: usize) -> Result<String, ParseError> {
        let start = self.offset();
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| self.err_at(start, ParseErrorKind::InvalidUtf8))
    }

    /// `name ::= len:vu32 bytes:byte^len`, bytes must be UTF-8.
    pub fn read_name(&mut self) -> Result<String, ParseError> {
        let len = self.read_vu32()?;
        self.read_utf8(len as usize)
    }

    /// Decodes a LEB128 integer of at most `bits` significant bits.
    ///
    /// The encoding may use at most `ceil(bits / 7)` bytes, and the unused high bits of
    /// a maximal-length encoding must be zero (unsigned) or copies of the sign bit
    /// (signed). Signed results are sign-extended to 64 bits.
    fn read_leb(&mut self, bits: u32, signed: bool) -> Result<u64, ParseError> {
        let start = self.offset();
        let max_bytes = (bits + 6) / 7;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;

        for i in 0..max_bytes {
            let byte = self.read_byte()?;
            let payload = byte & 0x7f;

            if i + 1 == max_bytes {
                if byte & 0x80 != 0 {
                    return Err(self.err_at(start, ParseErrorKind::IntegerTooLong));
                }
                let used = bits - shift;
                let unused_mask = 0x7f & !((1u8 << used) - 1);
                let sign_set = payload & (1u8 << (used - 1)) != 0;
                let expected = if signed && sign_set { unused_mask } else { 0 };
                if payload & unused_mask != expected {
                    return Err(self.err_at(start, ParseErrorKind::IntegerTooLarge));
                }
            }

            result |= (payload as u64) << shift;
            shift += 7;

            if byte & 0x80 == 0 {
                if signed && shift < 64 && payload & 0x40 != 0 {
                    result |= !0u64 << shift;
                }
                return Ok(result);
            }
        }

        Err(self.err_at(start, ParseErrorKind::IntegerTooLong))
    }
}
