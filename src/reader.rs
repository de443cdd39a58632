//! Bounds-checked byte cursor over an in-memory JPEG stream.

use crate::error::{Error, Result};

/// Sequential big-endian reader over an immutable byte buffer.
///
/// The position only ever moves forward. Lookahead is done with [`Reader::peek_u8`], which does
/// not consume anything. A failed read leaves the position untouched.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    /// Returns the absolute offset of the next byte to be read.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.position >= self.buf.len()
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.position.min(self.buf.len())..]
    }

    /// Returns a reader over the same data that cannot read past `end`.
    ///
    /// Offsets reported by the returned reader are still relative to the start of the whole
    /// buffer. `end` must not exceed the length of the buffer.
    pub fn segment(&self, end: usize) -> Reader<'a> {
        debug_assert!(end <= self.buf.len());
        Reader {
            buf: &self.buf[..end],
            position: self.position,
        }
    }

    pub fn peek_u8(&self, offset: usize) -> Result<u8> {
        match self.buf.get(self.position + offset) {
            Some(&byte) => Ok(byte),
            None => Err(Error::end_of_stream(self.buf.len())),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8(0)?;
        self.position += 1;
        Ok(byte)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining().len() < count {
            return Err(Error::end_of_stream(self.buf.len()));
        }
        let slice = &self.remaining()[..count];
        self.position += count;
        Ok(slice)
    }

    /// Reads `count` bytes and decodes them as Latin-1.
    pub fn read_string(&mut self, count: usize) -> Result<String> {
        self.read_bytes(count).map(latin1)
    }

    /// Reads a zero-terminated Latin-1 string. The terminator is consumed but not returned.
    pub fn read_zstring(&mut self) -> Result<String> {
        let len = self
            .remaining()
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::end_of_stream(self.buf.len()))?;
        let s = latin1(&self.remaining()[..len]);
        self.position += len + 1;
        Ok(s)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(drop)
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::*;

    #[test]
    fn words_are_big_endian() {
        let mut reader = Reader::new(&[0x12, 0x34, 0xFF]);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert!(reader.at_end());
    }

    #[test]
    fn truncated_reads_fail() {
        let mut reader = Reader::new(&[0xFF]);
        let err = reader.read_u16().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndOfStream);
        assert_eq!(reader.position(), 0);

        assert_eq!(
            reader.read_bytes(2).unwrap_err().kind(),
            ErrorKind::EndOfStream
        );
        assert_eq!(reader.skip(2).unwrap_err().kind(), ErrorKind::EndOfStream);
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
        assert_eq!(reader.read_u8().unwrap_err().kind(), ErrorKind::EndOfStream);
    }

    #[test]
    fn strings() {
        let mut reader = Reader::new(b"JFIF\0caf\xE9");
        assert_eq!(reader.read_zstring().unwrap(), "JFIF");
        assert_eq!(reader.position(), 5);
        assert_eq!(reader.read_string(4).unwrap(), "café");
        assert!(reader.at_end());

        let mut unterminated = Reader::new(b"JFIF");
        assert_eq!(
            unterminated.read_zstring().unwrap_err().kind(),
            ErrorKind::EndOfStream
        );
        assert_eq!(unterminated.position(), 0);
    }

    #[test]
    fn segment_is_bounded() {
        let data = [1, 2, 3, 4, 5];
        let mut reader = Reader::new(&data);
        reader.skip(1).unwrap();

        let mut seg = reader.segment(3);
        assert_eq!(seg.position(), 1);
        assert_eq!(seg.read_bytes(2).unwrap(), &[2, 3]);
        assert!(seg.at_end());
        assert!(seg.read_u8().is_err());
        assert_eq!(seg.peek_u8(0).unwrap_err().offset(), Some(3));
    }
}
