//! Endian-aware stream primitives.
//!
//! [`StreamReader`] adds a one-byte pushback over any [`Read`], which the
//! ascending-ID chunk loops of the Korg and NI codecs need to recognize
//! the end of a parameter sub-section without a length field.

use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{FileError, FileResult};

/// Buffered reader with a one-byte pushback.
pub struct StreamReader<R: Read> {
    inner: R,
    pushback: Option<u8>,
}

impl<R: Read> StreamReader<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pushback: None,
        }
    }

    /// Pushes one byte back; the next read returns it first.
    ///
    /// Only a single byte of pushback is supported.
    pub fn unread_byte(&mut self, byte: u8) {
        debug_assert!(self.pushback.is_none(), "double pushback");
        self.pushback = Some(byte);
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> FileResult<u8> {
        if let Some(byte) = self.pushback.take() {
            return Ok(byte);
        }
        Ok(ReadBytesExt::read_u8(&mut self.inner)?)
    }

    /// Reads a little-endian u16.
    pub fn read_u16_le(&mut self) -> FileResult<u16> {
        Ok(self.read_into::<u16, 2>(u16::from_le_bytes)?)
    }

    /// Reads a big-endian u16.
    pub fn read_u16_be(&mut self) -> FileResult<u16> {
        Ok(self.read_into::<u16, 2>(u16::from_be_bytes)?)
    }

    /// Reads a little-endian u32.
    pub fn read_u32_le(&mut self) -> FileResult<u32> {
        Ok(self.read_into::<u32, 4>(u32::from_le_bytes)?)
    }

    /// Reads a big-endian u32.
    pub fn read_u32_be(&mut self) -> FileResult<u32> {
        Ok(self.read_into::<u32, 4>(u32::from_be_bytes)?)
    }

    /// Reads a little-endian u64.
    pub fn read_u64_le(&mut self) -> FileResult<u64> {
        Ok(self.read_into::<u64, 8>(u64::from_le_bytes)?)
    }

    /// Reads a little-endian i64.
    pub fn read_i64_le(&mut self) -> FileResult<i64> {
        Ok(self.read_into::<i64, 8>(i64::from_le_bytes)?)
    }

    /// Reads a little-endian float32.
    pub fn read_f32_le(&mut self) -> FileResult<f32> {
        Ok(self.read_into::<f32, 4>(f32::from_le_bytes)?)
    }

    /// Reads a little-endian float64.
    pub fn read_f64_le(&mut self) -> FileResult<f64> {
        Ok(self.read_into::<f64, 8>(f64::from_le_bytes)?)
    }

    fn read_into<T, const N: usize>(&mut self, convert: fn([u8; N]) -> T) -> FileResult<T> {
        let mut buffer = [0u8; N];
        self.read_exact(&mut buffer)?;
        Ok(convert(buffer))
    }

    /// Reads exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> FileResult<Vec<u8>> {
        let mut buffer = vec![0u8; count];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> FileResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        let mut offset = 0;
        if let Some(byte) = self.pushback.take() {
            buffer[0] = byte;
            offset = 1;
        }
        self.inner.read_exact(&mut buffer[offset..])?;
        Ok(())
    }

    /// Reads `count` bytes and verifies they equal `expected`.
    pub fn read_tag(&mut self, expected: &[u8]) -> FileResult<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(FileError::format(format!(
                "expected tag {:02X?}, found {:02X?}",
                expected, actual
            )));
        }
        Ok(())
    }

    /// Reads a fixed-length ASCII field, trimming trailing zero padding.
    pub fn read_ascii(&mut self, length: usize) -> FileResult<String> {
        let bytes = self.read_bytes(length)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(bytes[..end].iter().map(|&b| b as char).collect())
    }

    /// Reads a 1-byte-length-prefixed ASCII string.
    pub fn read_ascii_prefixed(&mut self) -> FileResult<String> {
        let length = self.read_u8()? as usize;
        self.read_ascii(length)
    }

    /// Reads a 2-byte-length-prefixed UTF-16LE string; the prefix is the
    /// character count.
    pub fn read_utf16_prefixed(&mut self) -> FileResult<String> {
        let characters = self.read_u16_le()? as usize;
        let mut units = Vec::with_capacity(characters);
        for _ in 0..characters {
            units.push(self.read_u16_le()?);
        }
        String::from_utf16(&units).map_err(|e| FileError::format(format!("invalid UTF-16: {e}")))
    }

    /// Reads a 7-bit variable-length integer, LSB first.
    ///
    /// Each byte contributes its 7 low bits; a set high bit means more
    /// bytes follow. Returns the value and the number of bytes consumed.
    pub fn read_varint(&mut self) -> FileResult<(u64, usize)> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        let mut count = 0usize;
        loop {
            let byte = self.read_u8()?;
            count += 1;
            if shift >= 64 {
                return Err(FileError::format("variable-length integer too long"));
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok((value, count));
            }
            shift += 7;
        }
    }
}

/// Writer counterpart of [`StreamReader`].
pub struct StreamWriter<W: Write> {
    inner: W,
}

impl<W: Write> StreamWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, value: u8) -> FileResult<()> {
        Ok(WriteBytesExt::write_u8(&mut self.inner, value)?)
    }

    /// Writes a little-endian u16.
    pub fn write_u16_le(&mut self, value: u16) -> FileResult<()> {
        Ok(self.inner.write_u16::<LittleEndian>(value)?)
    }

    /// Writes a big-endian u16.
    pub fn write_u16_be(&mut self, value: u16) -> FileResult<()> {
        Ok(self.inner.write_u16::<BigEndian>(value)?)
    }

    /// Writes a little-endian u32.
    pub fn write_u32_le(&mut self, value: u32) -> FileResult<()> {
        Ok(self.inner.write_u32::<LittleEndian>(value)?)
    }

    /// Writes a big-endian u32.
    pub fn write_u32_be(&mut self, value: u32) -> FileResult<()> {
        Ok(self.inner.write_u32::<BigEndian>(value)?)
    }

    /// Writes a little-endian u64.
    pub fn write_u64_le(&mut self, value: u64) -> FileResult<()> {
        Ok(self.inner.write_u64::<LittleEndian>(value)?)
    }

    /// Writes a little-endian i64.
    pub fn write_i64_le(&mut self, value: i64) -> FileResult<()> {
        Ok(self.inner.write_i64::<LittleEndian>(value)?)
    }

    /// Writes a little-endian float32.
    pub fn write_f32_le(&mut self, value: f32) -> FileResult<()> {
        Ok(self.inner.write_f32::<LittleEndian>(value)?)
    }

    /// Writes a little-endian float64.
    pub fn write_f64_le(&mut self, value: f64) -> FileResult<()> {
        Ok(self.inner.write_f64::<LittleEndian>(value)?)
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> FileResult<()> {
        Ok(self.inner.write_all(bytes)?)
    }

    /// Writes an ASCII string into a fixed-length field, zero padded.
    ///
    /// Longer strings are truncated to the field length.
    pub fn write_ascii_padded(&mut self, text: &str, length: usize) -> FileResult<()> {
        let mut field = vec![0u8; length];
        for (slot, c) in field.iter_mut().zip(text.chars()) {
            *slot = ascii_byte(c);
        }
        self.write_bytes(&field)
    }

    /// Writes a 1-byte-length-prefixed ASCII string.
    pub fn write_ascii_prefixed(&mut self, text: &str) -> FileResult<()> {
        let bytes: Vec<u8> = text.chars().map(ascii_byte).collect();
        if bytes.len() > 255 {
            return Err(FileError::format(format!(
                "string too long for 1-byte length prefix: {} characters",
                bytes.len()
            )));
        }
        self.write_u8(bytes.len() as u8)?;
        self.write_bytes(&bytes)
    }

    /// Writes a 2-byte-length-prefixed UTF-16LE string; the prefix is the
    /// character count.
    pub fn write_utf16_prefixed(&mut self, text: &str) -> FileResult<()> {
        let units: Vec<u16> = text.encode_utf16().collect();
        if units.len() > u16::MAX as usize {
            return Err(FileError::format("string too long for UTF-16 length prefix"));
        }
        self.write_u16_le(units.len() as u16)?;
        for unit in units {
            self.write_u16_le(unit)?;
        }
        Ok(())
    }

    /// Writes a 7-bit variable-length integer, LSB first. Emits at least
    /// one byte; returns the number of bytes written.
    pub fn write_varint(&mut self, mut value: u64) -> FileResult<usize> {
        let mut count = 0usize;
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.write_u8(byte)?;
            count += 1;
            if value == 0 {
                return Ok(count);
            }
        }
    }
}

/// Maps a char to an ASCII byte, substituting `?` for anything else.
fn ascii_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        b'?'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pushback_is_served_first() {
        let mut reader = StreamReader::new(Cursor::new(vec![2u8, 3]));
        assert_eq!(reader.read_u8().unwrap(), 2);
        reader.unread_byte(2);
        assert_eq!(reader.read_u8().unwrap(), 2);
        assert_eq!(reader.read_u8().unwrap(), 3);
    }

    #[test]
    fn test_pushback_participates_in_multi_byte_reads() {
        let mut reader = StreamReader::new(Cursor::new(vec![0x12u8, 0x34, 0x56]));
        let first = reader.read_u8().unwrap();
        reader.unread_byte(first);
        assert_eq!(reader.read_u16_le().unwrap(), 0x3412);
        assert_eq!(reader.read_u8().unwrap(), 0x56);
    }

    #[test]
    fn test_endian_round_trips() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_u16_le(0x1234).unwrap();
        writer.write_u32_be(0xDEADBEEF).unwrap();
        writer.write_f32_le(1.5).unwrap();
        writer.write_u64_le(0x0102030405060708).unwrap();
        let bytes = writer.into_inner();

        let mut reader = StreamReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_be().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_f32_le().unwrap(), 1.5);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102030405060708);
    }

    #[test]
    fn test_ascii_prefixed_round_trip() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_ascii_prefixed("MultiSample").unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes[0], 11);

        let mut reader = StreamReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_ascii_prefixed().unwrap(), "MultiSample");
    }

    #[test]
    fn test_utf16_prefixed_round_trip() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_utf16_prefixed("Grand Piano äö").unwrap();
        let bytes = writer.into_inner();

        let mut reader = StreamReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_utf16_prefixed().unwrap(), "Grand Piano äö");
    }

    #[test]
    fn test_varint_zero_emits_single_byte() {
        let mut writer = StreamWriter::new(Vec::new());
        assert_eq!(writer.write_varint(0).unwrap(), 1);
        assert_eq!(writer.into_inner(), vec![0]);
    }

    #[test]
    fn test_varint_round_trip() {
        for value in [0u64, 1, 127, 128, 300, 16_383, 16_384, u32::MAX as u64] {
            let mut writer = StreamWriter::new(Vec::new());
            let written = writer.write_varint(value).unwrap();
            let bytes = writer.into_inner();
            assert_eq!(bytes.len(), written);

            let mut reader = StreamReader::new(Cursor::new(bytes));
            let (decoded, consumed) = reader.read_varint().unwrap();
            assert_eq!(decoded, value);
            assert_eq!(consumed, written);
        }
    }

    #[test]
    fn test_varint_known_encoding() {
        // 300 = 0b10_0101100: low seven bits 0x2C with continuation, then 0x02.
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_varint(300).unwrap();
        assert_eq!(writer.into_inner(), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_read_tag_mismatch_is_format_error() {
        let mut reader = StreamReader::new(Cursor::new(b"Korh".to_vec()));
        let error = reader.read_tag(b"Korg").unwrap_err();
        assert!(matches!(error, FileError::Format(_)));
    }
}
