//! Primitive decoder.

use crate::error::{CodecError, CodecResult};
use crate::MAX_VINT_LEN;
use bytes::Buf;

/// Decode a VInt from the start of `bytes`, returning `(value, bytes_consumed)`.
///
/// # Errors
///
/// Returns an error if the input ends mid-integer or the integer runs
/// past [`MAX_VINT_LEN`] bytes.
pub fn decode_vint(bytes: &[u8]) -> CodecResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in bytes.iter().enumerate().take(MAX_VINT_LEN) {
        let group = u64::from(byte & 0x7F);
        if shift == 63 && group > 1 {
            return Err(CodecError::IntegerOverflow { offset: 0 });
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    if bytes.len() < MAX_VINT_LEN {
        Err(CodecError::UnexpectedEof {
            offset: 0,
            needed: 1,
        })
    } else {
        Err(CodecError::IntegerOverflow { offset: 0 })
    }
}

/// A cursor that decodes segment file primitives from a byte slice.
///
/// Errors report the absolute offset within the slice where the failing
/// value began.
#[derive(Debug, Clone)]
pub struct DataReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DataReader<'a> {
    /// Create a new reader for the given bytes.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the next unread byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if all bytes have been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?.get_u8())
    }

    /// Reads a VInt.
    pub fn read_vint(&mut self) -> CodecResult<u64> {
        let start = self.pos;
        let (value, consumed) = decode_vint(self.rest()).map_err(|e| match e {
            CodecError::UnexpectedEof { needed, .. } => CodecError::UnexpectedEof {
                offset: start,
                needed,
            },
            _ => CodecError::IntegerOverflow { offset: start },
        })?;
        self.pos += consumed;
        Ok(value)
    }

    /// Reads a VInt that is used as an in-memory length.
    pub fn read_len(&mut self) -> CodecResult<usize> {
        let length = self.read_vint()?;
        usize::try_from(length).map_err(|_| CodecError::LengthTooLarge { length })
    }

    /// Reads an 8-byte big-endian signed integer.
    pub fn read_long(&mut self) -> CodecResult<i64> {
        Ok(self.take(crate::LONG_SIZE)?.get_i64())
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        self.take(len)
    }

    /// Reads a VInt byte length followed by that many bytes.
    pub fn read_counted_bytes(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Reads a VInt character count followed by that many UTF-8 characters.
    pub fn read_string(&mut self) -> CodecResult<String> {
        let chars = self.read_len()?;
        let start = self.pos;

        // Walk lead bytes to find where the last character ends.
        let mut end = start;
        for _ in 0..chars {
            let Some(&lead) = self.data.get(end) else {
                return Err(CodecError::UnexpectedEof {
                    offset: start,
                    needed: 1,
                });
            };
            end += utf8_width(lead).ok_or(CodecError::InvalidUtf8 { offset: start })?;
        }

        let bytes = self.take(end - start)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8 { offset: start })
    }

    /// Skips `len` bytes.
    pub fn skip(&mut self, len: usize) -> CodecResult<()> {
        self.take(len).map(|_| ())
    }
}

fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_vint, DataWriter};
    use proptest::prelude::*;

    #[test]
    fn decode_vint_reports_consumed() {
        assert_eq!(decode_vint(&[0xAC, 0x02, 0xFF]).unwrap(), (300, 2));
    }

    #[test]
    fn decode_vint_empty_is_eof() {
        assert!(matches!(
            decode_vint(&[]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn decode_vint_truncated_is_eof() {
        assert!(matches!(
            decode_vint(&[0x80, 0x80]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn decode_vint_never_terminating_is_overflow() {
        assert!(matches!(
            decode_vint(&[0xFF; 15]),
            Err(CodecError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn read_long_short_input_reports_offset() {
        let mut reader = DataReader::new(&[0x01, 0, 0, 0]);
        reader.read_byte().unwrap();
        assert_eq!(
            reader.read_long(),
            Err(CodecError::UnexpectedEof {
                offset: 1,
                needed: 5
            })
        );
    }

    #[test]
    fn read_string_multibyte() {
        let mut writer = DataWriter::new();
        writer.write_string("日本語 ok");
        writer.write_byte(0xAA);

        let bytes = writer.into_bytes();
        let mut reader = DataReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "日本語 ok");
        assert_eq!(reader.read_byte().unwrap(), 0xAA);
    }

    #[test]
    fn read_string_rejects_invalid_lead_byte() {
        let mut reader = DataReader::new(&[0x01, 0xFF]);
        assert!(matches!(
            reader.read_string(),
            Err(CodecError::InvalidUtf8 { offset: 1 })
        ));
    }

    #[test]
    fn read_string_truncated() {
        let mut reader = DataReader::new(&[0x03, b'a', b'b']);
        assert!(matches!(
            reader.read_string(),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    proptest! {
        #[test]
        fn vint_decodes_what_was_encoded(value in any::<u64>()) {
            let mut buf = Vec::new();
            encode_vint(value, &mut buf);
            prop_assert_eq!(decode_vint(&buf).unwrap(), (value, buf.len()));
        }

        #[test]
        fn string_decodes_what_was_encoded(text in ".{0,64}") {
            let mut writer = DataWriter::new();
            writer.write_string(&text);
            let bytes = writer.into_bytes();
            let mut reader = DataReader::new(&bytes);
            prop_assert_eq!(reader.read_string().unwrap(), text);
            prop_assert!(reader.is_empty());
        }
    }
}
