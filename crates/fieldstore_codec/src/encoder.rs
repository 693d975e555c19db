//! Primitive encoder.

use bytes::BufMut;

/// Appends `value` as a VInt: seven bits per byte, low group first,
/// with the high bit set on every byte except the last.
pub fn encode_vint<B: BufMut + ?Sized>(mut value: u64, buf: &mut B) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Returns the number of bytes [`encode_vint`] writes for `value`.
#[must_use]
pub const fn vint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    if bits == 0 {
        1
    } else {
        bits.div_ceil(7)
    }
}

/// An in-memory encoder for segment file primitives.
///
/// The writer never fails; all bytes land in an owned buffer that callers
/// append to a storage backend in one piece.
#[derive(Debug, Default, Clone)]
pub struct DataWriter {
    buffer: Vec<u8>,
}

impl DataWriter {
    /// Create a new writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new writer with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer.put_u8(byte);
    }

    /// Writes a VInt.
    pub fn write_vint(&mut self, value: u64) {
        encode_vint(value, &mut self.buffer);
    }

    /// Writes an 8-byte big-endian signed integer.
    pub fn write_long(&mut self, value: i64) {
        self.buffer.put_i64(value);
    }

    /// Writes raw bytes with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.put_slice(bytes);
    }

    /// Writes a VInt byte length followed by the bytes.
    pub fn write_counted_bytes(&mut self, bytes: &[u8]) {
        self.write_vint(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    /// Writes a VInt character count followed by the UTF-8 bytes of `text`.
    ///
    /// The prefix counts Unicode scalar values, not bytes.
    pub fn write_string(&mut self, text: &str) {
        self.write_vint(text.chars().count() as u64);
        self.write_bytes(text.as_bytes());
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discards everything written so far, keeping the allocation.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get a reference to the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume this writer and return the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vint(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_vint(value, &mut buf);
        buf
    }

    #[test]
    fn vint_single_byte_values() {
        assert_eq!(vint(0), vec![0x00]);
        assert_eq!(vint(1), vec![0x01]);
        assert_eq!(vint(127), vec![0x7F]);
    }

    #[test]
    fn vint_multi_byte_values() {
        assert_eq!(vint(128), vec![0x80, 0x01]);
        assert_eq!(vint(300), vec![0xAC, 0x02]);
        assert_eq!(vint(16_384), vec![0x80, 0x80, 0x01]);
        assert_eq!(vint(u64::MAX).len(), 10);
    }

    #[test]
    fn vint_len_matches_encoding() {
        for value in [0, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            assert_eq!(vint_len(value), vint(value).len(), "value {value}");
        }
    }

    #[test]
    fn long_is_big_endian() {
        let mut writer = DataWriter::new();
        writer.write_long(0x0102_0304_0506_0708);
        assert_eq!(writer.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn negative_long_is_twos_complement() {
        let mut writer = DataWriter::new();
        writer.write_long(-1);
        assert_eq!(writer.as_bytes(), &[0xFF; 8]);
    }

    #[test]
    fn string_prefix_counts_chars_not_bytes() {
        let mut writer = DataWriter::new();
        writer.write_string("héllo");

        // 5 characters, 6 UTF-8 bytes.
        assert_eq!(writer.as_bytes()[0], 5);
        assert_eq!(&writer.as_bytes()[1..], "héllo".as_bytes());
    }

    #[test]
    fn empty_string_is_single_zero() {
        let mut writer = DataWriter::new();
        writer.write_string("");
        assert_eq!(writer.as_bytes(), &[0x00]);
    }

    #[test]
    fn counted_bytes_prefix_is_byte_length() {
        let mut writer = DataWriter::new();
        writer.write_counted_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(writer.as_bytes(), &[4, 0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn clear_resets_length() {
        let mut writer = DataWriter::with_capacity(16);
        writer.write_vint(99);
        writer.clear();
        assert!(writer.is_empty());
        assert_eq!(writer.len(), 0);
    }
}
