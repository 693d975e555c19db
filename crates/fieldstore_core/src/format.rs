//! Stored-field file format.
//!
//! Each segment has two companion files:
//!
//! ```text
//! <segment>.fdx   index: one Long per document, in document order
//!                 | start offset of doc 0 (8) | start offset of doc 1 (8) | ...
//!
//! <segment>.fdt   data: one record per document, back to back
//!                 | stored field count (VInt) | field record | field record | ...
//!
//! field record    | field number (VInt) | bits (1) | payload |
//! payload         binary: | byte length (VInt) | bytes |
//!                 text:   | char count (VInt)  | UTF-8 |
//! ```
//!
//! Longs are 8-byte big-endian. The size of the index file is always
//! `8 * document count`; entry `i` is the data file offset where record `i`
//! begins.
//!
//! Bits of the field record flag byte:
//! - `0x01` = tokenized
//! - `0x02` = binary (payload is a byte string, not text)
//! - `0x04` = compressed (never written; reserved)

use crate::field::FieldFlags;

/// Extension of the data file.
pub const FIELDS_EXTENSION: &str = "fdt";

/// Extension of the index file.
pub const FIELDS_INDEX_EXTENSION: &str = "fdx";

/// Size of one index entry in bytes.
pub const INDEX_ENTRY_SIZE: u64 = fieldstore_codec::LONG_SIZE as u64;

/// Returns `<segment>.<extension>`.
#[must_use]
pub fn segment_file_name(segment: &str, extension: &str) -> String {
    format!("{segment}.{extension}")
}

/// The flag byte written in each field record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldBits(u8);

impl FieldBits {
    /// No bits set.
    pub const NONE: Self = Self(0);
    /// The field was tokenized.
    pub const TOKENIZED: u8 = 0x01;
    /// The payload is binary.
    pub const BINARY: u8 = 0x02;
    /// The payload is compressed.
    pub const COMPRESSED: u8 = 0x04;

    /// Derives the on-disk bits from a field's flags.
    #[must_use]
    pub const fn from_flags(flags: FieldFlags) -> Self {
        let mut bits = 0;
        if flags.is_tokenized() {
            bits |= Self::TOKENIZED;
        }
        if flags.is_binary() {
            bits |= Self::BINARY;
        }
        if flags.is_compressed() {
            bits |= Self::COMPRESSED;
        }
        Self(bits)
    }

    /// Creates bits from a raw byte.
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Self(b)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Checks if the tokenized bit is set.
    #[must_use]
    pub const fn is_tokenized(self) -> bool {
        self.0 & Self::TOKENIZED != 0
    }

    /// Checks if the binary bit is set.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        self.0 & Self::BINARY != 0
    }

    /// Checks if the compressed bit is set.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED != 0
    }
}
