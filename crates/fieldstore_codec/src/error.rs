//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unexpected end of input.
    #[error("unexpected end of input at offset {offset}: needed {needed} more bytes")]
    UnexpectedEof {
        /// Offset where the read started.
        offset: usize,
        /// Bytes that were missing.
        needed: usize,
    },

    /// A VInt ran past ten bytes or overflowed 64 bits.
    #[error("integer overflow at offset {offset}")]
    IntegerOverflow {
        /// Offset of the first byte of the integer.
        offset: usize,
    },

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the first byte of the text.
        offset: usize,
    },

    /// A length prefix is larger than the platform can address.
    #[error("length {length} is too large")]
    LengthTooLarge {
        /// The decoded length.
        length: u64,
    },
}
