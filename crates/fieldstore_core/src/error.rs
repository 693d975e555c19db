//! Error types for fieldstore core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while writing stored fields.
///
/// None of these are retried. After any error raised mid-document the
/// caller must treat the segment being written as invalid.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] fieldstore_storage::StorageError),

    /// Primitive codec error.
    #[error("codec error: {0}")]
    Codec(#[from] fieldstore_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The field name has no number in the registry.
    #[error("field not registered: {name}")]
    UnregisteredField {
        /// Name of the field.
        name: String,
    },

    /// The field asks for a feature the writer does not provide.
    #[error("unsupported feature for field {field}: {message}")]
    UnsupportedFeature {
        /// Name of the field.
        field: String,
        /// What is unsupported.
        message: String,
    },

    /// The field has no value source the writer can resolve.
    #[error("no value set for field {field}")]
    MissingValue {
        /// Name of the field.
        field: String,
    },

    /// A character stream is longer than the writer accepts.
    #[error("field {field} too long: {length} characters, maximum {max}")]
    DataTooLarge {
        /// Name of the field.
        field: String,
        /// Characters read.
        length: u64,
        /// Configured maximum.
        max: u64,
    },

    /// A bulk copy left the data file at an unexpected position.
    #[error("stream integrity violated: data file at {actual}, expected {expected}")]
    StreamIntegrity {
        /// Position the copy should have reached.
        expected: u64,
        /// Position actually reached.
        actual: u64,
    },

    /// The stored-field files are malformed.
    #[error("segment corruption: {message}")]
    SegmentCorruption {
        /// Description of the corruption.
        message: String,
    },

    /// The writer has been closed.
    #[error("stored fields writer is closed")]
    WriterClosed,

    /// Operation not permitted with the given arguments.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an unregistered field error.
    pub fn unregistered_field(name: impl Into<String>) -> Self {
        Self::UnregisteredField { name: name.into() }
    }

    /// Creates an unsupported feature error.
    pub fn unsupported_feature(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing value error.
    pub fn missing_value(field: impl Into<String>) -> Self {
        Self::MissingValue {
            field: field.into(),
        }
    }

    /// Creates a segment corruption error.
    pub fn segment_corruption(message: impl Into<String>) -> Self {
        Self::SegmentCorruption {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
