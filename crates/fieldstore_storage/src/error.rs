//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the end of storage.
    #[error("read beyond end of storage: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The current storage size.
        size: u64,
    },

    /// The storage was opened for reading only.
    #[error("storage is read-only: {path:?}")]
    ReadOnly {
        /// Path of the file.
        path: PathBuf,
    },

    /// The storage is closed.
    #[error("storage is closed")]
    Closed,

    /// The named file does not exist in the directory.
    #[error("file not found: {name}")]
    FileNotFound {
        /// File name within the directory.
        name: String,
    },

    /// Another writer holds the directory lock.
    #[error("directory locked: {path:?}")]
    Locked {
        /// Path of the lock file.
        path: PathBuf,
    },
}
