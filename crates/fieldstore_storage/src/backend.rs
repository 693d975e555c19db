//! Storage backend trait definition.

use crate::error::StorageResult;
use std::io::{ErrorKind, Read};

/// A low-level, append-only storage backend.
///
/// Storage backends are **opaque byte stores**. They provide simple operations
/// for appending, reading back, and flushing data. Callers own all format
/// interpretation - backends do not understand documents, fields, or offsets.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `size` is the position of the next `append`
/// - `read_at` returns exactly the bytes previously written at that offset
/// - After `close`, every mutating operation fails with
///   [`StorageError::Closed`](crate::StorageError::Closed)
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The offset is beyond the current size
    /// - The read would extend beyond the current size
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data to the end of the storage.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs or the storage is closed.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes all pending writes to the operating system.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Syncs all data and metadata to durable storage.
    ///
    /// This is a stronger guarantee than `flush` - it ensures that
    /// file metadata (size, timestamps) is also durable.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Flushes and releases the storage.
    ///
    /// Closing an already closed backend is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    fn close(&mut self) -> StorageResult<()>;

    /// Copies up to `len` bytes from `source` onto the end of the storage,
    /// in chunks of at most `chunk_size` bytes.
    ///
    /// Stops early if `source` reaches end of input. Returns the number of
    /// bytes actually copied; callers that require an exact count must
    /// compare it themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if reading `source` or appending fails.
    fn append_from(
        &mut self,
        source: &mut dyn Read,
        len: u64,
        chunk_size: usize,
    ) -> StorageResult<u64> {
        let mut buffer = vec![0u8; chunk_size.max(1)];
        let mut copied = 0u64;

        while copied < len {
            let want = usize::try_from(len - copied)
                .map_or(buffer.len(), |remaining| remaining.min(buffer.len()));
            let n = match source.read(&mut buffer[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.append(&buffer[..n])?;
            copied += n as u64;
        }

        Ok(copied)
    }
}
