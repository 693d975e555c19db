//! Positioned sequential reader over a storage backend.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use std::io::{self, Read, Seek, SeekFrom};

/// A sequential reader with a queryable position over any [`StorageBackend`].
///
/// This is the input side of a segment file: a merge positions a reader at
/// the first byte of a run of documents in another segment's data file and
/// hands it to the writer's raw-copy path, which consumes it from the
/// current position.
///
/// # Example
///
/// ```rust
/// use fieldstore_storage::{BackendReader, InMemoryBackend};
/// use std::io::Read;
///
/// let backend = InMemoryBackend::with_data(b"abcdef".to_vec());
/// let mut reader = BackendReader::at(&backend, 2);
/// let mut buf = [0u8; 3];
/// reader.read_exact(&mut buf).unwrap();
/// assert_eq!(&buf, b"cde");
/// assert_eq!(reader.position(), 5);
/// ```
pub struct BackendReader<'a> {
    backend: &'a dyn StorageBackend,
    position: u64,
}

impl<'a> BackendReader<'a> {
    /// Creates a reader positioned at the start of `backend`.
    pub fn new(backend: &'a dyn StorageBackend) -> Self {
        Self::at(backend, 0)
    }

    /// Creates a reader positioned at `position`.
    pub fn at(backend: &'a dyn StorageBackend, position: u64) -> Self {
        Self { backend, position }
    }

    /// Returns the offset of the next byte to be read.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the number of bytes between the position and the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend size cannot be determined.
    pub fn remaining(&self) -> StorageResult<u64> {
        Ok(self.backend.size()?.saturating_sub(self.position))
    }
}

impl Read for BackendReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining().map_err(io::Error::other)?;
        let len = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        if len == 0 {
            return Ok(0);
        }

        let bytes = self
            .backend
            .read_at(self.position, len)
            .map_err(io::Error::other)?;
        buf[..len].copy_from_slice(&bytes);
        self.position += len as u64;
        Ok(len)
    }
}

impl Seek for BackendReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let size = self.backend.size().map_err(io::Error::other)?;
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => size.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            ));
        };
        self.position = target;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackend;
    use proptest::prelude::*;

    #[test]
    fn reader_reads_to_end() {
        let backend = InMemoryBackend::with_data(b"hello world".to_vec());
        let mut reader = BackendReader::new(&backend);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello world");
        assert_eq!(reader.position(), 11);
        assert_eq!(reader.remaining().unwrap(), 0);
    }

    #[test]
    fn reader_seek_and_read() {
        let backend = InMemoryBackend::with_data(b"hello world".to_vec());
        let mut reader = BackendReader::new(&backend);

        reader.seek(SeekFrom::End(-5)).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "world");
    }

    #[test]
    fn reader_past_end_yields_eof() {
        let backend = InMemoryBackend::with_data(b"abc".to_vec());
        let mut reader = BackendReader::at(&backend, 10);

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn reader_negative_seek_fails() {
        let backend = InMemoryBackend::with_data(b"abc".to_vec());
        let mut reader = BackendReader::new(&backend);

        assert!(reader.seek(SeekFrom::Current(-1)).is_err());
    }

    proptest! {
        #[test]
        fn append_from_copies_requested_run(
            source in prop::collection::vec(any::<u8>(), 0..512),
            start in 0usize..600,
            len in 0u64..600,
            chunk_size in 0usize..64,
        ) {
            let backend = InMemoryBackend::with_data(source.clone());
            let mut reader = BackendReader::at(&backend, start as u64);
            let mut target = InMemoryBackend::with_data(vec![0xAA; 3]);

            let copied = target.append_from(&mut reader, len, chunk_size).unwrap();

            let begin = start.min(source.len());
            let end = begin.saturating_add(len as usize).min(source.len());
            prop_assert_eq!(copied, (end - begin) as u64);
            prop_assert_eq!(reader.position(), start as u64 + copied);
            prop_assert_eq!(target.size().unwrap(), 3 + copied);
            prop_assert_eq!(&target.data()[3..], &source[begin..end]);
        }
    }
}
