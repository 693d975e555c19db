//! Test fixtures and segment helpers.
//!
//! Provides temporary segment directories, an instrumented backend for
//! ownership tests, and ready-made documents.

use fieldstore_core::{
    CoreResult, Document, Field, FieldFlags, FieldRegistry, StoredFieldsConfig,
    StoredFieldsWriter,
};
use fieldstore_core::format::{segment_file_name, FIELDS_EXTENSION, FIELDS_INDEX_EXTENSION};
use fieldstore_core::verify::{verify_segment, SegmentReport};
use fieldstore_storage::{
    Directory, FsDirectory, InMemoryBackend, RamDirectory, StorageBackend, StorageResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// A segment directory that is removed when dropped.
pub struct TestSegment {
    /// The directory holding the segment files.
    pub dir: Box<dyn Directory>,
    /// Segment name.
    pub name: String,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestSegment {
    /// Creates a segment in a RAM directory.
    pub fn memory(name: &str) -> Self {
        Self {
            dir: Box::new(RamDirectory::new()),
            name: name.to_string(),
            _temp_dir: None,
        }
    }

    /// Creates a segment in a temporary file-system directory.
    pub fn file(name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = FsDirectory::open_for_write(temp_dir.path())
            .expect("Failed to open segment directory");
        Self {
            dir: Box::new(dir),
            name: name.to_string(),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Creates an owning writer for this segment.
    pub fn writer(
        &self,
        registry: Arc<FieldRegistry>,
        config: StoredFieldsConfig,
    ) -> StoredFieldsWriter<'static> {
        StoredFieldsWriter::create(self.dir.as_ref(), &self.name, registry, config)
            .expect("Failed to create stored fields writer")
    }

    /// Name of the data file.
    pub fn data_file(&self) -> String {
        segment_file_name(&self.name, FIELDS_EXTENSION)
    }

    /// Name of the index file.
    pub fn index_file(&self) -> String {
        segment_file_name(&self.name, FIELDS_INDEX_EXTENSION)
    }

    /// Opens the data file for reading.
    pub fn open_data(&self) -> Box<dyn StorageBackend> {
        self.dir
            .open_input(&self.data_file())
            .expect("Failed to open data file")
    }

    /// Opens the index file for reading.
    pub fn open_index(&self) -> Box<dyn StorageBackend> {
        self.dir
            .open_input(&self.index_file())
            .expect("Failed to open index file")
    }

    /// Decodes and verifies the segment's stored fields.
    pub fn verify(&self) -> CoreResult<SegmentReport> {
        verify_segment(self.open_index().as_ref(), self.open_data().as_ref())
    }
}

/// Counters shared between a [`CountingBackend`] and the test observing it.
#[derive(Debug, Default)]
pub struct BackendCounters {
    closes: AtomicUsize,
    flushes: AtomicUsize,
    syncs: AtomicUsize,
}

impl BackendCounters {
    /// Number of `close` calls.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Number of `flush` calls.
    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Number of `sync` calls.
    pub fn syncs(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }
}

/// An in-memory backend that counts lifecycle calls.
#[derive(Debug, Default)]
pub struct CountingBackend {
    inner: InMemoryBackend,
    counters: Arc<BackendCounters>,
}

impl CountingBackend {
    /// Creates a backend and returns it with its counters.
    pub fn new() -> (Self, Arc<BackendCounters>) {
        let backend = Self::default();
        let counters = Arc::clone(&backend.counters);
        (backend, counters)
    }

    /// Returns a handle sharing this backend's bytes.
    pub fn share(&self) -> InMemoryBackend {
        self.inner.share()
    }
}

impl StorageBackend for CountingBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.counters.flushes.fetch_add(1, Ordering::SeqCst);
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.counters.syncs.fetch_add(1, Ordering::SeqCst);
        self.inner.sync()
    }

    fn close(&mut self) -> StorageResult<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close()
    }
}

/// Ready-made documents and registries.
pub mod scenarios {
    use super::*;

    /// Field names used by [`article`].
    pub const ARTICLE_FIELDS: [&str; 4] = ["id", "title", "body", "thumbnail"];

    /// A registry holding [`ARTICLE_FIELDS`].
    pub fn article_registry() -> Arc<FieldRegistry> {
        Arc::new(ARTICLE_FIELDS.into_iter().collect())
    }

    /// An article document: stored id and title, indexed-only body, and a
    /// binary thumbnail.
    pub fn article(i: usize) -> Document {
        Document::new()
            .with_field(Field::text("id", i.to_string(), FieldFlags::STORED))
            .with_field(Field::text(
                "title",
                format!("Article number {i}"),
                FieldFlags::STORED | FieldFlags::INDEXED | FieldFlags::TOKENIZED,
            ))
            .with_field(Field::text(
                "body",
                "body text is indexed but not stored",
                FieldFlags::INDEXED | FieldFlags::TOKENIZED,
            ))
            .with_field(Field::binary("thumbnail", vec![(i % 256) as u8; i % 7]))
    }

    /// Writes `count` articles to `segment` and closes the writer.
    pub fn write_articles(segment: &TestSegment, count: usize) -> Vec<u64> {
        let mut writer = segment.writer(article_registry(), StoredFieldsConfig::default());
        let offsets = (0..count)
            .map(|i| {
                writer
                    .add_document(&mut article(i))
                    .expect("Failed to add article")
            })
            .collect();
        writer.close().expect("Failed to close writer");
        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_segment_roundtrip() {
        let segment = TestSegment::memory("_0");
        let offsets = scenarios::write_articles(&segment, 5);

        let report = segment.verify().unwrap();
        assert_eq!(report.num_docs(), 5);
        let starts: Vec<u64> = report.documents.iter().map(|d| d.offset).collect();
        assert_eq!(starts, offsets);
    }

    #[test]
    fn test_file_segment_roundtrip() {
        let segment = TestSegment::file("_1");
        scenarios::write_articles(&segment, 3);

        let report = segment.verify().unwrap();
        assert_eq!(report.num_docs(), 3);
        assert_eq!(report.index_len, 24);
    }

    #[test]
    fn test_counting_backend_counts() {
        let (mut backend, counters) = CountingBackend::new();
        backend.flush().unwrap();
        backend.close().unwrap();
        backend.close().unwrap();

        assert_eq!(counters.flushes(), 1);
        assert_eq!(counters.closes(), 2);
    }
}
