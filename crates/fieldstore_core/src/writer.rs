//! Stored-field writer.

use crate::config::StoredFieldsConfig;
use crate::encoder::FieldEncoder;
use crate::error::{CoreError, CoreResult};
use crate::field::Document;
use crate::format::{segment_file_name, FIELDS_EXTENSION, FIELDS_INDEX_EXTENSION};
use crate::registry::FieldRegistry;
use fieldstore_codec::DataWriter;
use fieldstore_storage::{Directory, StorageBackend};
use std::io::Read;
use std::sync::Arc;

/// The index and data streams, and who is responsible for closing them.
enum Streams<'a> {
    /// Created by the writer; closed by it.
    Owned {
        index: Box<dyn StorageBackend>,
        data: Box<dyn StorageBackend>,
    },
    /// Lent by another owner; never closed by the writer.
    Borrowed {
        index: &'a mut dyn StorageBackend,
        data: &'a mut dyn StorageBackend,
    },
    /// Owned streams that have been released.
    Closed,
}

impl Streams<'_> {
    fn pair(&mut self) -> CoreResult<(&mut dyn StorageBackend, &mut dyn StorageBackend)> {
        match self {
            Self::Owned { index, data } => Ok((index.as_mut(), data.as_mut())),
            Self::Borrowed { index, data } => Ok((&mut **index, &mut **data)),
            Self::Closed => Err(CoreError::WriterClosed),
        }
    }

    fn data(&self) -> CoreResult<&dyn StorageBackend> {
        match self {
            Self::Owned { data, .. } => Ok(data.as_ref()),
            Self::Borrowed { data, .. } => Ok(&**data),
            Self::Closed => Err(CoreError::WriterClosed),
        }
    }

    fn index(&self) -> CoreResult<&dyn StorageBackend> {
        match self {
            Self::Owned { index, .. } => Ok(index.as_ref()),
            Self::Borrowed { index, .. } => Ok(&**index),
            Self::Closed => Err(CoreError::WriterClosed),
        }
    }
}

/// Writes the stored fields of a segment.
///
/// Appends one record per document to the data file and one 8-byte entry
/// per document to the index file (see [`crate::format`]).
///
/// # Ownership
///
/// A writer built with [`create`](Self::create) or
/// [`from_owned`](Self::from_owned) owns its streams and closes them on
/// [`close`](Self::close) or drop. A writer built with
/// [`with_streams`](Self::with_streams) borrows them and never closes them;
/// the lender keeps using them after the writer is gone.
///
/// # Concurrency
///
/// One writer serves one pipeline. All methods take `&mut self` and there is
/// no internal locking; callers serialize access to the streams and to the
/// shared registry themselves.
///
/// # Errors
///
/// A document that fails to encode leaves both streams untouched. A storage
/// or integrity error in the middle of an append leaves them misaligned, and
/// the segment must be discarded.
pub struct StoredFieldsWriter<'a> {
    streams: Streams<'a>,
    registry: Arc<FieldRegistry>,
    config: StoredFieldsConfig,
    scratch: DataWriter,
    num_docs: u64,
}

impl StoredFieldsWriter<'static> {
    /// Creates `<segment>.fdt` and `<segment>.fdx` in `directory` and returns
    /// a writer that owns them.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be created.
    pub fn create(
        directory: &dyn Directory,
        segment: &str,
        registry: Arc<FieldRegistry>,
        config: StoredFieldsConfig,
    ) -> CoreResult<Self> {
        let data = directory.create_output(&segment_file_name(segment, FIELDS_EXTENSION))?;
        let index =
            directory.create_output(&segment_file_name(segment, FIELDS_INDEX_EXTENSION))?;
        tracing::debug!(segment, "opened stored fields writer");
        Ok(Self::from_owned(index, data, registry, config))
    }

    /// Returns a writer that owns the given streams.
    pub fn from_owned(
        index: Box<dyn StorageBackend>,
        data: Box<dyn StorageBackend>,
        registry: Arc<FieldRegistry>,
        config: StoredFieldsConfig,
    ) -> Self {
        Self::new(Streams::Owned { index, data }, registry, config)
    }
}

impl<'a> StoredFieldsWriter<'a> {
    /// Returns a writer over streams owned by someone else.
    ///
    /// [`close`](Self::close) on this writer is a no-op.
    pub fn with_streams(
        index: &'a mut dyn StorageBackend,
        data: &'a mut dyn StorageBackend,
        registry: Arc<FieldRegistry>,
        config: StoredFieldsConfig,
    ) -> Self {
        Self::new(Streams::Borrowed { index, data }, registry, config)
    }

    fn new(streams: Streams<'a>, registry: Arc<FieldRegistry>, config: StoredFieldsConfig) -> Self {
        Self {
            streams,
            registry,
            config,
            scratch: DataWriter::new(),
            num_docs: 0,
        }
    }

    /// Returns an encoder sharing this writer's registry and configuration.
    ///
    /// Use it to fill a [`crate::StoredFieldsBuffer`] for
    /// [`flush_document`](Self::flush_document).
    #[must_use]
    pub fn field_encoder(&self) -> FieldEncoder<'_> {
        FieldEncoder::new(&self.registry, &self.config)
    }

    /// Appends the stored fields of `document`.
    ///
    /// Fields without the stored flag are skipped; the rest are written in
    /// document order. Stream values are consumed. Returns the data file
    /// offset where the record begins, which is also the index entry written
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns any encoder error (nothing is written in that case), or a
    /// storage error from either stream.
    pub fn add_document(&mut self, document: &mut Document) -> CoreResult<u64> {
        self.streams.pair()?;

        let encoder = FieldEncoder::new(&self.registry, &self.config);
        self.scratch.clear();
        self.scratch.write_vint(document.stored_count() as u64);
        for field in document.fields_mut().iter_mut().filter(|f| f.is_stored()) {
            encoder.encode_field(field, &mut self.scratch)?;
        }

        let start = append_document(&mut self.streams, &[self.scratch.as_bytes()])?;
        self.num_docs += 1;
        tracing::trace!(
            doc = self.num_docs - 1,
            offset = start,
            stored = document.stored_count(),
            "added document"
        );
        Ok(start)
    }

    /// Appends a document whose field records were encoded elsewhere.
    ///
    /// `encoded` must hold exactly `num_stored_fields` field records; it is
    /// copied verbatim without validation. Returns the record's offset.
    ///
    /// # Errors
    ///
    /// Returns a storage error from either stream.
    pub fn flush_document(&mut self, num_stored_fields: u32, encoded: &[u8]) -> CoreResult<u64> {
        self.streams.pair()?;

        self.scratch.clear();
        self.scratch.write_vint(u64::from(num_stored_fields));

        let start = append_document(&mut self.streams, &[self.scratch.as_bytes(), encoded])?;
        self.num_docs += 1;
        tracing::trace!(
            doc = self.num_docs - 1,
            offset = start,
            stored = num_stored_fields,
            "flushed document"
        );
        Ok(start)
    }

    /// Bulk-copies `num_docs` already encoded documents from `source`.
    ///
    /// `lengths[i]` is the byte length of the `i`-th record; `source` is read
    /// from its current position. Used by merges to avoid decoding and
    /// re-encoding. The lengths must match the source records exactly.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidOperation`] if `lengths` has fewer than
    ///   `num_docs` entries
    /// - [`CoreError::StreamIntegrity`] if the data file does not end up
    ///   exactly `sum(lengths)` bytes further on, e.g. because `source` ran
    ///   out. The segment must be discarded.
    pub fn add_raw_documents(
        &mut self,
        source: &mut dyn Read,
        lengths: &[u32],
        num_docs: usize,
    ) -> CoreResult<()> {
        let Some(lengths) = lengths.get(..num_docs) else {
            return Err(CoreError::invalid_operation(format!(
                "{num_docs} raw documents requested but only {} lengths given",
                lengths.len()
            )));
        };
        let chunk_size = self.config.copy_buffer_size;
        let (index, data) = self.streams.pair()?;

        let start = data.size()?;
        let mut entries = DataWriter::with_capacity(lengths.len() * fieldstore_codec::LONG_SIZE);
        let mut position = start;
        for &len in lengths {
            entries.write_long(to_entry(position)?);
            position += u64::from(len);
        }

        data.append_from(source, position - start, chunk_size)?;
        let actual = data.size()?;
        if actual != position {
            tracing::error!(
                expected = position,
                actual,
                "raw document copy diverged from source"
            );
            return Err(CoreError::StreamIntegrity {
                expected: position,
                actual,
            });
        }

        index.append(entries.as_bytes())?;
        self.num_docs += num_docs as u64;
        tracing::debug!(docs = num_docs, bytes = position - start, "copied raw documents");
        Ok(())
    }

    /// Flushes both streams.
    ///
    /// Also syncs them when the configuration asks for it. Safe to call
    /// repeatedly.
    ///
    /// # Errors
    ///
    /// Returns a storage error from either stream.
    pub fn flush(&mut self) -> CoreResult<()> {
        let sync = self.config.sync_on_flush;
        let (index, data) = self.streams.pair()?;
        index.flush()?;
        data.flush()?;
        if sync {
            index.sync()?;
            data.sync()?;
        }
        Ok(())
    }

    /// Closes the streams if this writer owns them.
    ///
    /// Borrowed streams are left open. Owned streams are released on the
    /// first call even if closing fails; later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the first error from closing the data or index stream.
    pub fn close(&mut self) -> CoreResult<()> {
        if !matches!(self.streams, Streams::Owned { .. }) {
            return Ok(());
        }
        let Streams::Owned {
            mut index,
            mut data,
        } = std::mem::replace(&mut self.streams, Streams::Closed)
        else {
            return Ok(());
        };

        let data_result = data.close();
        let index_result = index.close();
        tracing::debug!(docs = self.num_docs, "closed stored fields writer");
        data_result?;
        index_result?;
        Ok(())
    }

    /// Number of documents written through this writer.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Current size of the data file, i.e. where the next record begins.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WriterClosed`] after close.
    pub fn data_position(&self) -> CoreResult<u64> {
        Ok(self.streams.data()?.size()?)
    }

    /// Current size of the index file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::WriterClosed`] after close.
    pub fn index_position(&self) -> CoreResult<u64> {
        Ok(self.streams.index()?.size()?)
    }

    /// Whether the writer closes its streams.
    #[must_use]
    pub fn owns_streams(&self) -> bool {
        !matches!(self.streams, Streams::Borrowed { .. })
    }

    /// Whether owned streams have been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.streams, Streams::Closed)
    }

    /// The registry used to number fields.
    #[must_use]
    pub fn registry(&self) -> &Arc<FieldRegistry> {
        &self.registry
    }
}

impl Drop for StoredFieldsWriter<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "failed to close stored fields writer on drop");
        }
    }
}

impl std::fmt::Debug for StoredFieldsWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredFieldsWriter")
            .field("num_docs", &self.num_docs)
            .field("owns_streams", &self.owns_streams())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Writes the index entry for the current data position, then the record
/// parts. Returns the record's start offset.
fn append_document(streams: &mut Streams<'_>, parts: &[&[u8]]) -> CoreResult<u64> {
    let (index, data) = streams.pair()?;
    let start = data.size()?;

    let mut entry = DataWriter::with_capacity(fieldstore_codec::LONG_SIZE);
    entry.write_long(to_entry(start)?);
    index.append(entry.as_bytes())?;

    for part in parts {
        data.append(part)?;
    }
    Ok(start)
}

fn to_entry(position: u64) -> CoreResult<i64> {
    i64::try_from(position).map_err(|_| {
        CoreError::invalid_operation(format!("data file offset {position} exceeds i64::MAX"))
    })
}
