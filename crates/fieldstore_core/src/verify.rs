//! Segment verification.
//!
//! Decodes a stored-field index/data pair and checks that every index entry
//! points at the start of a well-formed record and that records tile the
//! data file with no gaps.

use crate::error::{CoreError, CoreResult};
use crate::format::{FieldBits, INDEX_ENTRY_SIZE};
use crate::registry::FieldNumber;
use fieldstore_codec::DataReader;
use fieldstore_storage::StorageBackend;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    /// Text payload.
    Text(String),
    /// Binary payload.
    Binary(Vec<u8>),
}

/// A decoded field record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredField {
    /// Field number.
    pub number: FieldNumber,
    /// Flag byte.
    pub bits: FieldBits,
    /// Payload.
    pub value: StoredValue,
}

/// A decoded document record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Offset of the record in the data file.
    pub offset: u64,
    /// Encoded length of the record.
    pub len: u64,
    /// Fields in stored order.
    pub fields: Vec<StoredField>,
}

/// Result of verifying a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    /// Size of the index file.
    pub index_len: u64,
    /// Size of the data file.
    pub data_len: u64,
    /// Decoded documents, in document order.
    pub documents: Vec<StoredDocument>,
}

impl SegmentReport {
    /// Number of documents.
    #[must_use]
    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }

    /// Byte length of each record, as a merge would pass to
    /// [`crate::StoredFieldsWriter::add_raw_documents`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if a record is too long to
    /// express as a raw-copy length.
    pub fn record_lengths(&self) -> CoreResult<Vec<u32>> {
        self.documents
            .iter()
            .map(|d| {
                u32::try_from(d.len).map_err(|_| {
                    CoreError::invalid_operation(format!(
                        "record at offset {} is {} bytes, too long for a raw copy",
                        d.offset, d.len
                    ))
                })
            })
            .collect()
    }
}

/// Reads the index file into a list of record offsets.
///
/// # Errors
///
/// Returns [`CoreError::SegmentCorruption`] if the index size is not a
/// multiple of the entry size or an entry is negative.
pub fn read_index(index: &dyn StorageBackend) -> CoreResult<Vec<u64>> {
    let len = index.size()?;
    if len % INDEX_ENTRY_SIZE != 0 {
        return Err(CoreError::segment_corruption(format!(
            "index length {len} is not a multiple of {INDEX_ENTRY_SIZE}"
        )));
    }

    let bytes = index.read_at(0, to_usize(len)?)?;
    let mut reader = DataReader::new(&bytes);
    let mut offsets = Vec::with_capacity(bytes.len() / INDEX_ENTRY_SIZE as usize);
    while !reader.is_empty() {
        let entry = reader.read_long()?;
        let offset = u64::try_from(entry).map_err(|_| {
            CoreError::segment_corruption(format!("negative index entry {entry}"))
        })?;
        offsets.push(offset);
    }
    Ok(offsets)
}

/// Decodes one document record from the start of `bytes`.
///
/// Returns the document's fields and the number of bytes consumed.
///
/// # Errors
///
/// Returns a codec error if the record is truncated or malformed, or
/// [`CoreError::SegmentCorruption`] if a field is flagged compressed.
pub fn decode_document(bytes: &[u8]) -> CoreResult<(Vec<StoredField>, usize)> {
    let mut reader = DataReader::new(bytes);
    let count = reader.read_len()?;
    let mut fields = Vec::with_capacity(count.min(1024));

    for _ in 0..count {
        let number = u32::try_from(reader.read_vint()?)
            .map_err(|_| CoreError::segment_corruption("field number exceeds u32"))?;
        let bits = FieldBits::from_byte(reader.read_byte()?);
        if bits.is_compressed() {
            return Err(CoreError::segment_corruption(format!(
                "field {number} is flagged compressed"
            )));
        }
        let value = if bits.is_binary() {
            StoredValue::Binary(reader.read_counted_bytes()?.to_vec())
        } else {
            StoredValue::Text(reader.read_string()?)
        };
        fields.push(StoredField {
            number: FieldNumber(number),
            bits,
            value,
        });
    }

    Ok((fields, reader.position()))
}

/// Decodes and cross-checks an index/data pair.
///
/// # Errors
///
/// Returns [`CoreError::SegmentCorruption`] if entries are out of order, a
/// record does not end exactly where the next begins, or the last record
/// does not end at the end of the data file. Decoding errors propagate.
pub fn verify_segment(
    index: &dyn StorageBackend,
    data: &dyn StorageBackend,
) -> CoreResult<SegmentReport> {
    let offsets = read_index(index)?;
    let data_len = data.size()?;
    let bytes = data.read_at(0, to_usize(data_len)?)?;

    let mut documents = Vec::with_capacity(offsets.len());
    let mut expected = 0u64;
    for (doc, &offset) in offsets.iter().enumerate() {
        if offset != expected {
            return Err(CoreError::segment_corruption(format!(
                "document {doc} starts at {offset}, previous record ended at {expected}"
            )));
        }
        let start = to_usize(offset)?;
        let Some(record) = bytes.get(start..) else {
            return Err(CoreError::segment_corruption(format!(
                "document {doc} starts past end of data ({offset} > {data_len})"
            )));
        };
        let (fields, consumed) = decode_document(record)?;
        let len = consumed as u64;
        documents.push(StoredDocument {
            offset,
            len,
            fields,
        });
        expected = offset + len;
    }

    if expected != data_len {
        return Err(CoreError::segment_corruption(format!(
            "records end at {expected} but data file is {data_len} bytes"
        )));
    }

    Ok(SegmentReport {
        index_len: index.size()?,
        data_len,
        documents,
    })
}

fn to_usize(len: u64) -> CoreResult<usize> {
    usize::try_from(len)
        .map_err(|_| CoreError::invalid_operation(format!("length {len} exceeds address space")))
}
