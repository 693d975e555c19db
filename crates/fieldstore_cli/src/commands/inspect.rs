//! Inspect command implementation.

use super::{open_segment, OutputFormat, SegmentFiles};
use fieldstore_core::format::INDEX_ENTRY_SIZE;
use fieldstore_core::verify::read_index;
use serde::Serialize;
use std::path::Path;

/// Segment inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Directory path.
    pub path: String,
    /// Segment name.
    pub segment: String,
    /// Index file size in bytes.
    pub index_size: u64,
    /// Data file size in bytes.
    pub data_size: u64,
    /// Number of documents, from the index size.
    pub document_count: u64,
    /// Per-document layout (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentLayout>>,
}

/// Where one document's record lives in the data file.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Document number within the segment.
    pub doc: u64,
    /// Record offset.
    pub offset: u64,
    /// Record length, up to the next record or the end of the data file.
    pub length: u64,
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    segment: &str,
    show_documents: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = open_segment(path, segment)?;
    let result = inspect(&files, path, segment, show_documents)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects sizes and, optionally, the record layout of a segment.
///
/// Only the index is decoded; records are not parsed.
pub fn inspect(
    files: &SegmentFiles,
    path: &Path,
    segment: &str,
    show_documents: bool,
) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let index_size = files.index.size()?;
    let data_size = files.data.size()?;

    let documents = if show_documents {
        let offsets = read_index(files.index.as_ref())?;
        Some(layout(&offsets, data_size))
    } else {
        None
    };

    Ok(InspectResult {
        path: path.display().to_string(),
        segment: segment.to_string(),
        index_size,
        data_size,
        document_count: index_size / INDEX_ENTRY_SIZE,
        documents,
    })
}

fn layout(offsets: &[u64], data_size: u64) -> Vec<DocumentLayout> {
    offsets
        .iter()
        .enumerate()
        .map(|(doc, &offset)| {
            let end = offsets.get(doc + 1).copied().unwrap_or(data_size);
            DocumentLayout {
                doc: doc as u64,
                offset,
                length: end.saturating_sub(offset),
            }
        })
        .collect()
}

fn print_text_output(result: &InspectResult) {
    println!("Stored Fields Inspection");
    println!("========================");
    println!();
    println!("Path:    {}", result.path);
    println!("Segment: {}", result.segment);
    println!();
    println!("Files:");
    println!("  Index: {} bytes", result.index_size);
    println!("  Data:  {} bytes", result.data_size);
    println!();
    println!("Documents: {}", result.document_count);
    if result.index_size % INDEX_ENTRY_SIZE != 0 {
        println!(
            "  (index has {} trailing bytes)",
            result.index_size % INDEX_ENTRY_SIZE
        );
    }

    if let Some(documents) = &result.documents {
        println!();
        println!("{:>8}  {:>12}  {:>10}", "doc", "offset", "length");
        for d in documents {
            println!("{:>8}  {:>12}  {:>10}", d.doc, d.offset, d.length);
        }
    }
}
