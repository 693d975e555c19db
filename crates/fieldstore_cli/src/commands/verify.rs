//! Verify command implementation.

use super::{open_segment, CliError, SegmentFiles};
use fieldstore_core::verify::{verify_segment, SegmentReport, StoredValue};
use std::path::Path;

/// Runs the verify command.
pub fn run(path: &Path, segment: &str, show_fields: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying segment {segment} at {}", path.display());
    println!();

    let files = open_segment(path, segment)?;
    match verify(&files) {
        Ok(report) => {
            print_report(&report, show_fields);
            println!();
            println!("✓ Stored fields verification passed");
            Ok(())
        }
        Err(e) => {
            println!("✗ Stored fields verification failed");
            Err(e.into())
        }
    }
}

/// Decodes every record of the segment and checks the index against it.
pub fn verify(files: &SegmentFiles) -> Result<SegmentReport, CliError> {
    verify_segment(files.index.as_ref(), files.data.as_ref()).map_err(|e| {
        tracing::debug!(error = %e, "segment verification failed");
        CliError::VerificationFailed(e.to_string())
    })
}

fn print_report(report: &SegmentReport, show_fields: bool) {
    let fields: usize = report.documents.iter().map(|d| d.fields.len()).sum();
    println!("Documents checked: {}", report.num_docs());
    println!("Stored fields:     {fields}");
    println!("Index size:        {} bytes", report.index_len);
    println!("Data size:         {} bytes", report.data_len);

    if !show_fields {
        return;
    }
    for (doc, document) in report.documents.iter().enumerate() {
        println!();
        println!("doc {doc} @ {} ({} bytes)", document.offset, document.len);
        for field in &document.fields {
            match &field.value {
                StoredValue::Text(text) => {
                    println!("  {} [{:#04x}] text {:?}", field.number, field.bits.as_byte(), text);
                }
                StoredValue::Binary(bytes) => {
                    println!(
                        "  {} [{:#04x}] binary {} bytes",
                        field.number,
                        field.bits.as_byte(),
                        bytes.len()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldstore_storage::InMemoryBackend;
    use fieldstore_testkit::{scenarios, TestSegment};

    #[test]
    fn verify_written_segment() {
        let segment = TestSegment::memory("_0");
        scenarios::write_articles(&segment, 6);
        let files = SegmentFiles {
            index: segment.open_index(),
            data: segment.open_data(),
        };

        let report = verify(&files).unwrap();
        assert_eq!(report.num_docs(), 6);
    }

    #[test]
    fn verify_detects_trailing_data() {
        let files = SegmentFiles {
            index: Box::new(InMemoryBackend::with_data(0i64.to_be_bytes().to_vec())),
            data: Box::new(InMemoryBackend::with_data(vec![0, 0xFF])),
        };

        assert!(matches!(
            verify(&files),
            Err(CliError::VerificationFailed(_))
        ));
    }
}
