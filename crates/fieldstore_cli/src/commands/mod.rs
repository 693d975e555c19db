//! CLI command implementations.

pub mod inspect;
pub mod verify;

use fieldstore_core::format::{segment_file_name, FIELDS_EXTENSION, FIELDS_INDEX_EXTENSION};
use fieldstore_storage::{Directory, FsDirectory, StorageBackend};
use std::path::{Path, PathBuf};

/// Errors raised by the CLI before any segment data is decoded.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A segment file is missing from the directory.
    #[error("segment file {name} not found in {}", dir.display())]
    MissingFile {
        /// Directory searched.
        dir: PathBuf,
        /// Missing file name.
        name: String,
    },

    /// The segment directory does not exist.
    #[error("no segment directory at {}", .0.display())]
    NotADirectory(PathBuf),

    /// Unknown output format.
    #[error("unknown output format '{0}' (expected text or json)")]
    UnknownFormat(String),

    /// Verification found a problem.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::UnknownFormat(other.to_string())),
        }
    }
}

/// The index and data files of one segment, opened read-only.
pub struct SegmentFiles {
    /// The `.fdx` file.
    pub index: Box<dyn StorageBackend>,
    /// The `.fdt` file.
    pub data: Box<dyn StorageBackend>,
}

/// Opens the stored-field files of `segment` under `path`.
pub fn open_segment(path: &Path, segment: &str) -> Result<SegmentFiles, Box<dyn std::error::Error>> {
    if !path.is_dir() {
        return Err(CliError::NotADirectory(path.to_path_buf()).into());
    }
    let dir = FsDirectory::open(path)?;
    let open = |extension: &str| -> Result<Box<dyn StorageBackend>, Box<dyn std::error::Error>> {
        let name = segment_file_name(segment, extension);
        if !dir.file_exists(&name) {
            return Err(CliError::MissingFile {
                dir: path.to_path_buf(),
                name,
            }
            .into());
        }
        Ok(dir.open_input(&name)?)
    };

    Ok(SegmentFiles {
        index: open(FIELDS_INDEX_EXTENSION)?,
        data: open(FIELDS_EXTENSION)?,
    })
}
