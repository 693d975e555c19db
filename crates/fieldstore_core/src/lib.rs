//! # fieldstore core
//!
//! The stored-field store of a full-text index segment.
//!
//! Stored fields are the original, non-inverted values of each document,
//! kept so they can be returned verbatim. This crate provides:
//! - The document and field model ([`Document`], [`Field`], [`FieldFlags`])
//! - The field-number registry ([`FieldRegistry`])
//! - The field record encoder ([`FieldEncoder`], [`StoredFieldsBuffer`])
//! - The segment writer ([`StoredFieldsWriter`]) with its per-document,
//!   pre-encoded, and raw-copy (merge) paths
//!
//! The on-disk layout is documented in [`format`]; [`verify`] decodes it
//! back for integrity checks.
//!
//! ## Example
//!
//! ```rust
//! use fieldstore_core::{Document, Field, FieldFlags, FieldRegistry, StoredFieldsConfig, StoredFieldsWriter};
//! use fieldstore_storage::{Directory, RamDirectory};
//! use std::sync::Arc;
//!
//! let dir = RamDirectory::new();
//! let registry = Arc::new(FieldRegistry::new());
//! let mut doc = Document::new()
//!     .with_field(Field::text("title", "hello", FieldFlags::STORED | FieldFlags::INDEXED));
//! registry.add_document(&doc);
//!
//! let mut writer = StoredFieldsWriter::create(&dir, "_0", registry, StoredFieldsConfig::default()).unwrap();
//! writer.add_document(&mut doc).unwrap();
//! writer.close().unwrap();
//!
//! assert_eq!(dir.file_length("_0.fdx").unwrap(), 8);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod encoder;
mod error;
mod field;
pub mod format;
mod registry;
pub mod verify;
mod writer;

pub use config::StoredFieldsConfig;
pub use encoder::{FieldEncoder, StoredFieldsBuffer};
pub use error::{CoreError, CoreResult};
pub use field::{ByteStream, CharStream, Document, Field, FieldFlags, FieldValue};
pub use registry::{FieldInfo, FieldNumber, FieldRegistry};
pub use writer::StoredFieldsWriter;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
