//! # fieldstore storage
//!
//! Storage backends and segment directories for fieldstore.
//!
//! This crate provides the lowest-level storage abstraction. Backends are
//! **opaque, append-only byte stores**: they know nothing about stored-field
//! records, offset indexes, or segments.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (append, read, flush, close)
//! - The current size of a backend is the position of the next append
//! - A [`Directory`] names and creates the files of a segment
//! - fieldstore owns all file format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and RAM directories
//! - [`FileBackend`] - For persistent storage using OS file APIs
//!
//! ## Example
//!
//! ```rust
//! use fieldstore_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod directory;
mod error;
mod file;
mod memory;
mod reader;

pub use backend::StorageBackend;
pub use directory::{Directory, FsDirectory, RamDirectory, WRITE_LOCK_FILE};
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use reader::BackendReader;
