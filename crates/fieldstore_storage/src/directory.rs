//! Segment directories.
//!
//! A directory names the files of a segment and creates the backends that
//! hold them. Two implementations are provided:
//!
//! ```text
//! FsDirectory   <path>/
//!               ├─ write.lock   # Advisory lock for single-writer (optional)
//!               ├─ _0.fdt       # Segment files, one backend each
//!               └─ _0.fdx
//!
//! RamDirectory  name -> shared in-memory buffer
//! ```

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::file::FileBackend;
use crate::memory::InMemoryBackend;
use fs2::FileExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the advisory lock file held by a writing [`FsDirectory`].
pub const WRITE_LOCK_FILE: &str = "write.lock";

/// A flat namespace of segment files.
///
/// Implementations must be `Send + Sync`; callers serialize writers to the
/// same file themselves.
pub trait Directory: Send + Sync {
    /// Creates a new, empty output named `name`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    fn create_output(&self, name: &str) -> StorageResult<Box<dyn StorageBackend>>;

    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if no such file exists.
    fn open_input(&self, name: &str) -> StorageResult<Box<dyn StorageBackend>>;

    /// Returns whether `name` exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Returns the size of `name` in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if no such file exists.
    fn file_length(&self, name: &str) -> StorageResult<u64>;
}

/// A directory backed by the local file system.
#[derive(Debug)]
pub struct FsDirectory {
    path: PathBuf,
    /// Lock file handle, held for the lifetime of a writing directory.
    _lock_file: Option<File>,
}

impl FsDirectory {
    /// Opens a directory, creating it if missing. No lock is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        fs::create_dir_all(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: None,
        })
    }

    /// Opens a directory for writing and takes the advisory write lock.
    ///
    /// The lock is released when the directory is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another writer holds the lock.
    pub fn open_for_write(path: &Path) -> StorageResult<Self> {
        fs::create_dir_all(path)?;

        let lock_path = path.join(WRITE_LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked { path: lock_path });
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: Some(lock_file),
        })
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn existing(&self, name: &str) -> StorageResult<PathBuf> {
        let path = self.path.join(name);
        if !path.is_file() {
            return Err(StorageError::FileNotFound {
                name: name.to_string(),
            });
        }
        Ok(path)
    }
}

impl Directory for FsDirectory {
    fn create_output(&self, name: &str) -> StorageResult<Box<dyn StorageBackend>> {
        let backend = FileBackend::create(&self.path.join(name))?;
        tracing::debug!(dir = %self.path.display(), file = name, "created output");
        Ok(Box::new(backend))
    }

    fn open_input(&self, name: &str) -> StorageResult<Box<dyn StorageBackend>> {
        let path = self.existing(name)?;
        Ok(Box::new(FileBackend::open_read_only(&path)?))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.path.join(name).is_file()
    }

    fn file_length(&self, name: &str) -> StorageResult<u64> {
        let path = self.existing(name)?;
        Ok(fs::metadata(path)?.len())
    }
}

/// A directory whose files live in memory.
///
/// Outputs share their buffer with the directory, so bytes written through a
/// backend are visible through [`RamDirectory::file_bytes`] immediately.
#[derive(Debug, Default)]
pub struct RamDirectory {
    files: RwLock<HashMap<String, Arc<RwLock<Vec<u8>>>>>,
}

impl RamDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current contents of `name`.
    #[must_use]
    pub fn file_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.files.read().get(name).map(|data| data.read().clone())
    }

    /// Returns the names of all files, sorted.
    #[must_use]
    pub fn list_all(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Directory for RamDirectory {
    fn create_output(&self, name: &str) -> StorageResult<Box<dyn StorageBackend>> {
        let data = Arc::new(RwLock::new(Vec::new()));
        self.files
            .write()
            .insert(name.to_string(), Arc::clone(&data));
        Ok(Box::new(InMemoryBackend::from_shared(data)))
    }

    fn open_input(&self, name: &str) -> StorageResult<Box<dyn StorageBackend>> {
        let files = self.files.read();
        let data = files.get(name).ok_or_else(|| StorageError::FileNotFound {
            name: name.to_string(),
        })?;
        Ok(Box::new(InMemoryBackend::from_shared(Arc::clone(data))))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.read().contains_key(name)
    }

    fn file_length(&self, name: &str) -> StorageResult<u64> {
        self.files
            .read()
            .get(name)
            .map(|data| data.read().len() as u64)
            .ok_or_else(|| StorageError::FileNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ram_output_is_visible_through_directory() {
        let dir = RamDirectory::new();
        let mut out = dir.create_output("_0.fdt").unwrap();
        out.append(b"abc").unwrap();

        assert!(dir.file_exists("_0.fdt"));
        assert_eq!(dir.file_length("_0.fdt").unwrap(), 3);
        assert_eq!(dir.file_bytes("_0.fdt").unwrap(), b"abc");
    }

    #[test]
    fn ram_create_output_replaces_file() {
        let dir = RamDirectory::new();
        dir.create_output("a").unwrap().append(b"old").unwrap();
        dir.create_output("a").unwrap();

        assert_eq!(dir.file_length("a").unwrap(), 0);
        assert_eq!(dir.list_all(), vec!["a".to_string()]);
    }

    #[test]
    fn ram_open_missing_input_fails() {
        let dir = RamDirectory::new();
        let result = dir.open_input("missing");
        assert!(matches!(result, Err(StorageError::FileNotFound { .. })));
    }

    #[test]
    fn fs_output_roundtrip() {
        let temp = tempdir().unwrap();
        let dir = FsDirectory::open(temp.path()).unwrap();

        let mut out = dir.create_output("_1.fdx").unwrap();
        out.append(&[1, 2, 3, 4]).unwrap();
        out.close().unwrap();

        assert!(dir.file_exists("_1.fdx"));
        assert_eq!(dir.file_length("_1.fdx").unwrap(), 4);

        let input = dir.open_input("_1.fdx").unwrap();
        assert_eq!(input.read_at(0, 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn fs_open_input_is_read_only() {
        let temp = tempdir().unwrap();
        let dir = FsDirectory::open(temp.path()).unwrap();

        let mut out = dir.create_output("_2.fdt").unwrap();
        out.append(&[7, 8]).unwrap();
        out.close().unwrap();

        let mut input = dir.open_input("_2.fdt").unwrap();
        assert_eq!(input.read_at(0, 2).unwrap(), vec![7, 8]);
        assert!(matches!(
            input.append(&[9]),
            Err(StorageError::ReadOnly { .. })
        ));
        input.close().unwrap();
        assert_eq!(dir.file_length("_2.fdt").unwrap(), 2);
    }

    #[test]
    fn fs_write_lock_prevents_second_writer() {
        let temp = tempdir().unwrap();
        let _first = FsDirectory::open_for_write(temp.path()).unwrap();

        let second = FsDirectory::open_for_write(temp.path());
        assert!(matches!(second, Err(StorageError::Locked { .. })));
    }

    #[test]
    fn fs_write_lock_released_on_drop() {
        let temp = tempdir().unwrap();
        {
            let _dir = FsDirectory::open_for_write(temp.path()).unwrap();
        }
        assert!(FsDirectory::open_for_write(temp.path()).is_ok());
    }
}
