//! JSON list files shared by the registration and comment stores.
//!
//! The whole list is read and rewritten on each insert. Writes go to a
//! sibling temp file first and are renamed into place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

/// A JSON array on disk with a process-local write lock.
pub struct JsonListFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Held across a read-modify-write cycle.
    pub fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    /// A missing or blank file reads as an empty list.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
            path: self.display(),
            source,
        })
    }

    pub fn write<T: Serialize>(&self, all: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(all).map_err(|source| StoreError::Corrupt {
            path: self.display(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.display(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_and_blank_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let file = JsonListFile::new(dir.path().join("none.json"));
        assert!(file.read::<u32>().unwrap().is_empty());

        let blank = dir.path().join("blank.json");
        fs::write(&blank, "  \n").unwrap();
        assert!(JsonListFile::new(blank).read::<u32>().unwrap().is_empty());
    }

    #[test]
    fn test_write_creates_parent_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("list.json");
        let file = JsonListFile::new(&path);
        file.write(&[1u32, 2, 3]).unwrap();
        assert_eq!(file.read::<u32>().unwrap(), vec![1, 2, 3]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonListFile::new(path).read::<u32>(),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
