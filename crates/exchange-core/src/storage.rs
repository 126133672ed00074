// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - Flat file persistence
//
// Every store is a single JSON document that is read once when the store is
// opened and rewritten in full after each change.

use crate::types::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document. A missing or blank file yields `None`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, AppError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::FileIo(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content).map(Some).map_err(|e| {
            AppError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Load the document, materializing `init` on disk when it does not exist yet
    pub fn load_or_init<T, F>(&self, init: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.load()? {
            tracing::info!("Loaded {}", self.path.display());
            return Ok(value);
        }

        tracing::info!("No data at {}, creating defaults", self.path.display());
        let value = init();
        self.save(&value)?;
        Ok(value)
    }

    /// Serialize and overwrite the whole document
    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::FileIo(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(value).map_err(|e| {
            AppError::Serialization(format!("Failed to serialize {}: {}", self.path.display(), e))
        })?;

        fs::write(&self.path, content).map_err(|e| {
            AppError::FileIo(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

// A panic while holding a guard leaves plain data behind, so poisoning is ignored.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("absent.json"));
        let loaded: Option<Vec<String>> = file.load().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_blank_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        fs::write(&path, "  \n").unwrap();
        let loaded: Option<Vec<String>> = JsonFile::new(path).load().unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("nested").join("data.json"));
        let value: Vec<u32> = file.load_or_init(|| vec![1, 2, 3]).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
        assert!(file.path().exists());

        let again: Vec<u32> = file.load_or_init(Vec::new).unwrap();
        assert_eq!(again, vec![1, 2, 3]);
    }

    #[test]
    fn test_save_then_load_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonFile::new(dir.path().join("map.json"));
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), vec!["x".to_string()]);
        map.insert("a".to_string(), Vec::new());

        file.save(&map).unwrap();
        let loaded: BTreeMap<String, Vec<String>> = file.load().unwrap().unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let result: Result<Option<Vec<String>>, _> = JsonFile::new(path).load();
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
