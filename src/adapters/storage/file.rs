//! File-backed key-value store
//!
//! Each key maps to `<data_dir>/<key>.json`. The directory is created on
//! first write. Missing and empty files read as absent.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ports::storage::{KeyValueStore, StoreError};

#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    data_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9._-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.data_dir.join(format!("{}.json", file))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| StoreError::Read {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::Directory(format!("{}: {}", self.data_dir.display(), e)))?;

        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Stored '{}' at {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            tracing::debug!("Removed '{}'", key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("theme", "dark").unwrap();

        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));
        assert!(dir.path().join("theme.json").exists());
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("never-created"));

        assert!(store.get("dex-screener-storage").unwrap().is_none());
    }

    #[test]
    fn test_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileKeyValueStore::new(&nested);

        store.set("k", "{}").unwrap();

        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn test_empty_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        fs::write(dir.path().join("theme.json"), "  \n").unwrap();

        assert!(store.get("theme").unwrap().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        store.set("theme", "light").unwrap();
        store.remove("theme").unwrap();
        store.remove("theme").unwrap();

        assert!(store.get("theme").unwrap().is_none());
    }

    #[test]
    fn test_key_sanitized() {
        let store = FileKeyValueStore::new("/data");
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/data/.._etc_passwd.json"));
        assert_eq!(store.path_for("dex-screener-storage"), PathBuf::from("/data/dex-screener-storage.json"));
    }
}
