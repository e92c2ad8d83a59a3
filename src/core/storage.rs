// src/core/storage.rs
//! Durable key-value storage shared by the session and locale stores

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::app_log;
use crate::core::FsOps;

/// String key-value persistence, the local-storage equivalent.
///
/// Every method may fail; callers in the stores log the error and keep
/// working from memory.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub type SharedStorage = Arc<dyn KeyValueStore>;

// ===== In-memory backend =====

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStorage {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

// ===== JSON file backend =====

/// A single JSON object on disk; the whole map is rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file. A corrupt file is logged and
    /// replaced by an empty map on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
            match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    app_log!(
                        warn,
                        "Storage file {} is not valid JSON, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        app_log!(info, "Storage opened: {}", path.display());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content =
            serde_json::to_string_pretty(entries).context("Failed to serialize storage")?;
        FsOps::write_file_sync(&self.path, &content)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("File storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("File storage lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("File storage lock poisoned"))?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

// ===== Unavailable backend =====

/// Storage that refuses every call, e.g. private browsing or a read-only disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl KeyValueStore for UnavailableStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        anyhow::bail!("Storage unavailable, cannot read '{}'", key)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        anyhow::bail!("Storage unavailable, cannot write '{}'", key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        anyhow::bail!("Storage unavailable, cannot remove '{}'", key)
    }
}

/// Open the file backend, degrading to memory when the file cannot be used.
pub fn open_or_memory(path: &Path) -> SharedStorage {
    match FileStorage::open(path) {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            app_log!(
                warn,
                "Durable storage unavailable ({}), continuing in memory only",
                e
            );
            MemoryStorage::shared()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("language").unwrap(), None);

        storage.set("language", "en").unwrap();
        assert_eq!(storage.get("language").unwrap().as_deref(), Some("en"));

        storage.remove("language").unwrap();
        assert_eq!(storage.get("language").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set("isAuthenticated", "true").unwrap();
            storage.set("language", "zh").unwrap();
            storage.remove("language").unwrap();
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("isAuthenticated").unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(reopened.get("language").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("user").unwrap(), None);

        storage.set("user", "{}").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("user").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_unavailable_storage_errors() {
        let storage = UnavailableStorage;
        assert!(storage.get("user").is_err());
        assert!(storage.set("user", "x").is_err());
        assert!(storage.remove("user").is_err());
    }

    #[test]
    fn test_open_or_memory_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a storage file.
        let storage = open_or_memory(dir.path());
        storage.set("language", "en").unwrap();
        assert_eq!(storage.get("language").unwrap().as_deref(), Some("en"));
    }
}
