//! Key-value storage backends
//!
//! The cart persists as one JSON string under a fixed key. Backends:
//! - `LocalStorage` (wasm32): browser LocalStorage
//! - `FileStorage` (native): one file per key inside a directory
//! - `MemoryStorage`: shared in-memory map, handy in tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Storage access failure. The cart swallows read failures (starts empty)
/// and the persistence worker logs write failures; these types live at the
/// storage seam, not on the consumer surface.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The host storage primitive is missing or rejected the access
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Filesystem failure on a native backend
    #[error("storage I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// The key-value slot the cart persists into
pub trait StorageBackend {
    /// Read the value under `key`; `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Overwrite the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Boxed backend as held by the store. On native the backend crosses into
/// the persistence worker thread and must be `Send`.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxedBackend = Box<dyn StorageBackend + Send>;
#[cfg(target_arch = "wasm32")]
pub type BoxedBackend = Box<dyn StorageBackend>;

/// Shared in-memory backend
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .map
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-per-key backend for native builds
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    /// Store values under `dir`, created lazily on first write
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// Browser LocalStorage backend (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StorageError::Unavailable("LocalStorage not available".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable("LocalStorage read rejected".into()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Unavailable("LocalStorage write rejected".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_set() {
        let storage = MemoryStorage::new();
        assert!(storage.get("products").unwrap().is_none());

        storage.set("products", "[]").unwrap();
        assert_eq!(storage.get("products").unwrap().as_deref(), Some("[]"));

        // Overwrite wins
        storage.set("products", "[1]").unwrap();
        assert_eq!(storage.get("products").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_clones_share_state() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(storage.get("products").unwrap().is_none());
        storage.set("products", r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            storage.get("products").unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[test]
    fn test_file_missing_dir_reads_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("never-created"));
        assert!(storage.get("products").unwrap().is_none());
    }
}
