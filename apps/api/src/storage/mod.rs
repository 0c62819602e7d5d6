//! Synchronous key/value storage capabilities used by the tracker and favorites store.
//!
//! Two lifetimes matter to callers: context-scoped storage (gone when the browsing
//! context ends, see [`MemoryStore`]) and long-lived storage (see [`FileStore`]).

mod file;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::StorageError;

pub use file::FileStore;

pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value under `key` in a single write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store. Lives exactly as long as its owner, which makes it the
/// context-scoped store for one browsing context.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    /// Total bytes (keys + values) the store accepts, mirroring browser storage quotas.
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
