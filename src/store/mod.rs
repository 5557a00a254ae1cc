//! Key-value persistence for the planner's collections.
//!
//! Backends only move strings around. [`Storage`] layers JSON encoding and
//! the key prefix on top, and turns every backend failure into "no data" so
//! a broken or full store never takes the session down with it.

pub mod file;
pub mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const USERS_KEY: &str = "users";
pub const TASKS_KEY: &str = "tasks";
pub const EVENTS_KEY: &str = "events";
pub const CHAT_HISTORY_KEY: &str = "chat_history";
pub const CURRENT_USER_KEY: &str = "current_user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error("corrupt entry '{key}': {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[error("storage quota exceeded writing '{key}' ({needed} bytes, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
}

/// A string-to-string blob store, the shape of a browser's local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub struct Storage {
    backend: Box<dyn KeyValueStore>,
    prefix: String,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static, prefix: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Read and decode an entry. Missing, unreadable and corrupt entries all
    /// come back as `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let key = self.full_key(key);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Failed to read {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                log::warn!("{}", StorageError::Decode { key, source });
                None
            }
        }
    }

    /// Encode and write an entry. Returns false (after logging) on failure.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let key = self.full_key(key);
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(source) => {
                log::error!("{}", StorageError::Encode { key, source });
                return false;
            }
        };
        match self.backend.set(&key, &json) {
            Ok(()) => {
                log::debug!("Persisted {} ({} bytes)", key, json.len());
                true
            }
            Err(e) => {
                log::error!("Failed to save {}: {}", key, e);
                false
            }
        }
    }

    pub fn remove(&self, key: &str) {
        let key = self.full_key(key);
        if let Err(e) = self.backend.remove(&key) {
            log::error!("Failed to remove {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn round_trips_through_prefixed_key() {
        let mem = MemoryStore::new();
        let storage = Storage::new(mem.clone(), "strms_");
        let mut map = BTreeMap::new();
        map.insert(7u64, vec!["a".to_string()]);

        assert!(storage.save(TASKS_KEY, &map));
        assert!(mem.get("strms_tasks").unwrap().is_some());
        assert_eq!(storage.load::<BTreeMap<u64, Vec<String>>>(TASKS_KEY), Some(map));
    }

    #[test]
    fn corrupt_entry_loads_as_none() {
        let mem = MemoryStore::new();
        mem.set("strms_users", "{not json").unwrap();
        let storage = Storage::new(mem, "strms_");
        assert!(storage.load::<BTreeMap<String, String>>(USERS_KEY).is_none());
    }

    #[test]
    fn missing_entry_loads_as_none() {
        let storage = Storage::new(MemoryStore::new(), "");
        assert!(storage.load::<Vec<u32>>(EVENTS_KEY).is_none());
    }

    #[test]
    fn quota_failure_is_swallowed() {
        let storage = Storage::new(MemoryStore::with_quota(8), "");
        assert!(!storage.save(CHAT_HISTORY_KEY, &"a string that is far too long"));
        assert!(storage.load::<String>(CHAT_HISTORY_KEY).is_none());
    }

    #[test]
    fn remove_clears_entry() {
        let storage = Storage::new(MemoryStore::new(), "p_");
        assert!(storage.save(CURRENT_USER_KEY, &1u32));
        storage.remove(CURRENT_USER_KEY);
        assert!(storage.load::<u32>(CURRENT_USER_KEY).is_none());
    }
}
