//! In-memory storage of key-value pairs
use super::{check_quota, KeyValueStore};
use crate::errors::StorageError;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage.
///
/// This is mostly designed for development use, because there is no persistence layer.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// A store refusing writes that would push its values past `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        InMemoryKeyValueStore {
            quota: Some(quota),
            ..Default::default()
        }
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("in-memory store lock poisoned".to_owned())
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let used = entries.values().map(String::len).sum();
        let old_len = entries.get(key).map_or(0, String::len);
        check_quota(key, used, old_len, value.len(), self.quota)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
