//! Key-value storage backends.
//!
//! A backend maps string keys to string values, scoped to one process (in memory)
//! or one data directory (on disk). Backends may enforce a byte quota over the
//! sum of their values, the way browser local storage does.
use crate::errors::StorageError;

mod file;
mod in_memory;
#[cfg(test)]
mod tests;

pub use file::FileKeyValueStore;
pub use in_memory::InMemoryKeyValueStore;

/// An abstraction for storage backends.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, `None` if there isn't one.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Replace the value stored under `key`.
    ///
    /// On failure the previous value is left in place.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

pub type BoxedKeyValueStore = Box<dyn KeyValueStore>;

/// Check that replacing a value of `old_len` bytes by one of `new_len` bytes keeps
/// the total `used` bytes within `quota`.
pub(crate) fn check_quota(
    key: &str,
    used: usize,
    old_len: usize,
    new_len: usize,
    quota: Option<usize>,
) -> Result<(), StorageError> {
    if let Some(capacity) = quota {
        let needed = used - old_len + new_len;
        if needed > capacity {
            return Err(StorageError::QuotaExceeded {
                key: key.to_owned(),
                needed,
                capacity,
            });
        }
    }
    Ok(())
}
