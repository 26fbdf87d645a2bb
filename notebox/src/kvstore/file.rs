//! On-disk storage of key-value pairs
use super::{check_quota, KeyValueStore};
use crate::errors::StorageError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use uuid::Uuid;

const ENTRY_EXTENSION: &str = "entry";

/// Stores every key in its own file under a data directory.
///
/// Writes go through a temporary file and a rename, so a failed write never
/// leaves a half-written value behind.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    quota: Option<usize>,
    lock: RwLock<()>,
}

impl FileKeyValueStore {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P, quota: Option<usize>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FileKeyValueStore {
            dir,
            quota,
            lock: RwLock::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", encode_key(key), ENTRY_EXTENSION))
    }

    /// Total size of all stored values.
    fn used_bytes(&self) -> Result<usize, StorageError> {
        let mut used = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == ENTRY_EXTENSION) {
                used += fs::metadata(&path)?.len() as usize;
            }
        }
        Ok(used)
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("file store lock poisoned".to_owned())
}

/// Map a key to a file name: ASCII alphanumerics, `-` and `_` are kept, every
/// other byte becomes `%XX`.
fn encode_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            name.push(b as char);
        } else {
            name.push_str(&format!("%{:02X}", b));
        }
    }
    name
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.read().map_err(poisoned)?;
        match fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IOError(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.write().map_err(poisoned)?;
        let path = self.entry_path(key);
        if self.quota.is_some() {
            let old_len = match fs::metadata(&path) {
                Ok(meta) => meta.len() as usize,
                Err(e) if e.kind() == ErrorKind::NotFound => 0,
                Err(e) => return Err(StorageError::IOError(e)),
            };
            check_quota(key, self.used_bytes()?, old_len, value.len(), self.quota)?;
        }
        // One temporary file per write
        let tmp_path = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        if let Err(e) = write_file(&tmp_path, value).and_then(|_| fs::rename(&tmp_path, &path)) {
            match fs::remove_file(&tmp_path) {
                Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => {
                    warn!(path = %tmp_path.display(), error = %cleanup, "cannot remove temporary file");
                }
                _ => {}
            }
            return Err(StorageError::IOError(e));
        }
        Ok(())
    }
}

fn write_file(path: &Path, value: &str) -> std::io::Result<()> {
    let mut f = fs::File::create(path)?;
    f.write_all(value.as_bytes())?;
    f.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvstore::tests as common_tests;
    use std::env;
    use std::sync::Arc;
    use std::thread;

    fn temp_store(quota: Option<usize>) -> FileKeyValueStore {
        let dir = env::temp_dir().join(format!("notebox-kv-{}", Uuid::new_v4()));
        FileKeyValueStore::new(dir, quota).unwrap()
    }

    #[test]
    fn get_missing_key() {
        common_tests::get_missing_key(temp_store(None));
    }

    #[test]
    fn set_then_get() {
        common_tests::set_then_get(temp_store(None));
    }

    #[test]
    fn overwrite() {
        common_tests::overwrite(temp_store(None));
    }

    #[test]
    fn independent_keys() {
        common_tests::independent_keys(temp_store(None));
    }

    #[test]
    fn quota_exceeded() {
        common_tests::quota_exceeded(temp_store(Some(16)));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        common_tests::quota_counts_replaced_value_once(temp_store(Some(16)));
    }

    #[test]
    fn persists_across_reopen() {
        let store = temp_store(None);
        store.set("notes", "[]").unwrap();
        let reopened = FileKeyValueStore::new(store.dir(), None).unwrap();
        assert_eq!(reopened.get("notes").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn concurrent_writers_share_a_directory() {
        let first = Arc::new(temp_store(None));
        let second = Arc::new(FileKeyValueStore::new(first.dir(), None).unwrap());
        let a = "a".repeat(64 * 1024);
        let b = "b".repeat(64 * 1024);
        for _ in 0..20 {
            thread::scope(|s| {
                let one = s.spawn(|| first.set("notes", &a));
                let other = s.spawn(|| second.set("notes", &b));
                one.join().unwrap().unwrap();
                other.join().unwrap().unwrap();
            });
            let stored = first.get("notes").unwrap().unwrap();
            assert!(stored == a || stored == b);
        }
        let leftovers = fs::read_dir(first.dir())
            .unwrap()
            .filter(|entry| {
                let name = entry.as_ref().unwrap().file_name();
                name.to_string_lossy().ends_with(".tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn key_encoding() {
        assert_eq!(encode_key("notes"), "notes");
        assert_eq!(encode_key("notes/archive"), "notes%2Farchive");
        assert_eq!(encode_key("../x"), "%2E%2E%2Fx");
    }
}
