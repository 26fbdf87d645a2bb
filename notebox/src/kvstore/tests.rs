use crate::errors::StorageError;
use crate::KeyValueStore;

pub(super) fn get_missing_key(store: impl KeyValueStore) {
    assert_eq!(store.get("notes").unwrap(), None);
}

pub(super) fn set_then_get(store: impl KeyValueStore) {
    store.set("notes", r#"[{"title":"a"}]"#).unwrap();
    assert_eq!(
        store.get("notes").unwrap().as_deref(),
        Some(r#"[{"title":"a"}]"#)
    );
}

pub(super) fn overwrite(store: impl KeyValueStore) {
    store.set("notes", "first").unwrap();
    store.set("notes", "second").unwrap();
    assert_eq!(store.get("notes").unwrap().as_deref(), Some("second"));
    store.set("notes", "").unwrap();
    assert_eq!(store.get("notes").unwrap().as_deref(), Some(""));
}

pub(super) fn independent_keys(store: impl KeyValueStore) {
    store.set("notes", "1").unwrap();
    store.set("notes/archive", "2").unwrap();
    assert_eq!(store.get("notes").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("notes/archive").unwrap().as_deref(), Some("2"));
}

/// `store` must have a quota of 16 bytes.
pub(super) fn quota_exceeded(store: impl KeyValueStore) {
    store.set("a", "0123456789").unwrap();
    let res = store.set("b", "0123456789");
    assert!(matches!(
        res,
        Err(StorageError::QuotaExceeded {
            needed: 20,
            capacity: 16,
            ..
        })
    ));
    assert_eq!(store.get("b").unwrap(), None);
    assert_eq!(store.get("a").unwrap().as_deref(), Some("0123456789"));
}

/// `store` must have a quota of 16 bytes.
pub(super) fn quota_counts_replaced_value_once(store: impl KeyValueStore) {
    store.set("a", "0123456789abcdef").unwrap();
    store.set("a", "fedcba9876543210").unwrap();
    assert!(store.set("a", "0123456789abcdefg").is_err());
    assert_eq!(store.get("a").unwrap().as_deref(), Some("fedcba9876543210"));
}
