use thiserror::Error;

use crate::NoteID;

/// Why a note draft was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please enter a title for the note")]
    EmptyTitle,
    #[error("please enter some content for the note")]
    EmptyText,
}

/// Error type of key-value storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Writing the value would push the backend over its byte quota.
    ///
    /// The previous value under `key` is left untouched.
    #[error("quota exceeded writing `{key}`: {needed} bytes needed, capacity is {capacity}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        capacity: usize,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("io error")]
    IOError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("not a base64 data URL")]
    NotADataURL,
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("data URL declares `{declared}` but contains `{detected}`")]
    MimeMismatch {
        declared: String,
        detected: &'static str,
    },
    #[error("invalid base64 payload")]
    Base64(#[from] base64::DecodeError),
    #[error("image is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("io error")]
    IOError(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum NoteStoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("index {index} is out of bounds for {len} notes")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("note `{0}` doesn't exist")]
    NoteNotExist(NoteID),
    #[error("notes stored under `{0}` cannot be parsed")]
    Corrupted(String, #[source] serde_json::Error),
    #[error("storage error")]
    Storage(#[from] StorageError),
    #[error("serde error")]
    SerdeError(#[from] serde_json::Error),
}
