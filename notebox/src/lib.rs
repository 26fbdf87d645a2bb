//! Notebox: a note-taking widget backed by a local key-value store.
#[macro_use]
extern crate tracing;

pub mod errors;
pub mod image;
pub mod kvstore;
pub mod note;
pub mod notestore;
pub mod render;
pub mod sanitize;
pub mod session;

pub use image::DataUrl;
pub use kvstore::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore};
pub use note::{NoteDraft, NoteID, NoteRecord};
pub use notestore::NoteStore;
pub use sanitize::{AmmoniaSanitizer, Sanitizer};
pub use session::{EditSession, EditTarget};
