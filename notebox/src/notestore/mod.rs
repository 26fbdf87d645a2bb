//! The note list and its persistence.
use crate::errors::{NoteStoreError, StorageError};
use crate::kvstore::BoxedKeyValueStore;
use crate::note::{parse_note_list, NoteDraft, NoteID, NoteRecord};
use crate::sanitize::{AmmoniaSanitizer, Sanitizer};
use std::sync::{Mutex, MutexGuard};

pub mod util;

/// Key the note list is stored under unless told otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "notes";

/// Sole mediator between the note list and a key-value backend.
///
/// The whole list is stored as one JSON array under a single key. Every mutation
/// reads the list, changes it and writes it back before returning, so callers can
/// re-render from [`NoteStore::load`] right after. Mutations made through one
/// [`NoteStore`] are serialized; two stores sharing a backend still race, and the
/// last write wins.
pub struct NoteStore {
    kv: BoxedKeyValueStore,
    key: String,
    sanitizer: Box<dyn Sanitizer>,
    write_lock: Mutex<()>,
}

impl NoteStore {
    pub fn new(kv: BoxedKeyValueStore) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key<K: Into<String>>(kv: BoxedKeyValueStore, key: K) -> Self {
        NoteStore {
            kv,
            key: key.into(),
            sanitizer: Box::new(AmmoniaSanitizer::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Box<dyn Sanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn sanitizer(&self) -> &dyn Sanitizer {
        self.sanitizer.as_ref()
    }

    /// Read the note list, treating anything unreadable as "no notes".
    ///
    /// Storage and parse failures are logged, never returned.
    pub fn load(&self) -> Vec<NoteRecord> {
        match self.try_load() {
            Ok(notes) => notes,
            Err(e) => {
                warn!(key = %self.key, error = %e, "cannot load notes, showing none");
                Vec::new()
            }
        }
    }

    /// Read the note list.
    ///
    /// A missing key or a stored `null` is an empty list. Records written before
    /// notes had IDs are given one and the list is written back right away, so
    /// the IDs handed out here stay valid.
    pub fn try_load(&self) -> Result<Vec<NoteRecord>, NoteStoreError> {
        let (notes, upgraded) = self.read_list()?;
        if !upgraded {
            return Ok(notes);
        }
        let _guard = self.lock()?;
        // Another caller may have upgraded the list while we waited
        let (notes, upgraded) = self.read_list()?;
        if upgraded {
            info!(key = %self.key, count = notes.len(), "assigning IDs to legacy notes");
            if let Err(e) = self.save(&notes) {
                warn!(key = %self.key, error = %e, "cannot persist legacy note IDs");
            }
        }
        Ok(notes)
    }

    fn read_list(&self) -> Result<(Vec<NoteRecord>, bool), NoteStoreError> {
        match self.kv.get(&self.key)? {
            Some(raw) => parse_note_list(&raw)
                .map_err(|e| NoteStoreError::Corrupted(self.key.clone(), e)),
            None => Ok((Vec::new(), false)),
        }
    }

    /// Replace the stored list by `notes`.
    ///
    /// A failed write is logged and returned; the stored list is then whatever it
    /// was before.
    pub fn save(&self, notes: &[NoteRecord]) -> Result<(), NoteStoreError> {
        let serialized = serde_json::to_string(notes)?;
        if let Err(e) = self.kv.set(&self.key, &serialized) {
            error!(key = %self.key, error = %e, "failed to save notes");
            return Err(e.into());
        }
        debug!(key = %self.key, count = notes.len(), "notes saved");
        Ok(())
    }

    /// Get a note by its ID.
    pub fn get(&self, id: &NoteID) -> Result<NoteRecord, NoteStoreError> {
        self.try_load()?
            .into_iter()
            .find(|note| note.id() == id)
            .ok_or_else(|| NoteStoreError::NoteNotExist(id.clone()))
    }

    /// Current position of a note in the list.
    pub fn position(&self, id: &NoteID) -> Result<usize, NoteStoreError> {
        find_position(&self.try_load()?, id)
    }

    /// Validate `draft` and append it as a new note.
    pub fn insert(&self, draft: NoteDraft) -> Result<NoteRecord, NoteStoreError> {
        let validated = draft.validate(self.sanitizer())?;
        self.mutate(|notes| {
            let note = validated.into_record(NoteID::generate());
            notes.push(note.clone());
            debug!(note_id = %note.id(), "note inserted");
            Ok(note)
        })
    }

    /// Validate `draft` and replace the note at `index` with it.
    ///
    /// The note keeps its ID. Fails with [`NoteStoreError::IndexOutOfBounds`] if the
    /// list has shrunk since `index` was obtained.
    pub fn update(&self, index: usize, draft: NoteDraft) -> Result<NoteRecord, NoteStoreError> {
        let validated = draft.validate(self.sanitizer())?;
        self.mutate(|notes| {
            check_index(notes, index)?;
            let note = validated.into_record(notes[index].id().clone());
            notes[index] = note.clone();
            Ok(note)
        })
    }

    /// Validate `draft` and replace the note with ID `id` with it.
    pub fn update_by_id(&self, id: &NoteID, draft: NoteDraft) -> Result<NoteRecord, NoteStoreError> {
        let validated = draft.validate(self.sanitizer())?;
        self.mutate(|notes| {
            let index = find_position(notes, id)?;
            let note = validated.into_record(id.clone());
            notes[index] = note.clone();
            Ok(note)
        })
    }

    /// Remove the note at `index`; later notes move down by one.
    pub fn delete(&self, index: usize) -> Result<NoteRecord, NoteStoreError> {
        self.mutate(|notes| {
            check_index(notes, index)?;
            Ok(notes.remove(index))
        })
    }

    /// Remove the note with ID `id`.
    pub fn delete_by_id(&self, id: &NoteID) -> Result<NoteRecord, NoteStoreError> {
        self.mutate(|notes| {
            let index = find_position(notes, id)?;
            Ok(notes.remove(index))
        })
    }

    /// Store an empty list, discarding whatever was stored before, readable or not.
    pub fn reset(&self) -> Result<(), NoteStoreError> {
        let _guard = self.lock()?;
        warn!(key = %self.key, "resetting note list");
        self.save(&[])
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, NoteStoreError> {
        self.write_lock.lock().map_err(|_| {
            NoteStoreError::Storage(StorageError::Unavailable(
                "note store lock poisoned".to_owned(),
            ))
        })
    }

    /// Read-modify-write cycle shared by all mutations.
    ///
    /// An unreadable list is reported instead of being overwritten, and nothing is
    /// written if `op` fails.
    fn mutate<F, R>(&self, op: F) -> Result<R, NoteStoreError>
    where
        F: FnOnce(&mut Vec<NoteRecord>) -> Result<R, NoteStoreError>,
    {
        let _guard = self.lock()?;
        let (mut notes, _) = self.read_list()?;
        let result = op(&mut notes)?;
        self.save(&notes)?;
        Ok(result)
    }
}

fn check_index(notes: &[NoteRecord], index: usize) -> Result<(), NoteStoreError> {
    if index < notes.len() {
        Ok(())
    } else {
        Err(NoteStoreError::IndexOutOfBounds {
            index,
            len: notes.len(),
        })
    }
}

fn find_position(notes: &[NoteRecord], id: &NoteID) -> Result<usize, NoteStoreError> {
    notes
        .iter()
        .position(|note| note.id() == id)
        .ok_or_else(|| NoteStoreError::NoteNotExist(id.clone()))
}
