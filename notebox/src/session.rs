//! In-progress edits of a note.
use crate::errors::NoteStoreError;
use crate::{DataUrl, NoteDraft, NoteID, NoteRecord, NoteStore};

/// What committing an [`EditSession`] does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// Append a new note.
    New,
    /// Replace the note with this ID.
    Existing(NoteID),
}

/// The state of one add or edit form: which note it targets, the text being
/// edited and the image pending attachment.
///
/// Owned by the presentation layer and passed explicitly to wherever it is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    target: EditTarget,
    title: String,
    text: String,
    image: Option<DataUrl>,
}

impl EditSession {
    /// An empty session for writing a new note.
    pub fn compose() -> Self {
        EditSession {
            target: EditTarget::New,
            title: String::new(),
            text: String::new(),
            image: None,
        }
    }

    /// A session pre-filled with a stored note, image included.
    pub fn open(store: &NoteStore, id: &NoteID) -> Result<Self, NoteStoreError> {
        let note = store.get(id)?;
        Ok(EditSession {
            target: EditTarget::Existing(note.id().clone()),
            title: note.title().to_owned(),
            text: note.text().to_owned(),
            image: note.image().cloned(),
        })
    }

    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text<T: Into<String>>(mut self, text: T) -> Self {
        self.text = text.into();
        self
    }

    /// Replace the pending image.
    pub fn attach_image(mut self, image: DataUrl) -> Self {
        self.image = Some(image);
        self
    }

    pub fn clear_image(mut self) -> Self {
        self.image = None;
        self
    }

    pub fn target(&self) -> &EditTarget {
        &self.target
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&DataUrl> {
        self.image.as_ref()
    }

    pub fn draft(&self) -> NoteDraft {
        NoteDraft::new(self.title.clone(), self.text.clone()).with_image(self.image.clone())
    }

    /// Insert or update the note. The session is left as is, so a draft that
    /// failed validation can be shown again.
    pub fn commit(&self, store: &NoteStore) -> Result<NoteRecord, NoteStoreError> {
        match &self.target {
            EditTarget::New => store.insert(self.draft()),
            EditTarget::Existing(id) => store.update_by_id(id, self.draft()),
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::compose()
    }
}
