//! Core types of Notebox.
use crate::errors::ValidationError;
use crate::sanitize::{is_blank_html, to_plain_text, Sanitizer};
use crate::DataUrl;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

/// ID of notes.
///
/// Assigned once when a note is created and never reused, unlike the position
/// of a note in the list, which shifts whenever an earlier note is deleted.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Hash)]
#[serde(into = "String", from = "String")]
pub struct NoteID {
    id: String,
}

impl From<NoteID> for String {
    fn from(id: NoteID) -> String {
        id.id
    }
}

impl From<String> for NoteID {
    fn from(id: String) -> NoteID {
        NoteID::new(id)
    }
}

impl From<&str> for NoteID {
    fn from(id: &str) -> NoteID {
        NoteID::new(id.to_owned())
    }
}

impl NoteID {
    pub fn new(id: String) -> Self {
        NoteID { id }
    }

    /// Generate a new [`NoteID`].
    ///
    /// We use the UUID V4 scheme.
    pub fn generate() -> Self {
        NoteID::new(Uuid::new_v4().hyphenated().to_string())
    }
}

impl Display for NoteID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl AsRef<str> for NoteID {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// A persisted note.
///
/// The title is plain text and the body is sanitized HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredNote")]
pub struct NoteRecord {
    id: NoteID,
    title: String,
    text: String,
    image: Option<DataUrl>,
}

impl NoteRecord {
    pub fn id(&self) -> &NoteID {
        &self.id
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
}

/// The shape of a note as found in storage, including older layouts.
///
/// Records written before notes had IDs have no `id`, store the title as HTML,
/// and may lack `image` or hold `""` in it.
#[derive(Deserialize)]
struct StoredNote {
    id: Option<NoteID>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    image: Option<String>,
}

impl From<StoredNote> for NoteRecord {
    fn from(stored: StoredNote) -> NoteRecord {
        let (id, title) = match stored.id {
            Some(id) => (id, stored.title),
            None => (NoteID::generate(), to_plain_text(&stored.title)),
        };
        let image = stored
            .image
            .filter(|url| !url.is_empty())
            .and_then(|url| match DataUrl::parse(&url) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(note_id = %id, error = %e, "dropping invalid image attachment");
                    None
                }
            });
        NoteRecord {
            id,
            title,
            text: stored.text,
            image,
        }
    }
}

/// Parse a stored note list; `null` is an empty list.
///
/// The flag is set when some record predates note IDs and was given a new one,
/// so the caller must persist the list to keep that ID.
pub(crate) fn parse_note_list(raw: &str) -> Result<(Vec<NoteRecord>, bool), serde_json::Error> {
    let stored: Option<Vec<StoredNote>> = serde_json::from_str(raw)?;
    let stored = stored.unwrap_or_default();
    let upgraded = stored.iter().any(|note| note.id.is_none());
    Ok((stored.into_iter().map(NoteRecord::from).collect(), upgraded))
}

/// User input for creating or replacing a note, before sanitization.
///
/// Title and text are whatever the editor produced: HTML or plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub image: Option<DataUrl>,
}

impl NoteDraft {
    pub fn new<T: Into<String>, U: Into<String>>(title: T, text: U) -> Self {
        NoteDraft {
            title: title.into(),
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<DataUrl>) -> Self {
        self.image = image;
        self
    }

    /// Sanitize the draft and check that both title and body carry content.
    ///
    /// The title is reduced to plain text. A note with an image but a blank body
    /// is still refused.
    pub fn validate(self, sanitizer: &dyn Sanitizer) -> Result<ValidatedNote, ValidationError> {
        let title = to_plain_text(&sanitizer.sanitize(self.title.trim()));
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let text = sanitizer.sanitize(self.text.trim());
        if is_blank_html(&text) {
            return Err(ValidationError::EmptyText);
        }
        Ok(ValidatedNote {
            title: title.to_owned(),
            text: text.trim().to_owned(),
            image: self.image,
        })
    }
}

/// A draft that passed [`NoteDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNote {
    title: String,
    text: String,
    image: Option<DataUrl>,
}

impl ValidatedNote {
    pub fn into_record(self, id: NoteID) -> NoteRecord {
        NoteRecord {
            id,
            title: self.title,
            text: self.text,
            image: self.image,
        }
    }
}
