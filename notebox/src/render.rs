//! View models and HTML for the note list and the expand view.
//!
//! Stored HTML is sanitized again here, right before it reaches a page:
//! stored content may come from an older release or from outside this crate.
use crate::sanitize::{escape_text, is_blank_html, Sanitizer};
use crate::{DataUrl, NoteID, NoteRecord};

/// Title shown for notes whose title is blank.
pub const UNTITLED: &str = "Note";

/// One note of the list, as rendered.
///
/// `index` is the note's position when the list was rendered; actions address
/// the note by `id`, which stays valid after other notes are deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: NoteID,
    pub index: usize,
    /// Plain text.
    pub title: String,
    /// Sanitized HTML.
    pub body_html: String,
    pub image: Option<DataUrl>,
}

/// Stored titles are plain text; they are escaped, never parsed, when rendered.
fn display_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        UNTITLED.to_owned()
    } else {
        title.to_owned()
    }
}

fn display_body(text: &str, sanitizer: &dyn Sanitizer) -> String {
    let body = sanitizer.sanitize(text);
    if is_blank_html(&body) {
        String::new()
    } else {
        body
    }
}

fn image_html(image: Option<&DataUrl>, class: &str) -> String {
    // DataUrl only holds a known MIME type and Base64, nothing to escape
    image.map_or_else(String::new, |url| {
        format!(r#"<img src="{}" alt="Note image" class="{}">"#, url, class)
    })
}

impl NoteCard {
    pub fn new(index: usize, note: &NoteRecord, sanitizer: &dyn Sanitizer) -> Self {
        NoteCard {
            id: note.id().clone(),
            index,
            title: display_title(note.title()),
            body_html: display_body(note.text(), sanitizer),
            image: note.image().cloned(),
        }
    }

    pub fn to_html(&self) -> String {
        let id = escape_text(self.id.as_ref());
        format!(
            r#"<div class="note" data-index="{index}">
  <div class="note-header">{title}</div>
  {image}
  <div class="text">{body}</div>
  <div class="note-actions">
    <a class="expand-btn" href="/note/{id}" aria-label="Expand note">Expand</a>
    <a class="edit-btn" href="/note/{id}/edit" aria-label="Edit note">Edit</a>
    <a class="deleteNote" href="/note/{id}/delete" aria-label="Delete note">Delete</a>
  </div>
</div>"#,
            index = self.index,
            title = escape_text(&self.title),
            image = image_html(self.image.as_ref(), "note-image"),
            body = self.body_html,
            id = id,
        )
    }
}

/// Build one card per note, in list order.
///
/// Index bindings are only valid for this rendering; re-render the whole list
/// after every mutation.
pub fn render_notes(notes: &[NoteRecord], sanitizer: &dyn Sanitizer) -> Vec<NoteCard> {
    notes
        .iter()
        .enumerate()
        .map(|(index, note)| NoteCard::new(index, note, sanitizer))
        .collect()
}

/// Read-only view of a single note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedNote {
    pub title: String,
    pub body_html: String,
    pub image: Option<DataUrl>,
}

impl ExpandedNote {
    pub fn new(note: &NoteRecord, sanitizer: &dyn Sanitizer) -> Self {
        ExpandedNote {
            title: display_title(note.title()),
            body_html: sanitizer.sanitize(note.text()),
            image: note.image().cloned(),
        }
    }

    /// A standalone page for the note; `site_title` prefixes the document title.
    pub fn to_html(&self, site_title: &str) -> String {
        let title = escape_text(&self.title);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{site} - {title}</title>
<style>
body {{ font-family: Arial, sans-serif; padding: 20px; line-height: 1.5; }}
img {{ max-width: 100%; height: auto; border: 1px solid #ccc; padding: 4px; border-radius: 4px; margin-bottom: 1em; }}
</style>
</head>
<body>
<div class="note-title">{title}</div>
<hr>
{image}
<div class="note-text">{body}</div>
</body>
</html>
"#,
            site = escape_text(site_title),
            title = title,
            image = image_html(self.image.as_ref(), "note-image-full"),
            body = self.body_html,
        )
    }
}
