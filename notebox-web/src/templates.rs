//! Full pages around the note cards.
use notebox::render::NoteCard;
use notebox::sanitize::{escape_text, to_plain_text};
use notebox::{EditSession, EditTarget};

pub const SITE_TITLE: &str = "Notes";

// Fills the hidden `image` field with the chosen file as a data URL
const IMAGE_PICKER_SCRIPT: &str = r#"<script>
for (const input of document.querySelectorAll('input[type=file][data-target]')) {
    input.addEventListener('change', () => {
        const file = input.files[0];
        if (!file) return;
        const reader = new FileReader();
        reader.onload = () => { document.getElementById(input.dataset.target).value = reader.result; };
        reader.onerror = () => alert('Error uploading image.');
        reader.readAsDataURL(file);
    });
}
</script>"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
{script}
</body>
</html>
"#,
        title = escape_text(title),
        body = body,
        script = IMAGE_PICKER_SCRIPT,
    )
}

fn notice_html(notice: Option<&str>) -> String {
    notice.map_or_else(String::new, |n| {
        format!(r#"<div class="notice" role="alert">{}</div>"#, escape_text(n))
    })
}

/// What the body textarea starts with.
///
/// Bodies without markup are shown as the text that was typed, entities
/// decoded; anything else is edited as HTML.
fn editable_text(text: &str) -> String {
    if text.contains('<') {
        text.to_owned()
    } else {
        to_plain_text(text)
    }
}

/// The title, body and image fields of an add or edit form.
fn note_fields(session: &EditSession) -> String {
    let image = session.image().map_or("", |url| url.as_str());
    let preview = if image.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img class="preview-image" src="{}" alt="Note image">
<label><input type="checkbox" name="removeimage" value="on"> Remove image</label>"#,
            image
        )
    };
    format!(
        r#"<input name="title" placeholder="Note Title" value="{title}">
<textarea name="text" placeholder="Write your note here... (HTML allowed)">{text}</textarea>
{preview}
<input type="hidden" name="image" id="image-data" value="{image}">
<input type="file" id="image-input" accept="image/*" data-target="image-data">"#,
        title = escape_text(session.title()),
        text = escape_text(&editable_text(session.text())),
        preview = preview,
        image = image,
    )
}

/// The note list with the add-note form above it.
pub fn notes_page(cards: &[NoteCard], compose: &EditSession, notice: Option<&str>) -> String {
    let cards_html: Vec<String> = cards.iter().map(NoteCard::to_html).collect();
    let body = format!(
        r#"<h1>{site}</h1>
{notice}
<form class="add-note" method="post" action="/note">
{fields}
<button id="addNote" type="submit">Add Note</button>
</form>
<div id="notes">
{cards}
</div>"#,
        site = escape_text(SITE_TITLE),
        notice = notice_html(notice),
        fields = note_fields(compose),
        cards = cards_html.join("\n"),
    );
    layout(SITE_TITLE, &body)
}

/// The edit form of an existing note.
pub fn edit_page(session: &EditSession, notice: Option<&str>) -> String {
    let action = match session.target() {
        EditTarget::Existing(id) => format!("/note/{}/edit", escape_text(id.as_ref())),
        EditTarget::New => "/note".to_owned(),
    };
    let body = format!(
        r#"<div id="edit-popup">
{notice}
<form method="post" action="{action}">
{fields}
<button id="save-edit-btn" type="submit">Save</button>
<a id="cancel-edit-btn" href="/">Cancel</a>
</form>
</div>"#,
        notice = notice_html(notice),
        action = action,
        fields = note_fields(session),
    );
    layout(&format!("{} - Edit", SITE_TITLE), &body)
}

/// Asks before deleting a note.
pub fn delete_page(card: &NoteCard) -> String {
    let body = format!(
        r#"<p>Are you sure you want to delete this note?</p>
<div class="note-header">{title}</div>
<form method="post" action="/note/{id}/delete">
<button class="deleteNote" type="submit">Delete</button>
<a href="/">Cancel</a>
</form>"#,
        title = escape_text(&card.title),
        id = escape_text(card.id.as_ref()),
    );
    layout(&format!("{} - Delete", SITE_TITLE), &body)
}
