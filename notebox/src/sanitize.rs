//! HTML sanitization, the safety boundary between user markup and the page.
use std::collections::HashSet;

/// What the rich-text editor emits when it holds no user content.
pub const EMPTY_EDITOR_SENTINEL: &str = "<p><br></p>";

/// Inline styles the editor uses for fonts, sizes and colours.
const EDITOR_STYLE_PROPERTIES: [&str; 4] = ["color", "background-color", "font-family", "font-size"];

/// Turns untrusted HTML into HTML that is safe to inject into a page.
///
/// Implementations must be pure and must neutralize script execution vectors
/// (script tags, event handler attributes, `javascript:` URLs).
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}

/// [`Sanitizer`] built on `ammonia`, configured for the markup the editor produces.
pub struct AmmoniaSanitizer {
    builder: ammonia::Builder<'static>,
}

impl AmmoniaSanitizer {
    pub fn new() -> Self {
        let mut builder = ammonia::Builder::default();
        builder
            .add_generic_attributes(&["class", "style"])
            .add_tag_attributes("li", &["data-list"])
            .filter_style_properties(EDITOR_STYLE_PROPERTIES.iter().copied().collect());
        AmmoniaSanitizer { builder }
    }
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

/// Strip all markup from `html`, keeping only its text.
///
/// The content of `script` and `style` elements is dropped entirely.
pub fn to_plain_text(html: &str) -> String {
    let stripped = ammonia::Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(html)
        .to_string();
    // The serializer only escapes these in text nodes
    stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Escape plain text so it can be placed in element content or a quoted attribute.
pub fn escape_text(text: &str) -> String {
    ammonia::clean_text(text)
}

/// Whether a piece of editor output carries no user content.
///
/// Covers the exact sentinel as well as markup without any visible text.
pub fn is_blank_html(html: &str) -> bool {
    let trimmed = html.trim();
    trimmed.is_empty()
        || trimmed == EMPTY_EDITOR_SENTINEL
        || to_plain_text(trimmed).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_handlers() {
        let sanitizer = AmmoniaSanitizer::new();
        let clean = sanitizer.sanitize(
            r#"<p onclick="steal()">Hi<script>alert(1)</script><a href="javascript:alert(1)">x</a></p>"#,
        );
        assert!(!clean.contains("script"));
        assert!(!clean.contains("onclick"));
        assert!(!clean.contains("javascript:"));
        assert!(clean.contains("Hi"));
    }

    #[test]
    fn keeps_editor_formatting() {
        let sanitizer = AmmoniaSanitizer::new();
        let html = r#"<p><strong>bold</strong> <em class="ql-font-arial">it</em></p><ol><li data-list="bullet">one</li></ol>"#;
        assert_eq!(sanitizer.sanitize(html), html);
    }

    #[test]
    fn filters_style_properties() {
        let sanitizer = AmmoniaSanitizer::new();
        let clean = sanitizer
            .sanitize(r#"<span style="color: red; background-image: url(http://evil)">x</span>"#);
        assert!(clean.contains("color"));
        assert!(!clean.contains("background-image"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let sanitizer = AmmoniaSanitizer::new();
        let inputs = [
            "World",
            "<p>Hello <b>there</b></p>",
            r#"<a href="https://example.com">link</a>"#,
            r#"<img src="x" onerror="alert(1)"><p>a &amp; b &lt; c</p>"#,
            "<div><p>unclosed",
        ];
        for input in inputs {
            let once = sanitizer.sanitize(input);
            assert_eq!(sanitizer.sanitize(&once), once, "input: {}", input);
        }
    }

    #[test]
    fn plain_text_of_markup() {
        assert_eq!(to_plain_text("<p><b>Hello</b> world</p>"), "Hello world");
        assert_eq!(to_plain_text("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(to_plain_text("<p>x<script>alert(1)</script></p>"), "x");
        assert_eq!(to_plain_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank_html(""));
        assert!(is_blank_html("  <p><br></p>  "));
        assert!(is_blank_html("<p> </p><p><br></p>"));
        assert!(is_blank_html("<p>&nbsp;</p>"));
        assert!(!is_blank_html("<p>x</p>"));
        assert!(!is_blank_html("World"));
    }
}
