//! Prayer text rendering
//!
//! Texts are Markdown with single newlines meaning line breaks. Raw HTML in
//! the source is shown as text, never passed through.

use pulldown_cmark::{html, Event, Options, Parser};

pub fn render_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// First `max` characters as Markdown, with `...` when cut
pub fn render_excerpt(text: &str, max: usize) -> String {
    render_markdown(&hw_common::prayer::preview_text(text, max))
}

/// Escape text for element content
pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape text for a double-quoted attribute value
pub fn attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_newlines_become_breaks() {
        let html = render_markdown("O God!\nGuide me.");
        assert_eq!(html, "<p>O God!<br />\nGuide me.</p>\n");
    }

    #[test]
    fn test_emphasis_and_headers() {
        let html = render_markdown("## Healing\n\n**Thy name** is my *healing*");
        assert!(html.contains("<h2>Healing</h2>"));
        assert!(html.contains("<strong>Thy name</strong>"));
        assert!(html.contains("<em>healing</em>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("Hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(render_markdown(""), "");
    }

    #[test]
    fn test_escape_helpers() {
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(attr("say \"hi\""), "say &quot;hi&quot;");
    }
}
