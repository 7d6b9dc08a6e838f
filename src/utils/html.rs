//! HTML utility functions.
//!
//! Provides the small amount of markup handling the host document needs
//! when it has to rebuild an element from scratch:
//! - `escape_attr()` - HTML entity escaping for attribute values
//! - `is_void_element()` - Self-closing elements (br, img, etc.)
//! - `is_raw_text_element()` - Raw text elements (script, style)
//! - `element_markup()` - Serialize a lone element from a name and attribute list

use std::borrow::Cow;
use std::fmt::Write;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML attribute values.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_attr("a\"b"), "a&quot;b");
/// assert_eq!(escape_attr("hello"), "hello"); // No allocation
/// ```
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(&ESCAPE_CHARS[..]) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element (self-closing).
///
/// Void elements cannot have children and have no end tag.
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag is a raw text element (content should not be HTML-escaped).
///
/// Script and style content is "raw text" in HTML.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

// =============================================================================
// Tag Serialization
// =============================================================================

/// Serialize a lone element: start tag, plus end tag for non-void elements.
///
/// Attribute values are escaped; names are written as given.
///
/// # Example
/// ```ignore
/// let html = element_markup("img", [("src", "a.png"), ("alt", "\"x\"")], "");
/// assert_eq!(html, r#"<img src="a.png" alt="&quot;x&quot;">"#);
/// ```
pub fn element_markup<'a, I>(tag: &str, attrs: I, content: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut markup = String::with_capacity(tag.len() * 2 + content.len() + 16);
    markup.push('<');
    markup.push_str(tag);
    for (name, value) in attrs {
        let _ = write!(markup, " {}=\"{}\"", name, escape_attr(value));
    }
    markup.push('>');

    if !is_void_element(tag) {
        markup.push_str(content);
        let _ = write!(markup, "</{tag}>");
    }
    markup
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr_plain() {
        assert!(matches!(escape_attr("hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_escape_attr_special_chars() {
        assert_eq!(escape_attr("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape_attr("it's"), "it&#39;s");
        assert_eq!(escape_attr("a & b"), "a &amp; b");
    }

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("img"));
        assert!(is_void_element("source"));
        assert!(is_void_element("input"));
        assert!(!is_void_element("video"));
        assert!(!is_void_element("div"));
    }

    #[test]
    fn test_raw_text_elements() {
        assert!(is_raw_text_element("style"));
        assert!(is_raw_text_element("script"));
        assert!(!is_raw_text_element("textarea"));
    }

    #[test]
    fn test_element_markup_void() {
        let html = element_markup("img", [("src", "a.png"), ("alt", "\"x\"")], "");
        assert_eq!(html, r#"<img src="a.png" alt="&quot;x&quot;">"#);
    }

    #[test]
    fn test_element_markup_with_content() {
        let html = element_markup("style", std::iter::empty(), "a { color: red }");
        assert_eq!(html, "<style>a { color: red }</style>");
    }
}
