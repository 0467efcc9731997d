//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate used by the snapshot extractor and
//! the JSON-LD collector: attribute access, whitespace-folded text and
//! character-bounded truncation.

// Re-export core types for external use
pub use dom_query::{Document, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Remove every element matching `selector`.
#[inline]
pub fn remove_all(doc: &Document, selector: &str) {
    doc.select(selector).remove();
}

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Attribute value with whitespace trimmed, `None` when missing or blank.
#[must_use]
pub fn non_empty_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Text content with whitespace runs folded to single spaces and trimmed.
#[must_use]
pub fn normalized_text(sel: &Selection) -> String {
    normalize_whitespace(&sel.text())
}

/// Collapse whitespace runs (including non-breaking spaces) into single spaces.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max` characters, appending `…` when anything was cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}…", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Keep at most `max` characters without an ellipsis.
#[must_use]
pub fn clip_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Whitespace-delimited word count.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Escape text for inclusion in generated HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_select() {
        let doc = parse(r#"<div id="main" class="container">content</div>"#);
        let div = doc.select("div");

        assert_eq!(get_attribute(&div, "id"), Some("main".to_string()));
        assert_eq!(non_empty_attribute(&div, "class"), Some("container".to_string()));
        assert_eq!(non_empty_attribute(&div, "title"), None);
    }

    #[test]
    fn test_remove_all() {
        let doc = parse(r#"<div><script>var a;</script><style>p{}</style><p>content</p></div>"#);
        remove_all(&doc, "script,style,noscript");

        assert!(doc.select("script").is_empty());
        assert!(doc.select("style").is_empty());
        assert_eq!(normalized_text(&doc.select("div")), "content");
    }

    #[test]
    fn test_normalize_whitespace_folds_nbsp() {
        assert_eq!(normalize_whitespace("  a\u{a0}\u{a0}b\n\tc  "), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("héllo", 10), "héllo");
        assert_eq!(truncate_chars("héllo", 2), "hé…");
        assert_eq!(clip_chars("héllo", 2), "hé");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">Q&A</a>"#), "&lt;a href=&quot;x&quot;&gt;Q&amp;A&lt;/a&gt;");
    }
}
