//! Markup escaping for free-text CDR and case values
//!
//! Values are trimmed, line breaks removed, and the five XML special
//! characters replaced by named entities in a single pass over the input.

use std::fmt::Display;

/// Escape a value for embedding in KML text or CDATA sections
pub fn sanitize(value: impl Display) -> String {
    let text = value.to_string();
    let mut out = String::with_capacity(text.len());

    for c in text.trim().chars() {
        match c {
            '\r' | '\n' => {}
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_reserved_characters_in_order() {
        assert_eq!(
            sanitize(r#"a"b'c<d>e&f"#),
            "a&quot;b&apos;c&lt;d&gt;e&amp;f"
        );
    }

    #[test]
    fn test_no_raw_reserved_characters_remain() {
        let out = sanitize(r#"<>&"'"#);
        assert_eq!(out, "&lt;&gt;&amp;&quot;&apos;");
        // only the ampersands that open entities remain
        assert_eq!(out.matches('&').count(), 5);
        assert!(!out.contains('<') && !out.contains('>'));
        assert!(!out.contains('"') && !out.contains('\''));
    }

    #[test]
    fn test_existing_entity_is_escaped_once() {
        assert_eq!(sanitize("AT&amp;T"), "AT&amp;amp;T");
    }

    #[test]
    fn test_trims_and_removes_line_breaks() {
        assert_eq!(sanitize("  Main St\r\nSuite 4\n  "), "Main StSuite 4");
    }

    #[test]
    fn test_non_string_values() {
        assert_eq!(sanitize(90), "90");
        assert_eq!(sanitize(127.5), "127.5");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_eq!(sanitize("Ñandú → 東京"), "Ñandú → 東京");
    }
}
