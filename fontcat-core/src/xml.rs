//! Escaping helpers for the persisted XML configuration formats.
//!
//! Family and collection names may contain any of the five XML
//! metacharacters; everything written to the collection, blacklist and
//! compatibility files goes through these two functions.

/// Escape the five XML metacharacters in `value`.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`escape`]. `&amp;` is handled last so escaped sequences do not
/// unescape twice.
pub fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::{escape, unescape};

    #[test]
    fn escapes_all_metacharacters() {
        assert_eq!(
            escape(r#"B&B <Display> 'Wide' "Pro""#),
            "B&amp;B &lt;Display&gt; &apos;Wide&apos; &quot;Pro&quot;"
        );
    }

    #[test]
    fn round_trips() {
        let name = r#"A&W <Sans> "Narrow" 'Oblique'"#;
        assert_eq!(unescape(&escape(name)), name);
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(escape("DejaVu Sans"), "DejaVu Sans");
        assert_eq!(unescape("DejaVu Sans"), "DejaVu Sans");
    }
}
