use std::borrow::Cow;

/// Ellipsis appended to text cut by `truncate_chars`.
pub(crate) const ELLIPSIS: &str = "...";

/// First `max` characters of `s` followed by `...`, or `s` unchanged when it fits.
/// Counts `char`s, so multi-byte text is never split inside a code point.
pub(crate) fn truncate_chars(s: &str, max: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max) {
        Some((end, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &s[..end])),
        None => Cow::Borrowed(s),
    }
}

/// Flatten user- or API-supplied text onto one line for list items and headings.
pub(crate) fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_borrowed_unchanged() {
        let text = "x".repeat(2000);
        let out = truncate_chars(&text, 2000);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, text);
    }

    #[test]
    fn long_text_keeps_prefix_and_appends_ellipsis() {
        let text = "y".repeat(2001);
        let out = truncate_chars(&text, 2000);
        assert_eq!(out.len(), 2003);
        assert!(out.ends_with("y..."));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "अ".repeat(2500);
        let out = truncate_chars(&text, 2000);
        assert_eq!(out.chars().count(), 2003);
        assert!(out.starts_with(&"अ".repeat(2000)));
    }

    #[test]
    fn single_line_replaces_newlines() {
        assert_eq!(single_line("line1\nline2\rline3"), "line1 line2 line3");
        assert_eq!(single_line("no newlines"), "no newlines");
    }
}
