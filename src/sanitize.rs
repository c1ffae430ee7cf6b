//! Removal of characters neither output format can carry.

use std::borrow::Cow;

/// Whether `c` is a control character that must not reach a backend.
///
/// Tab, line feed and carriage return survive; every other C0/C1 control and
/// the XML non-characters U+FFFE/U+FFFF are removed.
pub fn is_illegal(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => false,
        '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => true,
        '\u{fffe}' | '\u{ffff}' => true,
        _ => false,
    }
}

/// Strip illegal control characters. Borrows when nothing needs removing.
pub fn strip_control_chars(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_illegal) {
        Cow::Owned(text.chars().filter(|&c| !is_illegal(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_borrowed() {
        assert!(matches!(strip_control_chars("plain text\n"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_controls_removed() {
        assert_eq!(strip_control_chars("a\u{0}b\u{8}c\u{1b}d"), "abcd");
        assert_eq!(strip_control_chars("tab\there\r\n"), "tab\there\r\n");
        assert_eq!(strip_control_chars("x\u{85}y\u{ffff}"), "xy");
    }

    #[test]
    fn test_non_ascii_kept() {
        assert_eq!(strip_control_chars("Café — 東京"), "Café — 東京");
    }
}
