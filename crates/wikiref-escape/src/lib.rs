//! Backslash escaping for reference segments.
//!
//! Path-like and dotted reference grammars reserve a few characters as
//! separators. A segment that contains one of them literally is written with
//! a backslash in front of it:
//!
//! - `escape` prefixes every `/` and `\` with `\`
//! - `escape_reserved` does the same for an arbitrary reserved set; the
//!   backslash itself is always reserved
//! - `find_unescaped` and `rfind_unescaped` locate separators that are not
//!   escaped
//! - `unescape` drops each escaping backslash and keeps the character after
//!   it verbatim; a trailing lone backslash is kept as-is
//!
//! The scheme is a single left-to-right scan in both directions, so
//! `unescape(escape(s)) == s` holds for every string.

/// The escape character.
pub const ESCAPE: char = '\\';

/// Characters reserved inside filesystem-style path segments.
pub const PATH_RESERVED: &[char] = &['/', ESCAPE];

/// Escape a filesystem-style path segment.
///
/// # Examples
///
/// ```
/// use wikiref_escape::{escape, unescape};
///
/// assert_eq!(escape("a/b"), r"a\/b");
/// assert_eq!(unescape(&escape(r"C:\tmp")), r"C:\tmp");
/// ```
pub fn escape(segment: &str) -> String {
    escape_reserved(segment, PATH_RESERVED)
}

/// Escape every character of `segment` found in `reserved`, plus the
/// backslash.
pub fn escape_reserved(segment: &str, reserved: &[char]) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        if ch == ESCAPE || reserved.contains(&ch) {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Reverse [`escape`] and [`escape_reserved`].
///
/// ```
/// use wikiref_escape::unescape;
///
/// assert_eq!(unescape(r"Main\.Sub"), "Main.Sub");
/// assert_eq!(unescape(r"dangling\"), r"dangling\");
/// ```
pub fn unescape(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push(ESCAPE),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split `input` on every `separator` that is not escaped.
///
/// Segments are returned still escaped; run them through [`unescape`]
/// once the structure has been recognised.
///
/// ```
/// use wikiref_escape::split_unescaped;
///
/// assert_eq!(split_unescaped(r"a.b\.c.d", '.'), vec!["a", r"b\.c", "d"]);
/// ```
pub fn split_unescaped(input: &str, separator: char) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, ch) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if ch == separator {
            segments.push(&input[start..i]);
            start = i + ch.len_utf8();
        }
    }
    segments.push(&input[start..]);
    segments
}

/// Byte index of the first occurrence of `target` that is not escaped.
pub fn find_unescaped(input: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if ch == target {
            return Some(i);
        }
    }
    None
}

/// Byte index of the last occurrence of `target` that is not escaped.
///
/// ```
/// use wikiref_escape::rfind_unescaped;
///
/// assert_eq!(rfind_unescaped(r"a:b\:c", ':'), Some(1));
/// ```
pub fn rfind_unescaped(input: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    let mut last = None;
    for (i, ch) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if ch == target {
            last = Some(i);
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escape_path_separators() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a/b"), r"a\/b");
        assert_eq!(escape(r"a\b"), r"a\\b");
        assert_eq!(escape("a.b@c"), "a.b@c");
    }

    #[test]
    fn escape_custom_reserved_set() {
        assert_eq!(escape_reserved("Main.Sub@x", &['.', '@']), r"Main\.Sub\@x");
        assert_eq!(escape_reserved(r"a\b", &[]), r"a\\b");
    }

    #[test]
    fn unescape_copies_escaped_character() {
        assert_eq!(unescape(r"a\/b"), "a/b");
        assert_eq!(unescape(r"a\\b"), r"a\b");
        assert_eq!(unescape(r"\x"), "x");
    }

    #[test]
    fn unescape_keeps_trailing_backslash() {
        assert_eq!(unescape("\\"), "\\");
        assert_eq!(unescape(r"abc\"), r"abc\");
    }

    #[test]
    fn split_respects_escapes() {
        assert_eq!(split_unescaped("a/b/c", '/'), vec!["a", "b", "c"]);
        assert_eq!(split_unescaped(r"a\/b/c", '/'), vec![r"a\/b", "c"]);
        assert_eq!(split_unescaped(r"a\\/b", '/'), vec![r"a\\", "b"]);
        assert_eq!(split_unescaped("", '/'), vec![""]);
        assert_eq!(split_unescaped("/a/", '/'), vec!["", "a", ""]);
    }

    #[test]
    fn find_skips_escaped_occurrences() {
        assert_eq!(find_unescaped(r"a\@b@c", '@'), Some(4));
        assert_eq!(find_unescaped(r"a\@b", '@'), None);
        assert_eq!(find_unescaped(r"a\\@b", '@'), Some(3));
    }

    #[test]
    fn rfind_returns_last_unescaped_occurrence() {
        assert_eq!(rfind_unescaped("a:b:c", ':'), Some(3));
        assert_eq!(rfind_unescaped(r"a:b\:c", ':'), Some(1));
        assert_eq!(rfind_unescaped(r"a\\:b", ':'), Some(3));
        assert_eq!(rfind_unescaped(r"\:", ':'), None);
    }

    #[test]
    fn multibyte_segments() {
        assert_eq!(split_unescaped("été/ü", '/'), vec!["été", "ü"]);
        assert_eq!(unescape(&escape("日本/語")), "日本/語");
    }

    proptest! {
        #[test]
        fn escape_roundtrip(s in ".*") {
            prop_assert_eq!(unescape(&escape(&s)), s);
        }

        #[test]
        fn escaped_segment_never_splits(s in ".*") {
            let escaped = escape(&s);
            prop_assert_eq!(split_unescaped(&escaped, '/'), vec![escaped.as_str()]);
        }

        #[test]
        fn reserved_roundtrip(s in "[a-z.@:/\\\\]*") {
            let escaped = escape_reserved(&s, &['.', '@', ':']);
            prop_assert_eq!(find_unescaped(&escaped, '.'), None);
            prop_assert_eq!(unescape(&escaped), s);
        }
    }
}
