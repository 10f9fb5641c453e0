//! Field escaping for the line-oriented text renderings.
//!
//! The text formats delimit fields with `|` and join lists with `,`. A
//! user-supplied summary or name containing a literal pipe or backslash
//! would corrupt field boundaries, so each is replaced by a six-character
//! literal escape sequence: a backslash followed by `u005c` for the
//! backslash and by `u007c` for the pipe. Printable ASCII, not control
//! bytes. No other characters are escaped.

use std::borrow::Cow;

/// Escape a single field for text rendering.
///
/// A single pass guarantees the backslash that opens an inserted escape
/// sequence is never itself re-escaped.
pub fn escape_field(s: &str) -> Cow<'_, str> {
    if !s.contains(['\\', '|']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\u005c"),
            '|' => out.push_str("\\u007c"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Inverse substitution: recover the original field text.
pub fn unescape_field(s: &str) -> String {
    s.replace("\\u007c", "|").replace("\\u005c", "\\")
}
