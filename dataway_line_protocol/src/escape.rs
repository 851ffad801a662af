//! Escaping of the characters that delimit a line protocol record.
use std::fmt;

/// Reserved characters and their escaped form, in the order they are applied.
///
/// Backslash itself is not reserved: text that already contains escape
/// sequences gets escaped a second time.
pub const ESCAPES: [(char, &str); 4] = [(',', r"\,"), (' ', r"\ "), ('"', r#"\""#), ('=', r"\=")];

/// Escapes every reserved character in `src` with a single backslash.
///
/// ```
/// use dataway_line_protocol::escape;
///
/// assert_eq!(escape(r#"a b,c="d""#), r#"a\ b\,c\=\"d\""#);
/// ```
pub fn escape(src: &str) -> String {
    escaped(src).to_string()
}

// Return a [`fmt::Display`] that renders `src` with every character of the
// default table escaped.
pub(crate) fn escaped(src: &str) -> Escaped<'_> {
    escape_with(src, &ESCAPES)
}

pub(crate) fn escape_with<'a>(src: &'a str, table: &'a [(char, &'a str)]) -> Escaped<'a> {
    Escaped { src, table }
}

/// Renders a string with each character found in `table` replaced.
///
/// Replacements are written straight to the output and never scanned again.
pub(crate) struct Escaped<'a> {
    src: &'a str,
    table: &'a [(char, &'a str)],
}

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (idx, ch) in self.src.char_indices() {
            if let Some((_, replacement)) = self.table.iter().find(|(c, _)| *c == ch) {
                f.write_str(&self.src[last..idx])?;
                f.write_str(replacement)?;
                last = idx + ch.len_utf8();
            }
        }
        f.write_str(&self.src[last..])
    }
}
