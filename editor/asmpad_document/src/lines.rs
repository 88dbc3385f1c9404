//! Line index over a raw text buffer.
//!
//! The buffer is modelled as `'\n'`-separated logical lines: a buffer with
//! no trailing terminator still counts its last partial line, and the empty
//! buffer counts as one empty line. Under this model the line count is
//! always `count('\n') + 1`, and removing a line and re-inserting it at the
//! same index are exact inverses for every buffer.
//!
//! Scans use memchr rather than byte-at-a-time iteration.

use std::ops::Range;

/// 1-based cursor position derived from a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Number of logical lines in `text`.
///
/// Equals `count('\n') + 1`; the empty buffer has one (empty) line.
#[must_use]
pub fn line_count(text: &str) -> usize {
    memchr::memchr_iter(b'\n', text.as_bytes()).count() + 1
}

/// Map a byte offset into a 1-based `(line, column)` position.
///
/// Offsets past the end of the buffer clamp to the final position, and an
/// offset inside a multi-byte character snaps back to its first byte.
/// Columns count characters, not bytes.
#[must_use]
pub fn position_at(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text.as_bytes()[..offset];
    let line = memchr::memchr_iter(b'\n', before).count() + 1;
    let line_start = memchr::memrchr(b'\n', before).map_or(0, |i| i + 1);
    let column = text[line_start..offset].chars().count() + 1;
    Position { line, column }
}

/// Byte range of the content of 1-based line `line_no`, excluding its
/// terminator. `None` if the line does not exist.
#[must_use]
pub fn line_span(text: &str, line_no: usize) -> Option<Range<usize>> {
    if line_no == 0 {
        return None;
    }
    let bytes = text.as_bytes();
    let mut start = 0;
    for _ in 1..line_no {
        let nl = memchr::memchr(b'\n', &bytes[start..])?;
        start += nl + 1;
    }
    let end = memchr::memchr(b'\n', &bytes[start..]).map_or(text.len(), |nl| start + nl);
    Some(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // === Line count ===

    #[test]
    fn empty_buffer_has_one_line() {
        assert_eq!(line_count(""), 1);
    }

    #[test]
    fn unterminated_final_line_counts() {
        assert_eq!(line_count("hello"), 1);
        assert_eq!(line_count("a\nb"), 2);
    }

    #[test]
    fn trailing_newline_opens_an_empty_line() {
        assert_eq!(line_count("a\n"), 2);
        assert_eq!(line_count("a\nb\nc\n"), 4);
    }

    #[test]
    fn line_count_matches_newline_formula() {
        for text in ["", "x", "x\n", "\n\n\n", "a\r\nb", "α\nβ\nγ"] {
            let newlines = text.matches('\n').count();
            assert_eq!(line_count(text), newlines + 1, "text {text:?}");
        }
    }

    // === Positions ===

    #[test]
    fn position_at_start() {
        assert_eq!(position_at("ab\ncd", 0), Position::new(1, 1));
    }

    #[test]
    fn position_after_newline() {
        assert_eq!(position_at("ab\ncd", 3), Position::new(2, 1));
        assert_eq!(position_at("ab\ncd", 5), Position::new(2, 3));
    }

    #[test]
    fn position_on_newline_byte() {
        // The terminator itself belongs to the line it ends.
        assert_eq!(position_at("ab\ncd", 2), Position::new(1, 3));
    }

    #[test]
    fn position_clamps_past_end() {
        assert_eq!(position_at("ab", 100), Position::new(1, 3));
        assert_eq!(position_at("", 7), Position::new(1, 1));
    }

    #[test]
    fn position_counts_chars_not_bytes() {
        // 'é' is two bytes; column advances by one.
        let text = "é\né";
        assert_eq!(position_at(text, 2), Position::new(1, 2));
        assert_eq!(position_at(text, text.len()), Position::new(2, 2));
    }

    #[test]
    fn position_snaps_inside_multibyte_char() {
        // Offset 1 is inside 'é'; snaps back to its first byte.
        assert_eq!(position_at("é", 1), Position::new(1, 1));
    }

    // === Line spans ===

    #[test]
    fn span_of_each_line() {
        let text = "ab\ncd\n";
        assert_eq!(line_span(text, 1), Some(0..2));
        assert_eq!(line_span(text, 2), Some(3..5));
        assert_eq!(line_span(text, 3), Some(6..6)); // empty final line
        assert_eq!(line_span(text, 4), None);
    }

    #[test]
    fn span_of_unterminated_final_line() {
        assert_eq!(line_span("ab\ncd", 2), Some(3..5));
    }

    #[test]
    fn span_line_zero_is_invalid() {
        assert_eq!(line_span("ab", 0), None);
    }

    #[test]
    fn span_of_empty_buffer() {
        assert_eq!(line_span("", 1), Some(0..0));
        assert_eq!(line_span("", 2), None);
    }
}
