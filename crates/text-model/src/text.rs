//! Text helpers: line splitting and UTF-16 column arithmetic.
//!
//! Line contents are stored as UTF-8 `String`s while every public column is a UTF-16 code unit
//! index, so all slicing goes through [`utf16_to_byte`].

use regex::Regex;
use std::sync::LazyLock;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("line break pattern is valid"));

/// How the length of replaced text is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    /// UTF-16 code units (a surrogate pair counts as 2).
    #[default]
    Utf16,
    /// Unicode scalar values (a surrogate pair counts as 1).
    CodePoints,
}

impl LengthUnit {
    /// Measure `text` in this unit.
    pub fn measure(self, text: &str) -> usize {
        match self {
            Self::Utf16 => utf16_len(text),
            Self::CodePoints => text.chars().count(),
        }
    }
}

/// Split `text` on `\r\n`, `\r` and `\n`.
///
/// N line breaks always yield N+1 entries (a trailing break produces a trailing empty line).
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    LINE_BREAK.split(text).map(str::to_string).collect()
}

/// The first line break sequence in `text`, if any.
pub(crate) fn first_line_break(text: &str) -> Option<&str> {
    LINE_BREAK.find(text).map(|m| m.as_str())
}

/// Length of `text` in UTF-16 code units.
pub(crate) fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte offset of the 0-based UTF-16 offset `utf16_offset` in `text`.
///
/// Offsets past the end map to `text.len()`; an offset inside a surrogate pair maps to the
/// start of that character.
pub(crate) fn utf16_to_byte(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte_idx;
        }
        units = next;
    }
    text.len()
}

/// Round a 0-based UTF-16 offset down to a character boundary of `text`.
pub(crate) fn floor_utf16_boundary(text: &str, utf16_offset: usize) -> usize {
    let byte = utf16_to_byte(text, utf16_offset);
    utf16_len(&text[..byte])
}

/// Substring of `text` between two 1-based columns (end exclusive).
pub(crate) fn slice_columns(text: &str, start_column: usize, end_column: usize) -> &str {
    let start = utf16_to_byte(text, start_column.saturating_sub(1));
    let end = utf16_to_byte(text, end_column.saturating_sub(1)).max(start);
    &text[start..end]
}

/// Suffix of `text` starting at a 1-based column.
pub(crate) fn suffix_from_column(text: &str, column: usize) -> &str {
    &text[utf16_to_byte(text, column.saturating_sub(1))..]
}
