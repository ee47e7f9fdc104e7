//! Line storage.
//!
//! A [`ModelLine`] owns its text (without terminator) and the markers anchored inside it. The
//! splice engine in [`TextModel`](crate::TextModel) only ever mutates lines through the
//! primitives below, which keep marker columns and owner back-references consistent.

use crate::marker::{ChangedMarkers, Marker, MarkerId};
use crate::position::Position;
use crate::text::{slice_columns, suffix_from_column, utf16_len, utf16_to_byte};

/// A single-line replacement, expressed in 1-based UTF-16 columns of the line it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// Start column (inclusive).
    pub start_column: usize,
    /// End column (exclusive).
    pub end_column: usize,
    /// Replacement text (no line breaks).
    pub text: String,
    /// Move markers sitting on the edit boundary after the inserted text.
    pub force_move_markers: bool,
}

impl LineEdit {
    /// Returns `true` if the edit neither deletes nor inserts anything.
    pub fn is_noop(&self) -> bool {
        self.start_column == self.end_column && self.text.is_empty()
    }
}

/// One line of a text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLine {
    line_number: usize,
    text: String,
    markers: Vec<Marker>,
}

impl ModelLine {
    /// Create a line without markers.
    pub fn new(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
            markers: Vec::new(),
        }
    }

    /// The line number this line currently reports.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Line content, without terminator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        utf16_len(&self.text)
    }

    /// Largest valid column (`len_utf16() + 1`).
    pub fn max_column(&self) -> usize {
        self.len_utf16() + 1
    }

    /// Markers anchored in this line, ordered by column.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Look up a marker by id.
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Apply edits to this line in one pass.
    ///
    /// `edits` must be sorted by column and must not overlap or touch. Marker columns are mapped
    /// through all edits at once, so every marker observes a single consistent update.
    pub fn apply_edits(&mut self, sink: &mut ChangedMarkers, edits: &[LineEdit]) {
        if edits.is_empty() {
            return;
        }

        let mut new_text = String::with_capacity(self.text.len());
        let mut cursor_byte = 0;
        for edit in edits {
            let start = utf16_to_byte(&self.text, edit.start_column - 1);
            let end = utf16_to_byte(&self.text, edit.end_column - 1).max(start);
            new_text.push_str(&self.text[cursor_byte..start]);
            new_text.push_str(&edit.text);
            cursor_byte = end;
        }
        new_text.push_str(&self.text[cursor_byte..]);

        for marker in &mut self.markers {
            let column = map_column(marker.column, marker.stick_to_previous, edits);
            if column != marker.column {
                marker.column = column;
                sink.record(marker.id, self.line_number);
            }
        }

        tracing::trace!(
            line = self.line_number,
            edits = edits.len(),
            "applied coalesced line edits"
        );
        self.text = new_text;
        self.sort_markers();
    }

    /// Split the line at `column`, returning the trailing part as a new line.
    ///
    /// Markers after `column` move to the returned line. Markers exactly at `column` stay unless
    /// they stick to the next character or `force_move_markers` is set.
    pub fn split(
        &mut self,
        sink: &mut ChangedMarkers,
        column: usize,
        force_move_markers: bool,
    ) -> ModelLine {
        let split_byte = utf16_to_byte(&self.text, column.saturating_sub(1));
        let remainder_text = self.text.split_off(split_byte);
        let split_column = utf16_len(&self.text) + 1;

        let mut remainder = ModelLine::new(self.line_number + 1, remainder_text);

        let (stay, moving): (Vec<Marker>, Vec<Marker>) =
            std::mem::take(&mut self.markers).into_iter().partition(|m| {
                m.column < split_column
                    || (m.column == split_column && m.stick_to_previous && !force_move_markers)
            });
        self.markers = stay;

        for mut marker in moving {
            let column = marker.column.saturating_sub(split_column) + 1;
            marker.update_position(sink, Position::new(remainder.line_number, column));
            remainder.markers.push(marker);
        }
        remainder.sort_markers();
        remainder
    }

    /// Append `other` to the end of this line, adopting its markers.
    pub fn append(&mut self, sink: &mut ChangedMarkers, other: ModelLine) {
        let offset = self.len_utf16();
        self.text.push_str(&other.text);

        for mut marker in other.markers {
            let column = marker.column + offset;
            marker.update_position(sink, Position::new(self.line_number, column));
            self.markers.push(marker);
        }
        self.sort_markers();
    }

    /// Consume the line, returning its markers repositioned to `(new_line_number, column)`.
    pub fn delete_line(
        self,
        sink: &mut ChangedMarkers,
        column: usize,
        new_line_number: usize,
    ) -> Vec<Marker> {
        let mut markers = self.markers;
        for marker in &mut markers {
            marker.update_position(sink, Position::new(new_line_number, column));
        }
        markers
    }

    /// Adopt markers whose positions already point into this line.
    pub fn add_markers(&mut self, markers: Vec<Marker>) {
        if markers.is_empty() {
            return;
        }
        self.markers.extend(markers);
        self.sort_markers();
    }

    /// Detach every marker matching `predicate`.
    pub fn take_markers(&mut self, mut predicate: impl FnMut(&Marker) -> bool) -> Vec<Marker> {
        let (taken, kept) = std::mem::take(&mut self.markers)
            .into_iter()
            .partition(|marker| predicate(marker));
        self.markers = kept;
        taken
    }

    /// Remove a marker, returning it if it was anchored here.
    pub fn remove_marker(&mut self, id: MarkerId) -> Option<Marker> {
        let idx = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(idx))
    }

    /// Renumber the line and every marker it owns.
    pub fn update_line_number(&mut self, sink: &mut ChangedMarkers, line_number: usize) {
        self.line_number = line_number;
        for marker in &mut self.markers {
            marker.update_line_number(sink, line_number);
        }
    }

    /// Text between two columns of this line (end exclusive).
    pub fn slice(&self, start_column: usize, end_column: usize) -> &str {
        slice_columns(&self.text, start_column, end_column)
    }

    /// Text from `column` to the end of the line.
    pub fn suffix(&self, column: usize) -> &str {
        suffix_from_column(&self.text, column)
    }

    fn sort_markers(&mut self) {
        self.markers.sort_by(|a, b| a.column.cmp(&b.column).then_with(|| a.id.cmp(&b.id)));
    }
}

/// Map an original column through a sorted set of non-overlapping edits.
fn map_column(column: usize, stick_to_previous: bool, edits: &[LineEdit]) -> usize {
    let mut delta: isize = 0;
    for edit in edits {
        if column < edit.start_column {
            break;
        }

        let inserted = utf16_len(&edit.text);
        if column <= edit.end_column {
            let start = (edit.start_column as isize + delta) as usize;
            return if stick_to_previous && !edit.force_move_markers {
                start
            } else {
                start + inserted
            };
        }

        delta += inserted as isize - (edit.end_column - edit.start_column) as isize;
    }
    (column as isize + delta) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_markers(text: &str, markers: &[(u64, usize, bool)]) -> ModelLine {
        let mut line = ModelLine::new(1, text);
        line.add_markers(
            markers
                .iter()
                .map(|&(id, column, stick)| {
                    Marker::new(MarkerId(id), Position::new(1, column), stick)
                })
                .collect(),
        );
        line
    }

    fn edit(start: usize, end: usize, text: &str) -> LineEdit {
        LineEdit {
            start_column: start,
            end_column: end,
            text: text.to_string(),
            force_move_markers: false,
        }
    }

    #[test]
    fn test_apply_edits_coalesced() {
        let mut sink = ChangedMarkers::new();
        let mut line = ModelLine::new(1, "abcdef");
        line.apply_edits(&mut sink, &[edit(1, 2, "X"), edit(4, 6, ""), edit(7, 7, "!")]);
        assert_eq!(line.text(), "Xbcf!");
    }

    #[test]
    fn test_apply_edits_marker_stickiness() {
        let mut sink = ChangedMarkers::new();
        let mut line = line_with_markers("abcdef", &[(1, 3, true), (2, 3, false), (3, 6, true)]);

        // Insert "XY" at column 3.
        line.apply_edits(&mut sink, &[edit(3, 3, "XY")]);
        assert_eq!(line.text(), "abXYcdef");
        assert_eq!(line.marker(MarkerId(1)).unwrap().column, 3);
        assert_eq!(line.marker(MarkerId(2)).unwrap().column, 5);
        assert_eq!(line.marker(MarkerId(3)).unwrap().column, 8);
    }

    #[test]
    fn test_apply_edits_markers_inside_deletion_collapse() {
        let mut sink = ChangedMarkers::new();
        let mut line = line_with_markers("abcdef", &[(1, 3, true), (2, 4, false)]);

        line.apply_edits(&mut sink, &[edit(2, 5, "Z")]);
        assert_eq!(line.text(), "aZef");
        assert_eq!(line.marker(MarkerId(1)).unwrap().column, 2);
        assert_eq!(line.marker(MarkerId(2)).unwrap().column, 3);
    }

    #[test]
    fn test_force_move_markers() {
        let mut sink = ChangedMarkers::new();
        let mut line = line_with_markers("ab", &[(1, 2, true)]);
        line.apply_edits(
            &mut sink,
            &[LineEdit {
                start_column: 2,
                end_column: 2,
                text: "__".to_string(),
                force_move_markers: true,
            }],
        );
        assert_eq!(line.marker(MarkerId(1)).unwrap().column, 4);
    }

    #[test]
    fn test_split_moves_trailing_markers() {
        let mut sink = ChangedMarkers::new();
        let mut line = line_with_markers("hello", &[(1, 2, true), (2, 3, true), (3, 3, false)]);

        let rest = line.split(&mut sink, 3, false);
        assert_eq!(line.text(), "he");
        assert_eq!(rest.text(), "llo");
        assert_eq!(line.markers().len(), 2);
        assert_eq!(rest.markers().len(), 1);
        assert_eq!(rest.marker(MarkerId(3)).unwrap().column, 1);
        assert_eq!(rest.marker(MarkerId(3)).unwrap().line, 2);
        assert!(!sink.is_empty());
    }

    #[test]
    fn test_append_shifts_adopted_markers() {
        let mut sink = ChangedMarkers::new();
        let mut first = ModelLine::new(1, "ab");
        let mut second = ModelLine::new(2, "cd");
        second.add_markers(vec![Marker::new(MarkerId(7), Position::new(2, 2), true)]);

        first.append(&mut sink, second);
        assert_eq!(first.text(), "abcd");
        let marker = first.marker(MarkerId(7)).unwrap();
        assert_eq!(marker.position(), Position::new(1, 4));
    }

    #[test]
    fn test_delete_line_migrates_markers() {
        let mut sink = ChangedMarkers::new();
        let line = line_with_markers("gone", &[(4, 2, true), (5, 5, false)]);
        let migrated = line.delete_line(&mut sink, 3, 1);
        assert!(migrated.iter().all(|m| m.position() == Position::new(1, 3)));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_update_line_number_restamps_markers() {
        let mut sink = ChangedMarkers::new();
        let mut line = line_with_markers("x", &[(1, 1, true)]);
        line.update_line_number(&mut sink, 4);
        assert_eq!(line.line_number(), 4);
        assert_eq!(line.marker(MarkerId(1)).unwrap().line, 4);
        assert_eq!(sink.drain().collect::<Vec<_>>(), vec![(MarkerId(1), 4)]);
    }
}
