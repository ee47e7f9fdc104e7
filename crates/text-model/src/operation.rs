//! Edit operations.
//!
//! A transaction starts from raw [`EditOperation`]s, which the model validates into
//! [`ValidatedEditOperation`]s. The helpers here work on validated batches:
//!
//! - [`sort_and_check_overlaps`] orders a batch and rejects overlapping or touching ranges,
//! - [`collapse_operations`] folds a large batch into a single equivalent operation,
//! - [`to_delta_operations`] / [`inverse_edit_ranges`] compute where each replacement ends up
//!   once the whole batch is applied, which is where the undo operations must point,
//! - [`map_position`] follows a position through a batch using those final ranges.

use crate::error::{ModelError, ModelResult};
use crate::line::ModelLine;
use crate::position::{Position, Range};
use crate::text::{split_lines, utf16_len};

/// A requested replacement of `range` by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    /// Caller-provided identifier, carried over to the inverse operation.
    pub identifier: Option<u64>,
    /// Target range.
    pub range: Range,
    /// Replacement text. `None` (or an empty string) deletes the range.
    pub text: Option<String>,
    /// Move markers sitting on the edit boundary after the inserted text.
    pub force_move_markers: bool,
}

impl EditOperation {
    /// Replace `range` with `text`.
    pub fn replace(range: Range, text: impl Into<String>) -> Self {
        Self {
            identifier: None,
            range,
            text: Some(text.into()),
            force_move_markers: false,
        }
    }

    /// Insert `text` at `position`.
    pub fn insert(position: Position, text: impl Into<String>) -> Self {
        Self::replace(Range::collapsed(position), text)
    }

    /// Delete `range`.
    pub fn delete(range: Range) -> Self {
        Self {
            identifier: None,
            range,
            text: None,
            force_move_markers: false,
        }
    }

    /// Attach an identifier.
    pub fn with_identifier(mut self, identifier: u64) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Request boundary markers to be moved after the inserted text.
    pub fn with_force_move_markers(mut self, force: bool) -> Self {
        self.force_move_markers = force;
        self
    }
}

/// An operation whose range was validated against the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEditOperation {
    /// Index of the operation in the caller's batch.
    pub sort_index: usize,
    /// Caller-provided identifier.
    pub identifier: Option<u64>,
    /// Validated range.
    pub range: Range,
    /// Length of the text currently covered by `range` (see [`LengthUnit`](crate::LengthUnit)).
    pub range_length: usize,
    /// Replacement text split into lines; `None` for a pure deletion.
    pub lines: Option<Vec<String>>,
    /// Move markers sitting on the edit boundary after the inserted text.
    pub force_move_markers: bool,
}

impl ValidatedEditOperation {
    /// Split `text` into replacement lines; empty or missing text means "no replacement".
    pub(crate) fn replacement_lines(text: Option<&str>) -> Option<Vec<String>> {
        match text {
            Some(text) if !text.is_empty() => Some(split_lines(text)),
            _ => None,
        }
    }

    /// Returns `true` if the operation neither deletes nor inserts anything.
    pub fn is_noop(&self) -> bool {
        self.range.is_empty() && self.lines.is_none()
    }

    /// Replacement text joined with `eol`.
    pub fn text(&self, eol: &str) -> String {
        self.lines
            .as_ref()
            .map(|lines| lines.join(eol))
            .unwrap_or_default()
    }
}

/// A validated operation re-expressed relative to the end of the preceding operation.
///
/// The start is relative to the previous operation's (pre-edit) end, or to `(0, 0)` for the
/// first operation; the end is relative to the operation's own start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaEditOperation {
    /// Lines between the previous end and this start.
    pub delta_start_line: usize,
    /// Column offset of the start (relative only when `delta_start_line == 0`).
    pub delta_start_column: usize,
    /// Lines spanned by the range.
    pub delta_end_line: usize,
    /// Column offset of the end (relative only when `delta_end_line == 0`).
    pub delta_end_column: usize,
    /// Replacement lines.
    pub lines: Option<Vec<String>>,
}

/// Sort a batch ascending (by end, then start) and reject overlapping or touching ranges.
pub fn sort_and_check_overlaps(operations: &mut [ValidatedEditOperation]) -> ModelResult<()> {
    operations.sort_by(|a, b| {
        Range::compare_by_end(&a.range, &b.range).then_with(|| a.sort_index.cmp(&b.sort_index))
    });

    for pair in operations.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if !prev.range.end.is_before(&next.range.start) {
            return Err(ModelError::OverlappingOperations {
                first: prev.range,
                second: next.range,
            });
        }
    }
    Ok(())
}

/// Express an ascending, non-overlapping batch as deltas.
pub fn to_delta_operations(operations: &[ValidatedEditOperation]) -> Vec<DeltaEditOperation> {
    let mut prev_end = Position::new(0, 0);
    operations
        .iter()
        .map(|op| {
            let start = op.range.start;
            let end = op.range.end;

            let delta_start_line = start.line - prev_end.line;
            let delta_start_column = if delta_start_line == 0 {
                start.column - prev_end.column
            } else {
                start.column
            };
            let delta_end_line = end.line - start.line;
            let delta_end_column = if delta_end_line == 0 {
                end.column - start.column
            } else {
                end.column
            };

            prev_end = end;
            DeltaEditOperation {
                delta_start_line,
                delta_start_column,
                delta_end_line,
                delta_end_column,
                lines: op.lines.clone(),
            }
        })
        .collect()
}

/// Ranges occupied by each operation's replacement text after the whole batch is applied.
pub fn inverse_edit_ranges(deltas: &[DeltaEditOperation]) -> Vec<Range> {
    let mut cursor = Position::new(0, 0);
    deltas
        .iter()
        .map(|delta| {
            let start_line = cursor.line + delta.delta_start_line;
            let start_column = if delta.delta_start_line == 0 {
                cursor.column + delta.delta_start_column
            } else {
                delta.delta_start_column
            };
            let start = Position::new(start_line, start_column);

            let end = match delta.lines.as_deref() {
                None | Some([]) => start,
                Some([only]) => Position::new(start_line, start_column + utf16_len(only)),
                Some(lines) => {
                    let last = &lines[lines.len() - 1];
                    Position::new(start_line + lines.len() - 1, utf16_len(last) + 1)
                }
            };

            cursor = end;
            Range::from_positions(start, end)
        })
        .collect()
}

/// Where `position` ends up once an ascending, non-overlapping batch is applied.
///
/// `final_ranges` are the batch's [`inverse_edit_ranges`]. A position inside (or on the
/// boundary of) an operation lands at the start of its replacement when it sticks to the
/// previous character and the operation does not force markers along, otherwise at the end.
/// A position between operations keeps its offset from the preceding operation's end.
pub fn map_position(
    position: Position,
    stick_to_previous: bool,
    operations: &[ValidatedEditOperation],
    final_ranges: &[Range],
) -> Position {
    let mut anchor: Option<(Position, Position)> = None;
    for (op, final_range) in operations.iter().zip(final_ranges) {
        if op.range.contains_position(position) {
            return if stick_to_previous && !op.force_move_markers {
                final_range.start
            } else {
                final_range.end
            };
        }
        if !op.range.end.is_before(&position) {
            break;
        }
        anchor = Some((op.range.end, final_range.end));
    }

    match anchor {
        None => position,
        Some((end, final_end)) if end.line == position.line => {
            Position::new(final_end.line, final_end.column + position.column - end.column)
        }
        Some((end, final_end)) => {
            Position::new(position.line + final_end.line - end.line, position.column)
        }
    }
}

/// Fold an ascending, non-overlapping batch into one operation with the same net effect.
///
/// The replacement text is rebuilt by a linear scan: untouched text between consecutive
/// operations is copied from `lines`, each operation contributes its replacement. The caller
/// fills in `range_length` for the collapsed range.
pub fn collapse_operations(
    operations: &[ValidatedEditOperation],
    lines: &[ModelLine],
) -> Option<ValidatedEditOperation> {
    let first = operations.first()?;
    let last = operations.last()?;
    let line_text = |line_number: usize| lines[line_number - 1].text();

    let mut text = String::new();
    let mut last_end = first.range.start;
    let mut force_move_markers = false;

    for op in operations {
        force_move_markers |= op.force_move_markers;
        let start = op.range.start;

        for line_number in last_end.line..start.line {
            if line_number == last_end.line {
                text.push_str(lines[line_number - 1].suffix(last_end.column));
            } else {
                text.push('\n');
                text.push_str(line_text(line_number));
            }
        }
        if start.line == last_end.line {
            text.push_str(lines[start.line - 1].slice(last_end.column, start.column));
        } else {
            text.push('\n');
            text.push_str(lines[start.line - 1].slice(1, start.column));
        }

        if let Some(replacement) = &op.lines {
            for (idx, line) in replacement.iter().enumerate() {
                if idx != 0 {
                    text.push('\n');
                }
                text.push_str(line);
            }
        }
        last_end = op.range.end;
    }

    Some(ValidatedEditOperation {
        sort_index: 0,
        identifier: first.identifier,
        range: Range::from_positions(first.range.start, last.range.end),
        range_length: 0,
        lines: Some(split_lines(&text)),
        force_move_markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validated(range: Range, text: Option<&str>, sort_index: usize) -> ValidatedEditOperation {
        ValidatedEditOperation {
            sort_index,
            identifier: None,
            range,
            range_length: 0,
            lines: ValidatedEditOperation::replacement_lines(text),
            force_move_markers: false,
        }
    }

    #[test]
    fn test_sort_orders_by_end() {
        let mut ops = vec![
            validated(Range::new(2, 1, 2, 3), Some("x"), 0),
            validated(Range::new(1, 1, 1, 1), Some("y"), 1),
        ];
        sort_and_check_overlaps(&mut ops).unwrap();
        assert_eq!(ops[0].sort_index, 1);
        assert_eq!(ops[1].sort_index, 0);
    }

    #[test]
    fn test_touching_ranges_are_rejected() {
        let mut ops = vec![
            validated(Range::new(1, 1, 1, 3), Some("x"), 0),
            validated(Range::new(1, 3, 1, 4), Some("y"), 1),
        ];
        assert!(matches!(
            sort_and_check_overlaps(&mut ops),
            Err(ModelError::OverlappingOperations { .. })
        ));

        let mut same_point = vec![
            validated(Range::new(1, 2, 1, 2), Some("a"), 0),
            validated(Range::new(1, 2, 1, 2), Some("b"), 1),
        ];
        assert!(sort_and_check_overlaps(&mut same_point).is_err());
    }

    #[test]
    fn test_replacement_lines() {
        assert_eq!(ValidatedEditOperation::replacement_lines(None), None);
        assert_eq!(ValidatedEditOperation::replacement_lines(Some("")), None);
        assert_eq!(
            ValidatedEditOperation::replacement_lines(Some("a\r\nb")),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_delta_operations() {
        let ops = vec![
            validated(Range::new(1, 2, 1, 3), Some("X"), 0),
            validated(Range::new(1, 5, 2, 2), None, 1),
        ];
        let deltas = to_delta_operations(&ops);
        assert_eq!(deltas[0].delta_start_line, 1);
        assert_eq!(deltas[0].delta_start_column, 2);
        assert_eq!(deltas[0].delta_end_line, 0);
        assert_eq!(deltas[0].delta_end_column, 1);
        assert_eq!(deltas[1].delta_start_line, 0);
        assert_eq!(deltas[1].delta_start_column, 2);
        assert_eq!(deltas[1].delta_end_line, 1);
        assert_eq!(deltas[1].delta_end_column, 2);
    }

    #[test]
    fn test_inverse_ranges_single_and_multi_line() {
        // Buffer "abc" / "def": replace "b" with "X", then "e" with "1\n22".
        let ops = vec![
            validated(Range::new(1, 2, 1, 3), Some("X"), 0),
            validated(Range::new(2, 2, 2, 3), Some("1\n22"), 1),
        ];
        let ranges = inverse_edit_ranges(&to_delta_operations(&ops));
        assert_eq!(ranges[0], Range::new(1, 2, 1, 3));
        assert_eq!(ranges[1], Range::new(2, 2, 3, 3));
    }

    #[test]
    fn test_inverse_ranges_shift_on_same_line() {
        // Two edits on one line: the second moves by the first's length change.
        let ops = vec![
            validated(Range::new(1, 1, 1, 3), Some("long text"), 0),
            validated(Range::new(1, 5, 1, 6), None, 1),
        ];
        let ranges = inverse_edit_ranges(&to_delta_operations(&ops));
        assert_eq!(ranges[0], Range::new(1, 1, 1, 10));
        assert_eq!(ranges[1], Range::new(1, 12, 1, 12));
    }

    #[test]
    fn test_map_position_between_and_inside_operations() {
        // "abcdef" / "ghi": "b" becomes "XY", "d..h" becomes "1\n2".
        let ops = vec![
            validated(Range::new(1, 2, 1, 3), Some("XY"), 0),
            validated(Range::new(1, 4, 2, 2), Some("1\n2"), 1),
        ];
        let ranges = inverse_edit_ranges(&to_delta_operations(&ops));
        let map = |line, column, stick| {
            map_position(Position::new(line, column), stick, &ops, &ranges)
        };

        assert_eq!(map(1, 1, false), Position::new(1, 1));
        // On the first operation's end boundary.
        assert_eq!(map(1, 3, true), Position::new(1, 2));
        assert_eq!(map(1, 3, false), Position::new(1, 4));
        // Inside the multi-line operation.
        assert_eq!(map(1, 6, true), Position::new(1, 5));
        assert_eq!(map(1, 6, false), Position::new(2, 2));
        // After the last operation, on its end line and below it.
        assert_eq!(map(2, 3, false), Position::new(2, 3));
        assert_eq!(map(3, 1, false), Position::new(3, 1));
    }

    #[test]
    fn test_collapse_operations() {
        let lines = vec![ModelLine::new(1, "abc"), ModelLine::new(2, "def")];
        let ops = vec![
            validated(Range::new(1, 2, 1, 2), Some("1"), 0),
            validated(Range::new(1, 3, 2, 2), Some("2"), 1),
            validated(Range::new(2, 3, 2, 3), Some("3"), 2),
        ];
        let collapsed = collapse_operations(&ops, &lines).unwrap();
        assert_eq!(collapsed.range, Range::new(1, 2, 2, 3));
        // "b" + ... → "1" + "b" + "2" + "e" + "3"
        assert_eq!(collapsed.lines, Some(vec!["1b2e3".to_string()]));
    }
}
