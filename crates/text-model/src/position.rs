//! Positions and ranges.
//!
//! Both are 1-based. Columns are measured in UTF-16 code units, and a column may equal
//! `line length + 1` (the position right after the last character of a line).

use std::cmp::Ordering;
use std::fmt;

/// A (line, column) coordinate in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column in UTF-16 code units.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Returns `true` if `self` comes strictly before `other` in document order.
    pub fn is_before(&self, other: &Position) -> bool {
        self < other
    }

    /// Returns `true` if `self` comes before or is equal to `other` in document order.
    pub fn is_before_or_equal(&self, other: &Position) -> bool {
        self <= other
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.line, self.column)
    }
}

/// An ordered pair of positions, `start <= end` in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Range start (inclusive).
    pub start: Position,
    /// Range end (exclusive).
    pub end: Position,
}

impl Range {
    /// Create a range from explicit coordinates.
    ///
    /// The endpoints are taken as given; a range whose start lies after its end is malformed
    /// and is rejected by model validation rather than swapped.
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    /// Create a range from two positions.
    pub fn from_positions(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// An empty range at `position`.
    pub fn collapsed(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns `true` if start and end coincide.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the endpoints are in document order.
    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive containment of a position.
    pub fn contains_position(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Inclusive containment of another range.
    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains_position(other.start) && self.contains_position(other.end)
    }

    /// Total order on ranges: by end position first, then by start position.
    ///
    /// Used to sort edit operations before the overlap check.
    pub fn compare_by_end(a: &Range, b: &Range) -> Ordering {
        a.end.cmp(&b.end).then_with(|| a.start.cmp(&b.start))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{} -> {},{}]",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}
