//! Position markers anchored inside lines.
//!
//! A [`Marker`] is owned by exactly one [`ModelLine`](crate::line::ModelLine). It carries a
//! back-reference to the line number of its owner, which the owning line re-stamps whenever the
//! marker migrates or the line is renumbered. Every re-stamp is reported to a
//! [`ChangedMarkers`] sink so the model can refresh its id-to-line lookup afterwards.

use crate::position::Position;
use std::collections::HashMap;

/// Unique identifier for a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// A tracked position inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Marker identifier.
    pub id: MarkerId,
    /// Line number of the owning line.
    pub line: usize,
    /// 1-based column (UTF-16 code units).
    pub column: usize,
    /// Insertion affinity: when `true` the marker stays before text inserted at its position,
    /// otherwise it moves after it.
    pub stick_to_previous: bool,
}

impl Marker {
    /// Create a marker.
    pub fn new(id: MarkerId, position: Position, stick_to_previous: bool) -> Self {
        Self {
            id,
            line: position.line,
            column: position.column,
            stick_to_previous,
        }
    }

    /// Current position of the marker.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Move the marker, reporting the new owning line to `sink`.
    pub(crate) fn update_position(&mut self, sink: &mut ChangedMarkers, position: Position) {
        self.line = position.line;
        self.column = position.column;
        sink.record(self.id, position.line);
    }

    pub(crate) fn update_line_number(&mut self, sink: &mut ChangedMarkers, line: usize) {
        if self.line != line {
            self.line = line;
            sink.record(self.id, line);
        }
    }
}

/// Sink collecting markers whose owning line changed during a mutation.
///
/// Later records for the same id overwrite earlier ones.
#[derive(Debug, Default)]
pub struct ChangedMarkers {
    lines: HashMap<MarkerId, usize>,
}

impl ChangedMarkers {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` is now owned by line `line`.
    pub fn record(&mut self, id: MarkerId, line: usize) {
        self.lines.insert(id, line);
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct markers recorded.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Drain the recorded `(id, line)` pairs.
    pub fn drain(&mut self) -> impl Iterator<Item = (MarkerId, usize)> + '_ {
        self.lines.drain()
    }
}
