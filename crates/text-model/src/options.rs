//! Model configuration.

use crate::line_ending::LineEnding;
use crate::text::LengthUnit;

/// Batches with at least this many operations are collapsed into one before splicing.
pub const DEFAULT_REDUCE_THRESHOLD: usize = 1000;

/// Default maximum number of undo stack elements.
pub const DEFAULT_UNDO_LIMIT: usize = 1000;

/// Options for constructing a [`TextModel`](crate::TextModel).
///
/// ```rust
/// use text_model::{LengthUnit, LineEnding, TextModel, TextModelOptions};
///
/// let options = TextModelOptions::default()
///     .with_default_eol(LineEnding::Crlf)
///     .with_length_unit(LengthUnit::CodePoints);
/// let model = TextModel::with_options("single line", options);
/// assert_eq!(model.eol(), LineEnding::Crlf);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextModelOptions {
    /// Line ending used when the initial text contains no line break.
    pub default_eol: LineEnding,
    /// Operation count at which a batch is collapsed into a single operation.
    pub reduce_threshold: usize,
    /// Unit used for `range_length` and [`TextModel::value_length_in_range`](crate::TextModel::value_length_in_range).
    pub length_unit: LengthUnit,
    /// Maximum number of undo stack elements kept by the edit stack.
    pub undo_limit: usize,
}

impl Default for TextModelOptions {
    fn default() -> Self {
        Self {
            default_eol: LineEnding::Lf,
            reduce_threshold: DEFAULT_REDUCE_THRESHOLD,
            length_unit: LengthUnit::Utf16,
            undo_limit: DEFAULT_UNDO_LIMIT,
        }
    }
}

impl TextModelOptions {
    /// Set the fallback line ending.
    pub fn with_default_eol(mut self, eol: LineEnding) -> Self {
        self.default_eol = eol;
        self
    }

    /// Set the reducer threshold (values below 1 are treated as 1).
    pub fn with_reduce_threshold(mut self, threshold: usize) -> Self {
        self.reduce_threshold = threshold.max(1);
        self
    }

    /// Set the unit used to measure replaced lengths.
    pub fn with_length_unit(mut self, unit: LengthUnit) -> Self {
        self.length_unit = unit;
        self
    }

    /// Set the undo stack limit. A limit of 0 disables undo history.
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }
}
