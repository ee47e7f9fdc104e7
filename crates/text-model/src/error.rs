//! Error types.

use crate::marker::MarkerId;
use crate::position::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors reported by [`TextModel`](crate::TextModel) entry points.
///
/// Every error is raised before the model is mutated, so a failed call leaves the lines, the
/// markers and the version id untouched.
pub enum ModelError {
    #[error("model is disposed")]
    /// The model was used after [`TextModel::dispose`](crate::TextModel::dispose).
    Disposed,

    #[error("overlapping ranges are not allowed: {first} and {second}")]
    /// Two operations of one transaction overlap or touch.
    OverlappingOperations {
        /// The earlier operation's range (document order).
        first: Range,
        /// The later operation's range.
        second: Range,
    },

    #[error("editing outside of editable range {editable} is not allowed: {range}")]
    /// An operation targets text outside of the configured editable range.
    OutsideEditableRange {
        /// The offending operation range.
        range: Range,
        /// The editable range at the time of the call.
        editable: Range,
    },

    #[error("range start is after range end: {range}")]
    /// A range whose start lies after its end.
    InvalidRange {
        /// The malformed range, as requested.
        range: Range,
    },

    #[error("unknown marker {0:?}")]
    /// A marker id that is not (or no longer) tracked by the model.
    UnknownMarker(MarkerId),
}

/// Result alias used throughout the crate.
pub type ModelResult<T> = Result<T, ModelError>;
