//! Content change events.
//!
//! A transaction publishes exactly one [`ContentChangedBatch`], after all lines have been
//! mutated. The batch carries two views of the same change:
//!
//! - **raw** changes, line-grained and expressed in the numbering that was current when each
//!   one happened (consumers replaying them in order reconstruct the final line array),
//! - **coarse** changes, one per effective edit operation, carrying the replaced range, the
//!   replacement text and the line ending used to join it.
//!
//! All events of a transaction share one version bump. With `n = max(raw, coarse)` the model
//! version advances by `n`, and each list is stamped with descending versions ending at the
//! final version id.

use crate::line_ending::LineEnding;
use crate::position::Range;

/// A line-grained change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawContentChange {
    /// The whole content was replaced.
    Flush,
    /// A line's content changed.
    LineChanged {
        /// Line number at the time of the change.
        line_number: usize,
        /// New line content.
        detail: String,
    },
    /// A contiguous run of lines was removed.
    LinesDeleted {
        /// First removed line (inclusive).
        from_line: usize,
        /// Last removed line (inclusive).
        to_line: usize,
    },
    /// A contiguous run of lines was inserted.
    LinesInserted {
        /// First inserted line (inclusive).
        from_line: usize,
        /// Last inserted line (inclusive).
        to_line: usize,
        /// Inserted content, lines joined with `'\n'`.
        detail: String,
    },
    /// The model line ending changed.
    EolChanged {
        /// The new line ending.
        eol: LineEnding,
    },
}

/// A raw change stamped with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContentChangedEvent {
    /// The change.
    pub change: RawContentChange,
    /// Version id this event produced.
    pub version_id: u64,
    /// The transaction was driven by undo.
    pub is_undoing: bool,
    /// The transaction was driven by redo.
    pub is_redoing: bool,
}

/// A coarse change: one replaced range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// Replaced range, in the coordinates in effect when the change is replayed in order.
    pub range: Range,
    /// Length of the replaced text.
    pub range_length: usize,
    /// Replacement text.
    pub text: String,
    /// Line ending used in `text`.
    pub eol: LineEnding,
    /// Version id this event produced.
    pub version_id: u64,
    /// The transaction was driven by undo.
    pub is_undoing: bool,
    /// The transaction was driven by redo.
    pub is_redoing: bool,
}

/// Everything published for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChangedBatch {
    /// Line-grained changes in mutation order.
    pub raw: Vec<RawContentChangedEvent>,
    /// Coarse changes in application order (descending document position).
    pub changes: Vec<ContentChange>,
    /// Model version before the transaction.
    pub previous_version_id: u64,
    /// Model version after the transaction.
    pub version_id: u64,
    /// The transaction was driven by undo.
    pub is_undoing: bool,
    /// The transaction was driven by redo.
    pub is_redoing: bool,
}

impl ContentChangedBatch {
    /// Returns `true` if the batch replaced the whole content.
    pub fn is_flush(&self) -> bool {
        self.raw
            .iter()
            .any(|event| matches!(event.change, RawContentChange::Flush))
    }
}

/// Listener invoked once per published batch.
pub type ContentChangeCallback = Box<dyn FnMut(&ContentChangedBatch) + Send>;

/// Coarse change data collected before versions are known.
#[derive(Debug, Clone)]
pub(crate) struct PendingContentChange {
    pub(crate) range: Range,
    pub(crate) range_length: usize,
    pub(crate) text: String,
}

/// Collects a transaction's changes and stamps them once the mutation phase is over.
#[derive(Debug, Default)]
pub(crate) struct DeferredEvents {
    raw: Vec<RawContentChange>,
    changes: Vec<PendingContentChange>,
}

impl DeferredEvents {
    pub(crate) fn push_raw(&mut self, change: RawContentChange) {
        self.raw.push(change);
    }

    pub(crate) fn push_change(&mut self, change: PendingContentChange) {
        self.changes.push(change);
    }

    pub(crate) fn has_raw(&self) -> bool {
        !self.raw.is_empty()
    }

    /// Stamp all events; `n = max(raw, coarse)` versions are consumed.
    pub(crate) fn publish(
        self,
        previous_version_id: u64,
        eol: LineEnding,
        is_undoing: bool,
        is_redoing: bool,
    ) -> ContentChangedBatch {
        let bumps = self.raw.len().max(self.changes.len()).max(1) as u64;
        let version_id = previous_version_id + bumps;

        let raw_count = self.raw.len() as u64;
        let raw = self
            .raw
            .into_iter()
            .enumerate()
            .map(|(idx, change)| RawContentChangedEvent {
                change,
                version_id: version_id - (raw_count - 1 - idx as u64),
                is_undoing,
                is_redoing,
            })
            .collect();

        let change_count = self.changes.len() as u64;
        let changes = self
            .changes
            .into_iter()
            .enumerate()
            .map(|(idx, change)| ContentChange {
                range: change.range,
                range_length: change.range_length,
                text: change.text,
                eol,
                version_id: version_id - (change_count - 1 - idx as u64),
                is_undoing,
                is_redoing,
            })
            .collect();

        ContentChangedBatch {
            raw,
            changes,
            previous_version_id,
            version_id,
            is_undoing,
            is_redoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_changed(n: usize) -> RawContentChange {
        RawContentChange::LineChanged {
            line_number: n,
            detail: String::new(),
        }
    }

    #[test]
    fn test_versions_descend_to_final() {
        let mut deferred = DeferredEvents::default();
        deferred.push_raw(line_changed(3));
        deferred.push_raw(line_changed(2));
        deferred.push_raw(line_changed(1));
        deferred.push_change(PendingContentChange {
            range: Range::new(1, 1, 1, 1),
            range_length: 0,
            text: "x".to_string(),
        });

        let batch = deferred.publish(10, LineEnding::Lf, false, true);
        assert_eq!(batch.version_id, 13);
        let raw_versions: Vec<u64> = batch.raw.iter().map(|e| e.version_id).collect();
        assert_eq!(raw_versions, vec![11, 12, 13]);
        assert_eq!(batch.changes[0].version_id, 13);
        assert!(batch.changes[0].is_redoing);
        assert!(!batch.is_flush());
    }

    #[test]
    fn test_empty_batch_still_bumps_once() {
        let batch = DeferredEvents::default().publish(4, LineEnding::Lf, false, false);
        assert_eq!(batch.version_id, 5);
        assert!(batch.raw.is_empty());
    }
}
