//! Undo/redo stack.
//!
//! The stack stores, per element, the inverse operation batches returned by
//! [`TextModel::apply_edits`](crate::TextModel::apply_edits). Consecutive pushes land in the
//! same open element until [`EditStack::push_stack_element`] closes it, so one undo may replay
//! several transactions.

use crate::operation::EditOperation;
use crate::position::Range;

/// A closed or open group of recorded transactions.
#[derive(Debug, Clone)]
pub(crate) struct StackElement {
    pub(crate) before_version_id: u64,
    pub(crate) before_cursor_state: Option<Vec<Range>>,
    /// Inverse batches, oldest first.
    pub(crate) edit_operations: Vec<Vec<EditOperation>>,
    pub(crate) after_cursor_state: Option<Vec<Range>>,
    pub(crate) after_version_id: u64,
}

/// Outcome of an undo or redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRedoResult {
    /// Selections to restore, if the recording side provided them.
    pub selections: Option<Vec<Range>>,
    /// Version id recorded for the state that was restored.
    pub recorded_version_id: u64,
}

#[derive(Debug)]
pub(crate) struct EditStack {
    past: Vec<StackElement>,
    future: Vec<StackElement>,
    open: Option<StackElement>,
    max_undo: usize,
}

impl EditStack {
    pub(crate) fn new(max_undo: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            open: None,
            max_undo,
        }
    }

    pub(crate) fn can_undo(&self) -> bool {
        self.open.is_some() || !self.past.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub(crate) fn undo_depth(&self) -> usize {
        self.past.len() + usize::from(self.open.is_some())
    }

    pub(crate) fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub(crate) fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.open = None;
    }

    /// Close the open element, if any.
    pub(crate) fn push_stack_element(&mut self) {
        if let Some(element) = self.open.take() {
            self.push_past(element);
        }
    }

    /// Push onto the undo side, dropping the oldest elements beyond `max_undo`.
    fn push_past(&mut self, element: StackElement) {
        if self.max_undo == 0 {
            return;
        }
        while self.past.len() >= self.max_undo {
            self.past.remove(0);
        }
        self.past.push(element);
    }

    /// Start (or continue) the open element before a recorded transaction.
    ///
    /// With a limit of 0 nothing is recorded.
    pub(crate) fn begin(&mut self, before_version_id: u64, before_cursor_state: Option<Vec<Range>>) {
        self.future.clear();
        if self.open.is_none() && self.max_undo > 0 {
            self.open = Some(StackElement {
                before_version_id,
                before_cursor_state,
                edit_operations: Vec::new(),
                after_cursor_state: None,
                after_version_id: before_version_id,
            });
        }
    }

    /// Record a transaction's inverse operations into the open element.
    pub(crate) fn record(
        &mut self,
        inverse: Vec<EditOperation>,
        after_cursor_state: Option<Vec<Range>>,
        after_version_id: u64,
    ) {
        if let Some(element) = self.open.as_mut() {
            element.edit_operations.push(inverse);
            element.after_cursor_state = after_cursor_state;
            element.after_version_id = after_version_id;
        }
    }

    pub(crate) fn pop_undo(&mut self) -> Option<StackElement> {
        self.push_stack_element();
        self.past.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<StackElement> {
        self.future.pop()
    }

    pub(crate) fn push_undone(&mut self, element: StackElement) {
        self.future.push(element);
    }

    pub(crate) fn push_redone(&mut self, element: StackElement) {
        self.push_past(element);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn inverse() -> Vec<EditOperation> {
        vec![EditOperation::insert(Position::new(1, 1), "x")]
    }

    #[test]
    fn test_open_element_collects_pushes() {
        let mut stack = EditStack::new(10);
        stack.begin(1, None);
        stack.record(inverse(), None, 2);
        stack.begin(2, None);
        stack.record(inverse(), None, 3);
        assert_eq!(stack.undo_depth(), 1);

        let element = stack.pop_undo().unwrap();
        assert_eq!(element.edit_operations.len(), 2);
        assert_eq!(element.before_version_id, 1);
        assert_eq!(element.after_version_id, 3);
    }

    #[test]
    fn test_push_stack_element_separates_groups() {
        let mut stack = EditStack::new(10);
        stack.begin(1, None);
        stack.record(inverse(), None, 2);
        stack.push_stack_element();
        stack.begin(2, None);
        stack.record(inverse(), None, 3);
        assert_eq!(stack.undo_depth(), 2);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut stack = EditStack::new(2);
        for version in 0..4 {
            stack.begin(version, None);
            stack.record(inverse(), None, version + 1);
            stack.push_stack_element();
        }
        assert_eq!(stack.undo_depth(), 2);
        assert_eq!(stack.pop_undo().unwrap().before_version_id, 3);
    }

    #[test]
    fn test_zero_limit_records_nothing() {
        let mut stack = EditStack::new(0);
        stack.begin(1, None);
        stack.record(inverse(), None, 2);
        stack.push_stack_element();
        assert!(!stack.can_undo());
        assert!(stack.pop_undo().is_none());
    }

    #[test]
    fn test_redone_elements_respect_limit() {
        let mut stack = EditStack::new(1);
        stack.begin(1, None);
        stack.record(inverse(), None, 2);
        let first = stack.pop_undo().unwrap();
        let second = first.clone();

        stack.push_redone(first);
        stack.push_redone(second);
        assert_eq!(stack.undo_depth(), 1);
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut stack = EditStack::new(10);
        stack.begin(1, None);
        stack.record(inverse(), None, 2);
        let element = stack.pop_undo().unwrap();
        stack.push_undone(element);
        assert!(stack.can_redo());

        stack.begin(3, None);
        assert!(!stack.can_redo());
    }
}
