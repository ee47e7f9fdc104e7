//! The text model and its edit transaction.
//!
//! # Transaction pipeline
//!
//! ```text
//! raw operations
//!   → validate ranges, split replacement text, measure replaced length
//!   → sort ascending + reject overlaps
//!   → editable range guard
//!   → inverse ranges (delta walk) + capture replaced text
//!   → reduce (collapse large batches, park markers inside the collapsed span)
//!   → splice lines (descending order) + migrate markers + renumber + restore parked markers
//!   → stamp versions, publish one ContentChangedBatch
//! ```
//!
//! Everything that can fail happens before the splice step, so a rejected batch never leaves
//! the model partially edited.

use crate::edit_stack::{EditStack, StackElement, UndoRedoResult};
use crate::error::{ModelError, ModelResult};
use crate::events::{
    ContentChangeCallback, ContentChangedBatch, DeferredEvents, PendingContentChange,
    RawContentChange,
};
use crate::line::{LineEdit, ModelLine};
use crate::line_ending::{EolPreference, LineEnding};
use crate::marker::{ChangedMarkers, Marker, MarkerId};
use crate::operation::{
    EditOperation, ValidatedEditOperation, collapse_operations, inverse_edit_ranges,
    map_position, sort_and_check_overlaps, to_delta_operations,
};
use crate::options::TextModelOptions;
use crate::position::{Position, Range};
use crate::text::{floor_utf16_boundary, split_lines, utf16_len};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Touched span of one splice pass.
#[derive(Debug, Clone, Copy)]
struct SpliceSummary {
    min_touched_line: usize,
    max_touched_line: usize,
    line_count_delta: isize,
}

/// A line-oriented text document with atomic, reversible, versioned batch edits.
///
/// # Example
///
/// ```rust
/// use text_model::{EditOperation, Range, TextModel};
///
/// let mut model = TextModel::new("abc\ndef");
/// let inverse = model
///     .apply_edits(vec![EditOperation::replace(Range::new(1, 2, 1, 3), "X")])
///     .unwrap();
/// assert_eq!(model.value(), "aXc\ndef");
///
/// model.apply_edits(inverse).unwrap();
/// assert_eq!(model.value(), "abc\ndef");
/// ```
pub struct TextModel {
    /// Line arena; index `i` holds line number `i + 1` outside of a transaction.
    lines: Vec<ModelLine>,
    eol: LineEnding,
    options: TextModelOptions,
    version_id: u64,
    /// Non-owning lookup: marker id → owning line number.
    marker_lines: HashMap<MarkerId, usize>,
    next_marker_id: u64,
    /// Start/end anchors of the editable range.
    editable_range: Option<(MarkerId, MarkerId)>,
    edit_stack: EditStack,
    is_undoing: bool,
    is_redoing: bool,
    disposed: bool,
    callbacks: Vec<ContentChangeCallback>,
    last_change_batch: Option<Arc<ContentChangedBatch>>,
}

impl TextModel {
    /// Create a model with default options.
    pub fn new(text: &str) -> Self {
        Self::with_options(text, TextModelOptions::default())
    }

    /// Create a model with explicit options.
    pub fn with_options(text: &str, options: TextModelOptions) -> Self {
        let eol = LineEnding::detect_in_text(text, options.default_eol);
        let edit_stack = EditStack::new(options.undo_limit);
        Self {
            lines: build_lines(text),
            eol,
            options,
            version_id: 1,
            marker_lines: HashMap::new(),
            next_marker_id: 1,
            editable_range: None,
            edit_stack,
            is_undoing: false,
            is_redoing: false,
            disposed: false,
            callbacks: Vec::new(),
            last_change_batch: None,
        }
    }

    // ----- reads -----

    /// Current version id.
    pub fn version_id(&self) -> u64 {
        self.version_id
    }

    /// Options the model was created with.
    pub fn options(&self) -> &TextModelOptions {
        &self.options
    }

    /// The model's line ending.
    pub fn eol(&self) -> LineEnding {
        self.eol
    }

    /// Number of lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Content of a line, without terminator.
    pub fn line_content(&self, line_number: usize) -> Option<&str> {
        self.line(line_number).map(ModelLine::text)
    }

    /// Length of a line in UTF-16 code units.
    pub fn line_length(&self, line_number: usize) -> Option<usize> {
        self.line(line_number).map(ModelLine::len_utf16)
    }

    /// Largest valid column of a line.
    pub fn line_max_column(&self, line_number: usize) -> Option<usize> {
        self.line(line_number).map(ModelLine::max_column)
    }

    /// All line contents.
    pub fn lines_content(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text().to_string()).collect()
    }

    /// Whole content joined with the model line ending.
    pub fn value(&self) -> String {
        self.value_with_eol(EolPreference::TextDefined)
    }

    /// Whole content joined with the preferred line ending.
    pub fn value_with_eol(&self, preference: EolPreference) -> String {
        let eol = preference.resolve(self.eol).as_str();
        let texts: Vec<&str> = self.lines.iter().map(ModelLine::text).collect();
        texts.join(eol)
    }

    /// Range covering the whole content.
    pub fn full_model_range(&self) -> Range {
        let last = self.lines.len();
        Range::new(1, 1, last, self.lines[last - 1].max_column())
    }

    /// Text covered by `range`.
    pub fn value_in_range(&self, range: Range, preference: EolPreference) -> ModelResult<String> {
        let range = self.validate_range(range)?;
        Ok(self.text_in_range(range, preference.resolve(self.eol)))
    }

    /// Length of the text covered by `range`, in the configured [`LengthUnit`](crate::LengthUnit).
    pub fn value_length_in_range(&self, range: Range) -> ModelResult<usize> {
        let range = self.validate_range(range)?;
        Ok(self.measure_range(range))
    }

    /// UTF-16 offset of a position, counting line endings.
    pub fn offset_at(&self, position: Position) -> usize {
        let position = self.validate_position(position);
        let eol_len = self.eol.sequence_len();
        let preceding: usize = self.lines[..position.line - 1]
            .iter()
            .map(|line| line.len_utf16() + eol_len)
            .sum();
        preceding + position.column - 1
    }

    /// Position of a UTF-16 offset; offsets inside a line ending map to the end of that line.
    pub fn position_at(&self, offset: usize) -> Position {
        let eol_len = self.eol.sequence_len();
        let mut remaining = offset;
        for (idx, line) in self.lines.iter().enumerate() {
            let len = line.len_utf16();
            if remaining <= len {
                return self.validate_position(Position::new(idx + 1, remaining + 1));
            }
            if remaining < len + eol_len {
                return Position::new(idx + 1, len + 1);
            }
            remaining -= len + eol_len;
        }
        self.full_model_range().end
    }

    // ----- validation -----

    /// Clamp a position into the model.
    ///
    /// A line before the first clamps to the model start, a line past the last clamps to the
    /// model end. Otherwise the column is clamped into `[1, line length + 1]`; a column inside a
    /// surrogate pair is moved to the start of the pair.
    pub fn validate_position(&self, position: Position) -> Position {
        if position.line < 1 {
            return Position::new(1, 1);
        }
        if position.line > self.lines.len() {
            return self.full_model_range().end;
        }
        let line = &self.lines[position.line - 1];
        let column = position.column.clamp(1, line.max_column());
        let column = floor_utf16_boundary(line.text(), column - 1) + 1;
        Position::new(position.line, column)
    }

    /// Clamp both ends of a range.
    ///
    /// A range whose start lies after its end is rejected as requested, before clamping can
    /// fold it onto a single point.
    pub fn validate_range(&self, range: Range) -> ModelResult<Range> {
        if !range.is_well_formed() {
            return Err(ModelError::InvalidRange { range });
        }
        let validated = Range::from_positions(
            self.validate_position(range.start),
            self.validate_position(range.end),
        );
        if !validated.is_well_formed() {
            return Err(ModelError::InvalidRange { range: validated });
        }
        Ok(validated)
    }

    // ----- transactions -----

    /// Apply a batch of edits as one atomic transaction.
    ///
    /// Returns the inverse operations in ascending document order; applying them restores the
    /// previous content.
    pub fn apply_edits(&mut self, operations: Vec<EditOperation>) -> ModelResult<Vec<EditOperation>> {
        self.apply_transaction(operations)
    }

    fn apply_transaction(
        &mut self,
        operations: Vec<EditOperation>,
    ) -> ModelResult<Vec<EditOperation>> {
        self.assert_not_disposed()?;
        if operations.is_empty() {
            return Ok(Vec::new());
        }

        let mut validated = self.normalize_operations(operations)?;
        if let Err(err) = sort_and_check_overlaps(&mut validated) {
            debug!(error = %err, "rejected edit batch");
            return Err(err);
        }
        self.check_editable_range(&validated)?;

        let final_ranges = inverse_edit_ranges(&to_delta_operations(&validated));
        let inverse = self.inverse_operations(&validated, &final_ranges);

        let eol = self.eol.as_str();
        let mut deferred = DeferredEvents::default();
        for op in validated.iter().rev().filter(|op| !op.is_noop()) {
            deferred.push_change(PendingContentChange {
                range: op.range,
                range_length: op.range_length,
                text: op.text(eol),
            });
        }

        let first_line = validated[0].range.start.line;
        let operation_count = validated.len();

        let mut sink = ChangedMarkers::new();
        let summary = match self.reduce_operations(&validated) {
            Some(collapsed) => {
                let parked = self.park_markers(collapsed.range, &validated, &final_ranges);
                let summary = self.splice(vec![collapsed], &mut sink, &mut deferred);
                self.restore_markers(parked, &mut sink);
                summary
            }
            None => self.splice(validated, &mut sink, &mut deferred),
        };
        self.refresh_marker_index(&mut sink);

        if !deferred.has_raw() {
            // Every operation was a no-op; still publish so the version advances.
            deferred.push_raw(RawContentChange::LineChanged {
                line_number: first_line,
                detail: self.lines[first_line - 1].text().to_string(),
            });
        }

        let previous_version_id = self.version_id;
        self.publish(deferred);
        debug!(
            operations = operation_count,
            from_version = previous_version_id,
            to_version = self.version_id,
            min_line = summary.min_touched_line,
            max_line = summary.max_touched_line,
            line_delta = summary.line_count_delta,
            undoing = self.is_undoing,
            redoing = self.is_redoing,
            "applied edit transaction"
        );

        Ok(inverse)
    }

    fn normalize_operations(
        &self,
        operations: Vec<EditOperation>,
    ) -> ModelResult<Vec<ValidatedEditOperation>> {
        operations
            .into_iter()
            .enumerate()
            .map(|(sort_index, op)| {
                let range = self.validate_range(op.range).inspect_err(|err| {
                    debug!(error = %err, "rejected malformed edit range");
                })?;
                Ok(ValidatedEditOperation {
                    sort_index,
                    identifier: op.identifier,
                    range,
                    range_length: self.measure_range(range),
                    lines: ValidatedEditOperation::replacement_lines(op.text.as_deref()),
                    force_move_markers: op.force_move_markers,
                })
            })
            .collect()
    }

    fn check_editable_range(&self, operations: &[ValidatedEditOperation]) -> ModelResult<()> {
        let Some(editable) = self.editable_range_bounds() else {
            return Ok(());
        };
        if let Some(op) = operations
            .iter()
            .find(|op| !editable.contains_range(&op.range))
        {
            debug!(range = %op.range, editable = %editable, "rejected edit outside editable range");
            return Err(ModelError::OutsideEditableRange {
                range: op.range,
                editable,
            });
        }
        Ok(())
    }

    fn inverse_operations(
        &self,
        operations: &[ValidatedEditOperation],
        final_ranges: &[Range],
    ) -> Vec<EditOperation> {
        operations
            .iter()
            .zip(final_ranges)
            .map(|(op, &range)| EditOperation {
                identifier: op.identifier,
                range,
                text: Some(self.text_in_range(op.range, self.eol)),
                force_move_markers: op.force_move_markers,
            })
            .collect()
    }

    /// Fold a large batch into one operation, or `None` to splice it as is.
    fn reduce_operations(
        &self,
        operations: &[ValidatedEditOperation],
    ) -> Option<ValidatedEditOperation> {
        if operations.len() < self.options.reduce_threshold {
            return None;
        }
        let mut collapsed = collapse_operations(operations, &self.lines)?;
        collapsed.range_length = self.measure_range(collapsed.range);
        debug!(
            operations = operations.len(),
            range = %collapsed.range,
            "collapsed edit batch into a single operation"
        );
        Some(collapsed)
    }

    /// Detach the markers a collapsed operation would otherwise swallow, already moved to where
    /// the original batch puts them.
    fn park_markers(
        &mut self,
        span: Range,
        operations: &[ValidatedEditOperation],
        final_ranges: &[Range],
    ) -> Vec<Marker> {
        let mut parked = Vec::new();
        for line in &mut self.lines[span.start.line - 1..span.end.line] {
            parked.extend(line.take_markers(|marker| span.contains_position(marker.position())));
        }
        for marker in &mut parked {
            let position =
                map_position(marker.position(), marker.stick_to_previous, operations, final_ranges);
            marker.line = position.line;
            marker.column = position.column;
        }
        trace!(markers = parked.len(), range = %span, "parked markers across collapsed batch");
        parked
    }

    fn restore_markers(&mut self, parked: Vec<Marker>, sink: &mut ChangedMarkers) {
        for marker in parked {
            sink.record(marker.id, marker.line);
            let line = marker.line;
            self.lines[line - 1].add_markers(vec![marker]);
        }
    }

    /// Rewrite the line arena for an ascending, non-overlapping batch.
    fn splice(
        &mut self,
        mut operations: Vec<ValidatedEditOperation>,
        sink: &mut ChangedMarkers,
        events: &mut DeferredEvents,
    ) -> SpliceSummary {
        operations.sort_by(|a, b| {
            Range::compare_by_end(&b.range, &a.range).then_with(|| b.sort_index.cmp(&a.sort_index))
        });

        let min_touched_line = operations.last().map_or(1, |op| op.range.start.line);
        let max_touched_line = operations.first().map_or(1, |op| op.range.end.line + 1);
        let mut line_count_delta: isize = 0;
        let mut queue: Vec<(usize, LineEdit)> = Vec::new();

        for op in &operations {
            if op.is_noop() {
                continue;
            }

            let Range { start, end } = op.range;
            let replacement: &[String] = op.lines.as_deref().unwrap_or(&[]);

            let deleting = end.line - start.line;
            let inserting = replacement.len().saturating_sub(1);
            let editing = deleting.min(inserting);
            line_count_delta += inserting as isize - deleting as isize;

            for j in (0..=editing).rev() {
                let edit_line = start.line + j;
                let edit = LineEdit {
                    start_column: if edit_line == start.line { start.column } else { 1 },
                    end_column: if edit_line == end.line {
                        end.column
                    } else {
                        self.lines[edit_line - 1].max_column()
                    },
                    text: replacement.get(j).cloned().unwrap_or_default(),
                    force_move_markers: op.force_move_markers,
                };
                if !edit.is_noop() {
                    queue.push((edit_line, edit));
                }
            }

            if editing < deleting {
                self.flush_line_edits(&mut queue, sink, events);

                let splice_start_line = start.line + editing;
                let splice_start_column = self.lines[splice_start_line - 1].max_column();
                let end_line_remains = self.lines[end.line - 1].split(sink, end.column, false);

                let removed: Vec<ModelLine> =
                    self.lines.drain(splice_start_line..end.line).collect();
                let removed_count = removed.len();
                let mut migrated: Vec<Marker> = Vec::new();
                for line in removed {
                    migrated.extend(line.delete_line(sink, splice_start_column, splice_start_line));
                }
                trace!(
                    markers = migrated.len(),
                    line = splice_start_line,
                    column = splice_start_column,
                    "migrated markers from deleted lines"
                );

                let first = &mut self.lines[splice_start_line - 1];
                first.append(sink, end_line_remains);
                first.add_markers(migrated);

                events.push_raw(RawContentChange::LineChanged {
                    line_number: splice_start_line,
                    detail: first.text().to_string(),
                });
                events.push_raw(RawContentChange::LinesDeleted {
                    from_line: splice_start_line + 1,
                    to_line: splice_start_line + removed_count,
                });
            }

            if editing < inserting {
                self.flush_line_edits(&mut queue, sink, events);

                let splice_line = start.line + editing;
                let first_column = if splice_line == start.line {
                    start.column
                } else {
                    1
                };
                let splice_column = first_column + utf16_len(&replacement[editing]);

                let leftover = self.lines[splice_line - 1].split(
                    sink,
                    splice_column,
                    op.force_move_markers,
                );
                events.push_raw(RawContentChange::LineChanged {
                    line_number: splice_line,
                    detail: self.lines[splice_line - 1].text().to_string(),
                });

                let inserted: Vec<ModelLine> = (editing + 1..=inserting)
                    .map(|j| ModelLine::new(start.line + j, replacement[j].clone()))
                    .collect();
                self.lines.splice(splice_line..splice_line, inserted);

                let last_inserted = &mut self.lines[start.line + inserting - 1];
                last_inserted.append(sink, leftover);

                let detail = self.lines[splice_line..start.line + inserting]
                    .iter()
                    .map(ModelLine::text)
                    .collect::<Vec<_>>()
                    .join("\n");
                events.push_raw(RawContentChange::LinesInserted {
                    from_line: splice_line + 1,
                    to_line: start.line + inserting,
                    detail,
                });
            }
        }

        self.flush_line_edits(&mut queue, sink, events);

        let line_count = self.lines.len();
        let mut max_touched_line =
            ((max_touched_line as isize + line_count_delta).max(1) as usize).min(line_count);
        if line_count_delta != 0 {
            // Every following line shifted.
            max_touched_line = line_count;
        }
        for line_number in min_touched_line..=max_touched_line {
            self.lines[line_number - 1].update_line_number(sink, line_number);
        }

        SpliceSummary {
            min_touched_line,
            max_touched_line,
            line_count_delta,
        }
    }

    /// Commit queued single-line edits, one `apply_edits` call per distinct line.
    fn flush_line_edits(
        &mut self,
        queue: &mut Vec<(usize, LineEdit)>,
        sink: &mut ChangedMarkers,
        events: &mut DeferredEvents,
    ) {
        if queue.is_empty() {
            return;
        }

        // Queued in descending order; flush in ascending (line, column) order.
        let mut queued = std::mem::take(queue);
        queued.reverse();

        for group in queued.chunk_by(|a, b| a.0 == b.0) {
            let line_number = group[0].0;
            let edits: Vec<LineEdit> = group.iter().map(|(_, edit)| edit.clone()).collect();
            let line = &mut self.lines[line_number - 1];
            line.apply_edits(sink, &edits);
            events.push_raw(RawContentChange::LineChanged {
                line_number,
                detail: line.text().to_string(),
            });
        }
    }

    fn publish(&mut self, deferred: DeferredEvents) {
        let batch = Arc::new(deferred.publish(
            self.version_id,
            self.eol,
            self.is_undoing,
            self.is_redoing,
        ));
        self.version_id = batch.version_id;
        for callback in &mut self.callbacks {
            callback(&batch);
        }
        self.last_change_batch = Some(batch);
    }

    // ----- whole-content changes -----

    /// Replace the whole content.
    ///
    /// All markers (including the editable range) are dropped and the undo stack is cleared.
    pub fn set_value(&mut self, text: &str) -> ModelResult<()> {
        self.assert_not_disposed()?;
        self.lines = build_lines(text);
        self.eol = LineEnding::detect_in_text(text, self.eol);
        self.marker_lines.clear();
        self.editable_range = None;
        self.edit_stack.clear();

        let mut deferred = DeferredEvents::default();
        deferred.push_raw(RawContentChange::Flush);
        self.publish(deferred);
        debug!(lines = self.lines.len(), version = self.version_id, "reset model content");
        Ok(())
    }

    /// Change the line ending used to join lines.
    pub fn set_eol(&mut self, eol: LineEnding) -> ModelResult<()> {
        self.assert_not_disposed()?;
        if self.eol == eol {
            return Ok(());
        }
        self.eol = eol;

        let mut deferred = DeferredEvents::default();
        deferred.push_raw(RawContentChange::EolChanged { eol });
        self.publish(deferred);
        Ok(())
    }

    // ----- undo / redo -----

    /// Close the currently open undo element.
    pub fn push_stack_element(&mut self) -> ModelResult<()> {
        self.assert_not_disposed()?;
        self.edit_stack.push_stack_element();
        Ok(())
    }

    /// Apply `operations` and record their inverse on the undo stack.
    ///
    /// `cursor_state_computer` receives the inverse operations and returns the selections to
    /// restore on redo; its result is returned as well.
    pub fn push_edit_operations<F>(
        &mut self,
        before_cursor_state: Option<Vec<Range>>,
        operations: Vec<EditOperation>,
        cursor_state_computer: F,
    ) -> ModelResult<Option<Vec<Range>>>
    where
        F: FnOnce(&[EditOperation]) -> Option<Vec<Range>>,
    {
        self.assert_not_disposed()?;
        let before_version_id = self.version_id;
        let inverse = self.apply_transaction(operations)?;

        self.edit_stack.begin(before_version_id, before_cursor_state);
        let after_cursor_state = cursor_state_computer(&inverse);
        self.edit_stack
            .record(inverse, after_cursor_state.clone(), self.version_id);
        Ok(after_cursor_state)
    }

    /// Undo the last undo element. Returns `None` if there is nothing to undo.
    pub fn undo(&mut self) -> ModelResult<Option<UndoRedoResult>> {
        self.assert_not_disposed()?;
        let Some(mut element) = self.edit_stack.pop_undo() else {
            return Ok(None);
        };

        self.is_undoing = true;
        let replayed = self.replay(&mut element, true);
        self.is_undoing = false;
        if let Err(err) = replayed {
            self.edit_stack.clear();
            return Err(err);
        }

        debug!(version = self.version_id, "undo");
        let result = UndoRedoResult {
            selections: element.before_cursor_state.clone(),
            recorded_version_id: element.before_version_id,
        };
        self.edit_stack.push_undone(element);
        Ok(Some(result))
    }

    /// Redo the last undone element. Returns `None` if there is nothing to redo.
    pub fn redo(&mut self) -> ModelResult<Option<UndoRedoResult>> {
        self.assert_not_disposed()?;
        let Some(mut element) = self.edit_stack.pop_redo() else {
            return Ok(None);
        };

        self.is_redoing = true;
        let replayed = self.replay(&mut element, false);
        self.is_redoing = false;
        if let Err(err) = replayed {
            self.edit_stack.clear();
            return Err(err);
        }

        debug!(version = self.version_id, "redo");
        let result = UndoRedoResult {
            selections: element.after_cursor_state.clone(),
            recorded_version_id: element.after_version_id,
        };
        self.edit_stack.push_redone(element);
        Ok(Some(result))
    }

    /// Whether an undo element is available.
    pub fn can_undo(&self) -> bool {
        self.edit_stack.can_undo()
    }

    /// Whether a redo element is available.
    pub fn can_redo(&self) -> bool {
        self.edit_stack.can_redo()
    }

    /// Number of undo elements (including the open one).
    pub fn undo_depth(&self) -> usize {
        self.edit_stack.undo_depth()
    }

    /// Number of redo elements.
    pub fn redo_depth(&self) -> usize {
        self.edit_stack.redo_depth()
    }

    /// Replay an element's batches, swapping each for its own inverse.
    fn replay(&mut self, element: &mut StackElement, reverse: bool) -> ModelResult<()> {
        let count = element.edit_operations.len();
        for step in 0..count {
            let idx = if reverse { count - 1 - step } else { step };
            let operations = std::mem::take(&mut element.edit_operations[idx]);
            element.edit_operations[idx] = self.apply_transaction(operations)?;
        }
        Ok(())
    }

    // ----- editable range -----

    /// Restrict edits to `range`, or lift the restriction with `None`.
    ///
    /// The range is anchored with markers so it follows edits made inside it. Changing it
    /// clears the undo stack.
    pub fn set_editable_range(&mut self, range: Option<Range>) -> ModelResult<()> {
        self.assert_not_disposed()?;
        let range = range.map(|r| self.validate_range(r)).transpose()?;

        self.edit_stack.clear();
        if let Some((start, end)) = self.editable_range.take() {
            self.detach_marker(start).ok();
            self.detach_marker(end).ok();
        }

        if let Some(range) = range {
            let start = self.insert_marker(range.start, true);
            let end = self.insert_marker(range.end, false);
            self.editable_range = Some((start, end));
        }
        debug!(range = ?range, "set editable range");
        Ok(())
    }

    /// Whether an editable range is configured.
    pub fn has_editable_range(&self) -> bool {
        self.editable_range.is_some()
    }

    /// The editable range, or the full model range if none is configured.
    pub fn get_editable_range(&self) -> Range {
        self.editable_range_bounds()
            .unwrap_or_else(|| self.full_model_range())
    }

    fn editable_range_bounds(&self) -> Option<Range> {
        let (start, end) = self.editable_range?;
        Some(Range::from_positions(
            self.marker_position(start)?,
            self.marker_position(end)?,
        ))
    }

    // ----- markers -----

    /// Anchor a marker at `position` (clamped into the model).
    pub fn add_marker(&mut self, position: Position, stick_to_previous: bool) -> ModelResult<MarkerId> {
        self.assert_not_disposed()?;
        Ok(self.insert_marker(position, stick_to_previous))
    }

    /// Move a marker to `position` (clamped into the model).
    pub fn change_marker(&mut self, id: MarkerId, position: Position) -> ModelResult<()> {
        self.assert_not_disposed()?;
        self.check_caller_marker(id)?;
        let mut marker = self.detach_marker(id)?;
        let position = self.validate_position(position);
        marker.line = position.line;
        marker.column = position.column;
        self.lines[position.line - 1].add_markers(vec![marker]);
        self.marker_lines.insert(id, position.line);
        Ok(())
    }

    /// Remove a marker.
    pub fn remove_marker(&mut self, id: MarkerId) -> ModelResult<()> {
        self.assert_not_disposed()?;
        self.check_caller_marker(id)?;
        self.detach_marker(id).map(|_| ())
    }

    /// Current position of a marker.
    pub fn marker_position(&self, id: MarkerId) -> Option<Position> {
        let line_number = *self.marker_lines.get(&id)?;
        self.line(line_number)?.marker(id).map(Marker::position)
    }

    /// Number of caller-created markers.
    pub fn marker_count(&self) -> usize {
        let internal = if self.editable_range.is_some() { 2 } else { 0 };
        self.marker_lines.len().saturating_sub(internal)
    }

    /// Editable range anchors are owned by the model.
    fn check_caller_marker(&self, id: MarkerId) -> ModelResult<()> {
        match self.editable_range {
            Some((start, end)) if id == start || id == end => Err(ModelError::UnknownMarker(id)),
            _ => Ok(()),
        }
    }

    fn insert_marker(&mut self, position: Position, stick_to_previous: bool) -> MarkerId {
        let position = self.validate_position(position);
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        self.lines[position.line - 1].add_markers(vec![Marker::new(id, position, stick_to_previous)]);
        self.marker_lines.insert(id, position.line);
        id
    }

    fn detach_marker(&mut self, id: MarkerId) -> ModelResult<Marker> {
        let line_number = self
            .marker_lines
            .remove(&id)
            .ok_or(ModelError::UnknownMarker(id))?;
        self.lines
            .get_mut(line_number - 1)
            .and_then(|line| line.remove_marker(id))
            .ok_or(ModelError::UnknownMarker(id))
    }

    fn refresh_marker_index(&mut self, sink: &mut ChangedMarkers) {
        for (id, line_number) in sink.drain() {
            if let Some(slot) = self.marker_lines.get_mut(&id) {
                *slot = line_number;
            }
        }
    }

    // ----- listeners -----

    /// Register a listener invoked once per published change batch.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&ContentChangedBatch) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// The batch published by the last transaction.
    pub fn last_change_batch(&self) -> Option<&ContentChangedBatch> {
        self.last_change_batch.as_deref()
    }

    /// Take the batch published by the last transaction.
    pub fn take_last_change_batch(&mut self) -> Option<Arc<ContentChangedBatch>> {
        self.last_change_batch.take()
    }

    // ----- lifecycle -----

    /// Release the model. Every later mutation fails with [`ModelError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.lines = vec![ModelLine::new(1, "")];
        self.marker_lines.clear();
        self.editable_range = None;
        self.edit_stack.clear();
        self.callbacks.clear();
        self.last_change_batch = None;
        debug!("disposed text model");
    }

    /// Whether [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ----- helpers -----

    fn assert_not_disposed(&self) -> ModelResult<()> {
        if self.disposed {
            return Err(ModelError::Disposed);
        }
        Ok(())
    }

    fn line(&self, line_number: usize) -> Option<&ModelLine> {
        self.lines.get(line_number.checked_sub(1)?)
    }

    fn measure_range(&self, range: Range) -> usize {
        self.options
            .length_unit
            .measure(&self.text_in_range(range, self.eol))
    }

    /// Text of an already validated range.
    fn text_in_range(&self, range: Range, eol: LineEnding) -> String {
        let Range { start, end } = range;
        if start.line == end.line {
            return self.lines[start.line - 1]
                .slice(start.column, end.column)
                .to_string();
        }

        let eol = eol.as_str();
        let mut out = String::from(self.lines[start.line - 1].suffix(start.column));
        for line in &self.lines[start.line..end.line - 1] {
            out.push_str(eol);
            out.push_str(line.text());
        }
        out.push_str(eol);
        out.push_str(self.lines[end.line - 1].slice(1, end.column));
        out
    }
}

fn build_lines(text: &str) -> Vec<ModelLine> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| ModelLine::new(idx + 1, line))
        .collect()
}
