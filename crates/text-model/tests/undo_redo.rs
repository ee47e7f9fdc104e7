use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use text_model::{EditOperation, Position, Range, TextModel, TextModelOptions, UndoRedoResult};

fn push(model: &mut TextModel, operations: Vec<EditOperation>) {
    model.push_edit_operations(None, operations, |_| None).unwrap();
}

#[test]
fn test_undo_redo_single_edit() {
    let mut model = TextModel::new("hello");
    let before = model.version_id();

    push(
        &mut model,
        vec![EditOperation::insert(Position::new(1, 6), " world")],
    );
    assert_eq!(model.value(), "hello world");
    assert!(model.can_undo());
    assert!(!model.can_redo());
    let after = model.version_id();

    let undone = model.undo().unwrap().unwrap();
    assert_eq!(model.value(), "hello");
    assert_eq!(undone.recorded_version_id, before);
    assert!(!model.can_undo());
    assert!(model.can_redo());

    let redone = model.redo().unwrap().unwrap();
    assert_eq!(model.value(), "hello world");
    assert_eq!(redone.recorded_version_id, after);
    assert!(model.can_undo());
    assert!(!model.can_redo());
}

#[test]
fn test_undo_on_empty_stack_returns_none() {
    let mut model = TextModel::new("abc");

    assert_eq!(model.undo().unwrap(), None);
    assert_eq!(model.redo().unwrap(), None);
    assert_eq!(model.value(), "abc");
}

#[test]
fn test_consecutive_pushes_share_one_element() {
    let mut model = TextModel::new("");

    for (column, ch) in ["a", "b", "c"].into_iter().enumerate() {
        push(
            &mut model,
            vec![EditOperation::insert(Position::new(1, column + 1), ch)],
        );
    }
    assert_eq!(model.value(), "abc");
    assert_eq!(model.undo_depth(), 1);

    model.undo().unwrap();
    assert_eq!(model.value(), "");
    assert_eq!(model.redo_depth(), 1);

    model.redo().unwrap();
    assert_eq!(model.value(), "abc");
}

#[test]
fn test_push_stack_element_separates_undo_steps() {
    let mut model = TextModel::new("");

    push(&mut model, vec![EditOperation::insert(Position::new(1, 1), "a")]);
    model.push_stack_element().unwrap();
    push(&mut model, vec![EditOperation::insert(Position::new(1, 2), "b")]);

    assert_eq!(model.undo_depth(), 2);
    model.undo().unwrap();
    assert_eq!(model.value(), "a");
    model.undo().unwrap();
    assert_eq!(model.value(), "");
    model.redo().unwrap();
    assert_eq!(model.value(), "a");
}

#[test]
fn test_new_edit_clears_redo() {
    let mut model = TextModel::new("x");

    push(&mut model, vec![EditOperation::insert(Position::new(1, 2), "y")]);
    model.undo().unwrap();
    assert!(model.can_redo());

    push(&mut model, vec![EditOperation::insert(Position::new(1, 2), "z")]);
    assert!(!model.can_redo());
    assert_eq!(model.value(), "xz");
}

#[test]
fn test_multi_line_batch_round_trips() {
    let mut model = TextModel::new("fn main() {\n    body();\n}");

    push(
        &mut model,
        vec![
            EditOperation::replace(Range::new(1, 4, 1, 8), "start"),
            EditOperation::replace(Range::new(2, 5, 2, 9), "first();\n    second"),
            EditOperation::insert(Position::new(3, 2), "\n"),
        ],
    );
    assert_eq!(
        model.value(),
        "fn start() {\n    first();\n    second();\n}\n"
    );

    model.undo().unwrap();
    assert_eq!(model.value(), "fn main() {\n    body();\n}");
    model.redo().unwrap();
    assert_eq!(
        model.value(),
        "fn start() {\n    first();\n    second();\n}\n"
    );
}

#[test]
fn test_cursor_states_are_returned() {
    let mut model = TextModel::new("abc");
    let before = vec![Range::new(1, 1, 1, 1)];

    let computed = model
        .push_edit_operations(
            Some(before.clone()),
            vec![EditOperation::insert(Position::new(1, 1), "xy")],
            |inverse| Some(vec![Range::collapsed(inverse[0].range.end)]),
        )
        .unwrap();
    assert_eq!(computed, Some(vec![Range::new(1, 3, 1, 3)]));

    let undone = model.undo().unwrap().unwrap();
    assert_eq!(undone.selections, Some(before));

    let redone = model.redo().unwrap();
    assert_eq!(
        redone,
        Some(UndoRedoResult {
            selections: Some(vec![Range::new(1, 3, 1, 3)]),
            recorded_version_id: 2,
        })
    );
}

#[test]
fn test_undo_events_are_flagged() {
    let mut model = TextModel::new("abc");
    let flags = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&flags);
    model.subscribe(move |batch| {
        sink.lock()
            .unwrap()
            .push((batch.is_undoing, batch.is_redoing));
    });

    push(&mut model, vec![EditOperation::insert(Position::new(1, 1), "x")]);
    model.undo().unwrap();
    model.redo().unwrap();

    assert_eq!(
        *flags.lock().unwrap(),
        vec![(false, false), (true, false), (false, true)]
    );
}

#[test]
fn test_undo_advances_version() {
    let mut model = TextModel::new("abc");
    push(&mut model, vec![EditOperation::insert(Position::new(1, 1), "x")]);
    let after_edit = model.version_id();

    model.undo().unwrap();

    assert!(model.version_id() > after_edit);
}

#[test]
fn test_undo_limit_drops_oldest_elements() {
    let options = TextModelOptions::default().with_undo_limit(2);
    let mut model = TextModel::with_options("", options);

    for (column, ch) in ["a", "b", "c"].into_iter().enumerate() {
        push(
            &mut model,
            vec![EditOperation::insert(Position::new(1, column + 1), ch)],
        );
        model.push_stack_element().unwrap();
    }

    assert_eq!(model.undo_depth(), 2);
    model.undo().unwrap();
    model.undo().unwrap();
    assert_eq!(model.undo().unwrap(), None);
    assert_eq!(model.value(), "a");
}

#[test]
fn test_zero_undo_limit_disables_history() {
    let options = TextModelOptions::default().with_undo_limit(0);
    let mut model = TextModel::with_options("abc", options);

    let after = model
        .push_edit_operations(
            None,
            vec![EditOperation::insert(Position::new(1, 4), "d")],
            |inverse| Some(vec![inverse[0].range]),
        )
        .unwrap();
    model.push_stack_element().unwrap();

    assert_eq!(after, Some(vec![Range::new(1, 4, 1, 5)]));
    assert_eq!(model.value(), "abcd");
    assert!(!model.can_undo());
    assert_eq!(model.undo().unwrap(), None);
    assert_eq!(model.value(), "abcd");
}

#[test]
fn test_failed_push_keeps_stack() {
    let mut model = TextModel::new("abc");
    push(&mut model, vec![EditOperation::insert(Position::new(1, 1), "x")]);
    model.undo().unwrap();

    let result = model.push_edit_operations(
        None,
        vec![
            EditOperation::delete(Range::new(1, 1, 1, 3)),
            EditOperation::delete(Range::new(1, 2, 1, 4)),
        ],
        |_| None,
    );

    assert!(result.is_err());
    assert!(model.can_redo());
    assert_eq!(model.value(), "abc");
}

#[test]
fn test_set_value_clears_undo_stack() {
    let mut model = TextModel::new("abc");
    push(&mut model, vec![EditOperation::insert(Position::new(1, 1), "x")]);

    model.set_value("other").unwrap();

    assert!(!model.can_undo());
    assert_eq!(model.undo().unwrap(), None);
}
