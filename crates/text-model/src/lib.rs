#![warn(missing_docs)]
//! Text Model - Line-Oriented Text Buffer with Atomic Batch Edits
//!
//! # Overview
//!
//! `text-model` stores a document as an array of lines and applies batches of range edits as
//! single atomic transactions. Every transaction returns the inverse batch that undoes it,
//! keeps anchored markers in place, and publishes one versioned batch of change events.
//!
//! Positions are 1-based; columns count UTF-16 code units.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  TextModel (transactions, undo/redo, API)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Events (raw + coarse, version stamping)    │  ← Change Notifications
//! ├─────────────────────────────────────────────┤
//! │  Operations (validate, sort, inverse, fold) │  ← Edit Planning
//! ├─────────────────────────────────────────────┤
//! │  Lines + Markers (splice primitives)        │  ← Storage
//! ├─────────────────────────────────────────────┤
//! │  Text (line splitting, UTF-16 columns)      │  ← Text Metrics
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use text_model::{EditOperation, Position, Range, TextModel};
//!
//! let mut model = TextModel::new("abc\ndef");
//!
//! model.subscribe(|batch| {
//!     println!("version {} -> {}", batch.previous_version_id, batch.version_id);
//! });
//!
//! let inverse = model
//!     .apply_edits(vec![
//!         EditOperation::replace(Range::new(1, 2, 1, 3), "X"),
//!         EditOperation::insert(Position::new(2, 4), "\nghi"),
//!     ])
//!     .unwrap();
//! assert_eq!(model.lines_content(), vec!["aXc", "def", "ghi"]);
//!
//! model.apply_edits(inverse).unwrap();
//! assert_eq!(model.value(), "abc\ndef");
//! ```
//!
//! ## Undo / Redo
//!
//! ```rust
//! use text_model::{EditOperation, Position, TextModel};
//!
//! let mut model = TextModel::new("hello");
//! model
//!     .push_edit_operations(None, vec![EditOperation::insert(Position::new(1, 6), " world")], |_| None)
//!     .unwrap();
//! assert_eq!(model.value(), "hello world");
//!
//! model.undo().unwrap();
//! assert_eq!(model.value(), "hello");
//! model.redo().unwrap();
//! assert_eq!(model.value(), "hello world");
//! ```
//!
//! # Module Description
//!
//! - [`position`] - Positions and ranges
//! - [`text`] - Line splitting and UTF-16 column arithmetic
//! - [`line_ending`] - Line ending detection and preferences
//! - [`marker`] - Anchored positions
//! - [`line`] - Line storage and splice primitives
//! - [`operation`] - Edit operations, overlap checks, inverse computation, batch folding
//! - [`events`] - Change events and version stamping
//! - [`edit_stack`] - Undo/redo stack
//! - [`options`] - Model options
//! - [`error`] - Error types
//! - [`model`] - The text model

pub mod edit_stack;
pub mod error;
pub mod events;
pub mod line;
pub mod line_ending;
pub mod marker;
pub mod model;
pub mod operation;
pub mod options;
pub mod position;
pub mod text;

pub use edit_stack::UndoRedoResult;
pub use error::{ModelError, ModelResult};
pub use events::{
    ContentChange, ContentChangeCallback, ContentChangedBatch, RawContentChange,
    RawContentChangedEvent,
};
pub use line::{LineEdit, ModelLine};
pub use line_ending::{EolPreference, LineEnding};
pub use marker::{Marker, MarkerId};
pub use model::TextModel;
pub use operation::{DeltaEditOperation, EditOperation, ValidatedEditOperation};
pub use options::{DEFAULT_REDUCE_THRESHOLD, DEFAULT_UNDO_LIMIT, TextModelOptions};
pub use position::{Position, Range};
pub use text::LengthUnit;
