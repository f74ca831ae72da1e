//! # Blockforge Editor
//!
//! The document/editing engine of the page builder.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Block tree + derived index           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Editor owns tree+index+history+     │
//! │         selection+clipboard                 │
//! │  - add/update/delete/move/duplicate         │
//! │  - copy/cut/paste, grid placement           │
//! │  - bounded snapshot undo/redo               │
//! │  - bulk load, JSON import/export,           │
//! │    durable persistence snapshot             │
//! └─────────────────────────────────────────────┘
//!                     ↑
//! ┌─────────────────────────────────────────────┐
//! │ dnd: DropPlan (one mutation per drag-end)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **One owner**: callers hold an [`Editor`] and go through its operation
//!    surface; tree, index, history and selection are never reachable for
//!    direct mutation.
//! 2. **Commit is atomic**: every successful structural edit rebuilds the
//!    index, prunes the selection and pushes one labeled snapshot before any
//!    reader sees the new tree.
//! 3. **Stale references are no-ops**: an unknown id is a returned
//!    [`MutationError`], never a panic; the UI stays usable after a queued
//!    action races a deletion.
//! 4. **Single writer**: operations run to completion on the calling thread;
//!    saves work on deep copies and never block edits.

mod editor;
mod errors;
mod history;
mod library;
mod persist;
mod selection;

pub use editor::{Editor, EditorOptions, EditorSnapshot};
pub use errors::{EditorError, MutationError};
pub use history::{History, HistoryItem, DEFAULT_MAX_HISTORY};
pub use library::{NamedTemplate, TemplateLibrary};
pub use persist::PersistedDocument;
pub use selection::Selection;

// Re-export the pieces callers need alongside the engine
pub use blockforge_dnd::{classify_drop, plan_drop, DragSource, DropPlan, DropTarget, Placement, TargetRect};
pub use blockforge_model::{Block, BlockIndex, BlockKind, BlockTemplate};
