//! # Blockforge DnD
//!
//! Drop resolution for drag gestures over the block tree.
//!
//! ```text
//! drag-over tick                      drag-end
//!      │                                 │
//!      ▼                                 ▼
//! classify_drop ──► Placement      plan_drop ──► DropPlan
//!      │            (highlight)         │
//!      └── same pure function ──────────┘
//! ```
//!
//! Everything here is read-only over the tree: intermediate drag-over
//! processing only computes a classification, so an aborted drag never needs
//! a rollback. The engine consumes the final [`DropPlan`] as one mutation.

pub mod classify;
pub mod geometry;
pub mod plan;

pub use classify::{classify_drop, edge_threshold, Placement};
pub use geometry::TargetRect;
pub use plan::{plan_drop, DragSource, DropPlan, DropTarget};
