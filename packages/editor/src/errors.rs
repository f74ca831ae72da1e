//! Error types for the editor
//!
//! A [`MutationError`] is a reported no-op: the operation returns it as a
//! value and the tree, index and history are exactly as they were. Stale ids
//! are normal during rapid editing (a queued action racing a deletion), so
//! nothing here ever panics.

use thiserror::Error;

use blockforge_model::TransferError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Block is not a grid: {0}")]
    NotAGrid(String),

    #[error("Grid cell {cell} of {grid_id} is occupied")]
    GridCellOccupied { grid_id: String, cell: usize },
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Import error: {0}")]
    Transfer(#[from] TransferError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
