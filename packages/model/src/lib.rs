//! # Blockforge Model
//!
//! The document tree of a block-based page: typed blocks carrying opaque
//! renderer props, nested into a strict forest.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ model: Block tree + ids + derived index     │
//! │  - BlockKind / Block / BlockTemplate        │
//! │  - seeded sequential id generator           │
//! │  - tree combinators (find/path/remove/walk) │
//! │  - BlockIndex (id -> path, id -> parent)    │
//! │  - canonical JSON import/export             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: mutations + history + selection     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **The tree is the source of truth**: the index is a derived view,
//!    rebuilt in full after every commit.
//! 2. **Ids are engine-owned**: a document's generator never reuses an id;
//!    foreign content (paste, import) gets fresh ids on entry.
//! 3. **Props are opaque**: the engine shallow-merges and otherwise never
//!    looks inside a renderer's prop bag.

pub mod block;
pub mod id_generator;
pub mod index;
pub mod transfer;
pub mod walk;

pub use block::{Block, BlockKind, BlockTemplate};
pub use id_generator::{doc_seed, IdGenerator};
pub use index::BlockIndex;
pub use transfer::{export_blocks, import_blocks, TransferError};
