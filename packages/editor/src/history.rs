//! # Undo/Redo History
//!
//! Bounded, linear log of whole-tree snapshots.
//!
//! ## Design
//!
//! - Every committed edit appends a deep snapshot with a human-readable
//!   action label, for a history panel as much as for undo
//! - Committing after an undo truncates the redo tail (no branching)
//! - The log is bounded: the oldest entries are evicted from the front and
//!   the cursor shifted so the current position stays valid
//! - Snapshots are deep copies; later edits to the live tree never reach a
//!   stored entry

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use blockforge_model::Block;

pub const DEFAULT_MAX_HISTORY: usize = 100;

/// One point-in-time state of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub blocks: Vec<Block>,
    pub action: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone)]
pub struct History {
    items: Vec<HistoryItem>,
    index: usize,
    max_size: usize,
}

impl History {
    /// Seed the log with the given state as its single entry.
    pub fn new(blocks: &[Block], action: &str, max_size: usize) -> Self {
        Self {
            items: vec![snapshot(blocks, action)],
            index: 0,
            max_size: max_size.max(1),
        }
    }

    /// Record a new state, discarding any redo tail and evicting from the
    /// front once the bound is exceeded.
    pub fn commit(&mut self, blocks: &[Block], action: &str) {
        self.items.truncate(self.index + 1);
        self.items.push(snapshot(blocks, action));
        self.index = self.items.len() - 1;

        while self.items.len() > self.max_size {
            self.items.remove(0);
            self.index = self.index.saturating_sub(1);
        }
    }

    /// Step back one entry; returns the state to restore.
    pub fn undo(&mut self) -> Option<Vec<Block>> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.items[self.index].blocks.clone())
    }

    /// Step forward one entry; returns the state to restore.
    pub fn redo(&mut self) -> Option<Vec<Block>> {
        if self.index + 1 >= self.items.len() {
            return None;
        }
        self.index += 1;
        Some(self.items[self.index].blocks.clone())
    }

    /// Jump straight to entry `i` (history panel click).
    pub fn jump_to(&mut self, i: usize) -> Option<Vec<Block>> {
        if i >= self.items.len() {
            return None;
        }
        self.index = i;
        Some(self.items[i].blocks.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    /// Collapse to a single entry equal to the given state.
    pub fn clear(&mut self, blocks: &[Block]) {
        self.reset(blocks, "Reset History");
    }

    pub fn reset(&mut self, blocks: &[Block], action: &str) {
        self.items = vec![snapshot(blocks, action)];
        self.index = 0;
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &HistoryItem {
        &self.items[self.index]
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

fn snapshot(blocks: &[Block], action: &str) -> HistoryItem {
    HistoryItem {
        blocks: blocks.to_vec(),
        action: action.to_string(),
        timestamp: now_millis(),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
