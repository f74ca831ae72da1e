//! Translate a resolved drop into exactly one mutation.
//!
//! Planning is read-only over the tree: drag-over ticks call this freely for
//! preview, and an aborted drag leaves nothing to roll back. The plan folds
//! in the container check, the grid-cell special case, the same-parent
//! index-shift rule and the self-drop no-op, so the engine applies it
//! without re-deriving any geometry.

use serde::{Deserialize, Serialize};

use blockforge_model::{Block, BlockIndex};

use crate::classify::{classify_drop, Placement};
use crate::geometry::TargetRect;

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource<'a> {
    /// A block already in the tree, by id.
    Existing(&'a str),
    /// A palette item; the caller supplies the template at commit time.
    New,
}

/// The candidate under the pointer, as reported by the drag sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropTarget<'a> {
    /// Explicit insertion-point affordance with a pre-known slot.
    Zone {
        parent_id: Option<&'a str>,
        index: usize,
    },
    /// A live block; placement is resolved from pointer geometry.
    Block { id: &'a str, rect: TargetRect },
    /// A fixed cell of a grid container.
    GridCell { grid_id: &'a str, cell: usize },
}

/// The single mutation a finished drag turns into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum DropPlan {
    Insert {
        parent_id: Option<String>,
        index: usize,
    },
    Move {
        id: String,
        parent_id: Option<String>,
        index: usize,
    },
    PlaceInGrid {
        grid_id: String,
        cell: usize,
    },
    MoveToGrid {
        id: String,
        grid_id: String,
        cell: usize,
    },
    /// Self-drop, occupied cell, stale target: commit nothing.
    NoOp,
}

/// True if `id` equals `root_id` or sits anywhere inside its subtree.
fn within_subtree(index: &BlockIndex, root_id: &str, id: &str) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        if node == root_id {
            return true;
        }
        current = index.parent_of(node).flatten();
    }
    false
}

/// Sibling move with the list-shift rule applied.
///
/// Removing the node first shifts every later sibling down by one, so a
/// same-parent move to a later slot re-inserts at `raw - 1`. A move that
/// lands back on its own slot is a no-op, not a redundant edit.
fn plan_sibling_move(
    index: &BlockIndex,
    src: &str,
    parent_id: Option<&str>,
    raw_index: usize,
) -> DropPlan {
    let Some(orig_parent) = index.parent_of(src) else {
        return DropPlan::NoOp;
    };
    let Some(orig_pos) = index.position_of(src) else {
        return DropPlan::NoOp;
    };

    let same_parent = orig_parent == parent_id;
    let target_index = if same_parent && orig_pos < raw_index {
        raw_index - 1
    } else {
        raw_index
    };

    if same_parent && target_index == orig_pos {
        return DropPlan::NoOp;
    }

    DropPlan::Move {
        id: src.to_string(),
        parent_id: parent_id.map(str::to_string),
        index: target_index,
    }
}

fn first_empty_cell(grid: &Block) -> Option<usize> {
    grid.children.iter().position(Block::is_empty_slot)
}

/// Resolve a drop into the one mutation it stands for.
///
/// `pointer_y` only matters for [`DropTarget::Block`]; zones and grid cells
/// carry their slot explicitly.
pub fn plan_drop(
    source: DragSource<'_>,
    target: DropTarget<'_>,
    pointer_y: f64,
    blocks: &[Block],
    index: &BlockIndex,
) -> DropPlan {
    if let DragSource::Existing(src) = source {
        if !index.contains(src) {
            return DropPlan::NoOp;
        }
    }

    match target {
        DropTarget::Zone { parent_id, index: at } => match source {
            DragSource::New => DropPlan::Insert {
                parent_id: parent_id.map(str::to_string),
                index: at,
            },
            DragSource::Existing(src) => {
                if parent_id.is_some_and(|pid| within_subtree(index, src, pid)) {
                    return DropPlan::NoOp;
                }
                plan_sibling_move(index, src, parent_id, at)
            }
        },

        DropTarget::Block { id, rect } => {
            let Some(target_block) = index.node(blocks, id) else {
                return DropPlan::NoOp;
            };
            if let DragSource::Existing(src) = source {
                if within_subtree(index, src, id) {
                    return DropPlan::NoOp;
                }
            }

            match classify_drop(pointer_y, rect, target_block.kind.is_container()) {
                Placement::Inside if target_block.kind.is_grid() => {
                    let Some(cell) = first_empty_cell(target_block) else {
                        return DropPlan::NoOp;
                    };
                    grid_plan(source, id, cell)
                }
                Placement::Inside => {
                    let append_at = target_block.children.len();
                    match source {
                        DragSource::New => DropPlan::Insert {
                            parent_id: Some(id.to_string()),
                            index: append_at,
                        },
                        DragSource::Existing(src) => {
                            plan_sibling_move(index, src, Some(id), append_at)
                        }
                    }
                }
                placement => {
                    let Some(parent_id) = index.parent_of(id) else {
                        return DropPlan::NoOp;
                    };
                    let Some(pos) = index.position_of(id) else {
                        return DropPlan::NoOp;
                    };
                    let raw = if placement == Placement::After { pos + 1 } else { pos };
                    match source {
                        DragSource::New => DropPlan::Insert {
                            parent_id: parent_id.map(str::to_string),
                            index: raw,
                        },
                        DragSource::Existing(src) => {
                            plan_sibling_move(index, src, parent_id, raw)
                        }
                    }
                }
            }
        }

        DropTarget::GridCell { grid_id, cell } => {
            let Some(grid) = index.node(blocks, grid_id) else {
                return DropPlan::NoOp;
            };
            if !grid.kind.is_grid() {
                return DropPlan::NoOp;
            }
            if let DragSource::Existing(src) = source {
                if within_subtree(index, src, grid_id) {
                    return DropPlan::NoOp;
                }
            }
            // An occupied cell is a disabled target.
            if let Some(occupant) = grid.children.get(cell) {
                if !occupant.is_empty_slot() {
                    return DropPlan::NoOp;
                }
            }
            grid_plan(source, grid_id, cell)
        }
    }
}

fn grid_plan(source: DragSource<'_>, grid_id: &str, cell: usize) -> DropPlan {
    match source {
        DragSource::New => DropPlan::PlaceInGrid {
            grid_id: grid_id.to_string(),
            cell,
        },
        DragSource::Existing(src) => DropPlan::MoveToGrid {
            id: src.to_string(),
            grid_id: grid_id.to_string(),
            cell,
        },
    }
}
