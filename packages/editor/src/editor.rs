//! # Editor Engine
//!
//! The one owner of the document tree and everything derived from it.
//!
//! Every structural operation follows the same shape: validate references
//! against the current index, mutate the tree through the shared walkers,
//! then commit (rebuild the index, prune the selection, push one labeled
//! history snapshot). Readers only ever observe committed state, so the
//! tree, index and history can never disagree.

use serde_json::{Map, Value};

use blockforge_dnd::DropPlan;
use blockforge_model::{
    export_blocks, import_blocks, walk, Block, BlockIndex, BlockTemplate, IdGenerator,
    TransferError,
};

use crate::errors::{EditorError, MutationError};
use crate::history::{History, HistoryItem, DEFAULT_MAX_HISTORY};
use crate::library::TemplateLibrary;
use crate::persist::PersistedDocument;
use crate::selection::Selection;

#[derive(Debug, Clone)]
pub struct EditorOptions {
    /// Seeds the id generator; two documents with different names never
    /// mint the same id.
    pub document_name: String,
    pub max_history_size: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            document_name: "untitled".to_string(),
            max_history_size: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Read-only view handed to the renderer and the history/layers panels.
#[derive(Debug, Clone, Copy)]
pub struct EditorSnapshot<'a> {
    pub blocks: &'a [Block],
    pub selected_ids: &'a [String],
    pub history: &'a [HistoryItem],
    pub history_index: usize,
}

/// Where a non-root insertion puts an out-of-range index.
enum InsertMode {
    /// Pad with placeholder slots up to the index (add/paste into
    /// fixed-slot containers).
    Pad,
    /// Clamp to the end of the child list (moves).
    Clamp,
}

pub struct Editor {
    blocks: Vec<Block>,
    index: BlockIndex,
    selection: Selection,
    history: History,
    clipboard: Option<Block>,
    library: TemplateLibrary,
    ids: IdGenerator,
}

impl Editor {
    pub fn new(options: EditorOptions) -> Self {
        let blocks = Vec::new();
        let index = BlockIndex::build(&blocks);
        let history = History::new(&blocks, "Initial", options.max_history_size);
        Self {
            blocks,
            index,
            selection: Selection::default(),
            history,
            clipboard: None,
            library: TemplateLibrary::default(),
            ids: IdGenerator::new(&options.document_name),
        }
    }

    // ---- read surface -----------------------------------------------------

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    pub fn selected_ids(&self) -> &[String] {
        self.selection.ids()
    }

    pub fn history(&self) -> &[HistoryItem] {
        self.history.items()
    }

    pub fn history_index(&self) -> usize {
        self.history.index()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clipboard(&self) -> Option<&Block> {
        self.clipboard.as_ref()
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut TemplateLibrary {
        &mut self.library
    }

    pub fn snapshot(&self) -> EditorSnapshot<'_> {
        EditorSnapshot {
            blocks: &self.blocks,
            selected_ids: self.selection.ids(),
            history: self.history.items(),
            history_index: self.history.index(),
        }
    }

    // ---- mutations --------------------------------------------------------

    /// Instantiate a template (fresh ids, depth-first) and insert it at the
    /// root or under `parent_id`. The new block becomes the sole selection.
    pub fn add_block(
        &mut self,
        template: &BlockTemplate,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<String, MutationError> {
        if let Some(pid) = parent_id {
            if !self.index.contains(pid) {
                return Err(MutationError::ParentNotFound(pid.to_string()));
            }
        }
        self.check_grid_insert(parent_id, index, None)?;

        let block = template.instantiate(&mut self.ids);
        let id = block.id.clone();
        let label = format!("Add {}", block.kind);

        self.insert_block(block, parent_id, index, InsertMode::Pad)?;
        self.selection.set_only(&id);
        self.commit(&label);
        Ok(id)
    }

    /// Shallow-merge `patch` into the block's props. Children are untouched.
    pub fn update_block(
        &mut self,
        id: &str,
        patch: &Map<String, Value>,
    ) -> Result<(), MutationError> {
        let Some(block) = walk::find_block_mut(&mut self.blocks, id) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };

        for (key, value) in patch {
            block.props.insert(key.clone(), value.clone());
        }
        let label = format!("Update {}", block.kind);
        self.commit(&label);
        Ok(())
    }

    /// Remove the block and its entire subtree from wherever it lives.
    pub fn delete_block(&mut self, id: &str) -> Result<(), MutationError> {
        let Some(kind) = self.index.node(&self.blocks, id).map(|b| b.kind) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };

        let _removed = self.detach(id);
        self.commit(&format!("Delete {kind}"));
        Ok(())
    }

    /// Re-home the subtree (ids preserved) at `index` under `new_parent_id`,
    /// or at the root when `None`. The index is interpreted against the
    /// child list after removal. A vanished source is a silent no-op so a
    /// queued drag cannot fail after a racing delete.
    pub fn move_block(
        &mut self,
        id: &str,
        new_parent_id: Option<&str>,
        index: usize,
    ) -> Result<(), MutationError> {
        if !self.index.contains(id) {
            tracing::warn!(%id, "move source vanished, skipping");
            return Ok(());
        }
        if let Some(pid) = new_parent_id {
            if !self.index.contains(pid) {
                return Err(MutationError::ParentNotFound(pid.to_string()));
            }
            if self.is_within_subtree(id, pid) {
                return Err(MutationError::CycleDetected);
            }
        }
        self.check_grid_insert(new_parent_id, Some(index), Some(id))?;

        let old_parent = self.index.parent_of(id).flatten().map(str::to_string);
        let Some(old_pos) = self.index.position_of(id) else {
            return Ok(());
        };
        let same_parent = old_parent.as_deref() == new_parent_id;

        if same_parent {
            if let Some((count, is_grid)) = self.sibling_count(new_parent_id) {
                let post_len = if is_grid { count } else { count.saturating_sub(1) };
                if index.min(post_len) == old_pos {
                    // landing on its own slot: no edit, no history entry
                    return Ok(());
                }
            }
        }

        let Some(kind) = self.index.node(&self.blocks, id).map(|b| b.kind) else {
            return Ok(());
        };
        let Some(block) = self.detach(id) else {
            return Ok(());
        };
        self.insert_block(block, new_parent_id, Some(index), InsertMode::Clamp)?;
        self.commit(&format!("Move {kind}"));
        Ok(())
    }

    /// Deep-clone the subtree with all ids regenerated and insert the clone
    /// right after the original. The clone joins the current selection.
    pub fn duplicate_block(&mut self, id: &str) -> Result<String, MutationError> {
        let Some(original) = self.index.node(&self.blocks, id) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };
        let mut clone = original.clone();
        let kind = clone.kind;
        walk::regenerate_ids(&mut clone, &mut self.ids);
        let clone_id = clone.id.clone();

        let parent_id = self.index.parent_of(id).flatten().map(str::to_string);
        let Some(pos) = self.index.position_of(id) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };

        match parent_id.as_deref() {
            None => self.blocks.insert(pos + 1, clone),
            Some(pid) => {
                let Some(parent) = walk::find_block_mut(&mut self.blocks, pid) else {
                    return Err(MutationError::ParentNotFound(pid.to_string()));
                };
                if parent.kind.is_grid() {
                    // fixed slots: the clone takes the first free cell
                    match parent.children.iter().position(Block::is_empty_slot) {
                        Some(slot) => parent.children[slot] = clone,
                        None => parent.children.push(clone),
                    }
                } else {
                    parent.children.insert(pos + 1, clone);
                }
            }
        }

        self.selection.push(&clone_id);
        self.commit(&format!("Duplicate {kind}"));
        Ok(clone_id)
    }

    /// Swap the block with its previous sibling; no-op when already first.
    pub fn move_block_up(&mut self, id: &str) -> Result<(), MutationError> {
        self.swap_with_sibling(id, -1)
    }

    /// Swap the block with its next sibling; no-op when already last.
    pub fn move_block_down(&mut self, id: &str) -> Result<(), MutationError> {
        self.swap_with_sibling(id, 1)
    }

    /// Deep-clone the subtree into the clipboard, ids and all. The clipboard
    /// copy has its own lifetime; later edits never reach it.
    pub fn copy_block(&mut self, id: &str) -> Result<(), MutationError> {
        let Some(block) = self.index.node(&self.blocks, id) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };
        self.clipboard = Some(block.clone());
        Ok(())
    }

    pub fn cut_block(&mut self, id: &str) -> Result<(), MutationError> {
        let Some(kind) = self.index.node(&self.blocks, id).map(|b| b.kind) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };
        self.copy_block(id)?;
        let _removed = self.detach(id);
        self.commit(&format!("Cut {kind}"));
        Ok(())
    }

    /// Insert a copy of the clipboard with every id regenerated, selecting
    /// the pasted root. An empty clipboard pastes nothing.
    pub fn paste_block(
        &mut self,
        parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<Option<String>, MutationError> {
        let Some(content) = self.clipboard.clone() else {
            return Ok(None);
        };
        if let Some(pid) = parent_id {
            if !self.index.contains(pid) {
                return Err(MutationError::ParentNotFound(pid.to_string()));
            }
        }
        self.check_grid_insert(parent_id, index, None)?;

        let mut block = content;
        walk::regenerate_ids(&mut block, &mut self.ids);
        let id = block.id.clone();
        let label = format!("Paste {}", block.kind);

        self.insert_block(block, parent_id, index, InsertMode::Pad)?;
        self.selection.set_only(&id);
        self.commit(&label);
        Ok(Some(id))
    }

    /// Instantiate a template straight into a grid cell.
    pub fn place_in_grid(
        &mut self,
        template: &BlockTemplate,
        grid_id: &str,
        cell: usize,
    ) -> Result<String, MutationError> {
        self.check_grid_cell(grid_id, cell, None)?;

        let block = template.instantiate(&mut self.ids);
        let id = block.id.clone();
        let label = format!("Add {}", block.kind);

        self.place_block_in_grid(block, grid_id, cell)?;
        self.selection.set_only(&id);
        self.commit(&label);
        Ok(id)
    }

    /// Move an existing block into a grid cell. The cell must be free; the
    /// vacated position (grid or not) keeps its siblings stable.
    pub fn move_to_grid(
        &mut self,
        id: &str,
        grid_id: &str,
        cell: usize,
    ) -> Result<(), MutationError> {
        if !self.index.contains(id) {
            tracing::warn!(%id, "move source vanished, skipping");
            return Ok(());
        }
        if self.is_within_subtree(id, grid_id) {
            return Err(MutationError::CycleDetected);
        }
        if self.index.parent_of(id).flatten() == Some(grid_id)
            && self.index.position_of(id) == Some(cell)
        {
            return Ok(());
        }
        self.check_grid_cell(grid_id, cell, Some(id))?;

        let Some(kind) = self.index.node(&self.blocks, id).map(|b| b.kind) else {
            return Ok(());
        };
        let Some(block) = self.detach(id) else {
            return Ok(());
        };
        self.place_block_in_grid(block, grid_id, cell)?;
        self.commit(&format!("Move {kind}"));
        Ok(())
    }

    /// Apply the single mutation a finished drag resolved to. `template`
    /// backs palette drops; `DropPlan::NoOp` commits nothing.
    pub fn apply_drop(
        &mut self,
        plan: &DropPlan,
        template: Option<&BlockTemplate>,
    ) -> Result<Option<String>, MutationError> {
        match plan {
            DropPlan::NoOp => Ok(None),
            DropPlan::Insert { parent_id, index } => match template {
                Some(template) => self
                    .add_block(template, parent_id.as_deref(), Some(*index))
                    .map(Some),
                None => {
                    tracing::warn!("insert drop without a template, skipping");
                    Ok(None)
                }
            },
            DropPlan::Move {
                id,
                parent_id,
                index,
            } => self
                .move_block(id, parent_id.as_deref(), *index)
                .map(|_| None),
            DropPlan::PlaceInGrid { grid_id, cell } => match template {
                Some(template) => self.place_in_grid(template, grid_id, *cell).map(Some),
                None => {
                    tracing::warn!("grid drop without a template, skipping");
                    Ok(None)
                }
            },
            DropPlan::MoveToGrid { id, grid_id, cell } => {
                self.move_to_grid(id, grid_id, *cell).map(|_| None)
            }
        }
    }

    // ---- selection --------------------------------------------------------

    /// Click selection; `None` clears, multi toggles. Stale ids are ignored
    /// so a queued click racing a delete cannot resurrect one. Selection
    /// changes never create history entries.
    pub fn select_block(&mut self, id: Option<&str>, multi: bool) {
        let id = id.filter(|id| self.index.contains(id));
        self.selection.select(id, multi);
    }

    // ---- history ----------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(blocks) => {
                self.restore(blocks);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(blocks) => {
                self.restore(blocks);
                true
            }
            None => false,
        }
    }

    pub fn jump_to_history(&mut self, i: usize) -> bool {
        match self.history.jump_to(i) {
            Some(blocks) => {
                self.restore(blocks);
                true
            }
            None => false,
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear(&self.blocks);
    }

    // ---- bulk load / export / persistence ---------------------------------

    /// Replace the whole tree as one undoable edit.
    pub fn set_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.commit("Set Blocks");
    }

    /// Replace the whole tree and start over: selection cleared, history
    /// reseeded to a single entry.
    pub fn load_canvas(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.index = BlockIndex::build(&self.blocks);
        self.selection.clear();
        self.history.reset(&self.blocks, "Load Canvas");
        tracing::debug!(nodes = self.index.len(), "canvas loaded");
    }

    /// Parse and import an external JSON forest, then load it. All-or-nothing:
    /// a malformed payload leaves the live document untouched.
    pub fn load_canvas_json(&mut self, json: &str) -> Result<(), EditorError> {
        let value: Value = serde_json::from_str(json).map_err(TransferError::from)?;
        let blocks = import_blocks(&value, &mut self.ids)?;
        self.load_canvas(blocks);
        Ok(())
    }

    /// Canonical export of the current tree; read-only.
    pub fn export_json(&self) -> Value {
        export_blocks(&self.blocks)
    }

    /// Deep copy of the durable state, taken at call time. Safe to hand to a
    /// fire-and-forget save task; later edits never reach it.
    pub fn to_persisted(&self) -> PersistedDocument {
        PersistedDocument {
            blocks: self.blocks.clone(),
            library: self.library.clone(),
            max_history_size: self.history.max_size(),
            ids: self.ids.clone(),
        }
    }

    /// Rebuild an editor from a durable snapshot. Live history is not
    /// durable: the restored tree becomes the single history entry.
    pub fn from_persisted(doc: PersistedDocument) -> Self {
        let index = BlockIndex::build(&doc.blocks);
        let history = History::new(&doc.blocks, "Load Canvas", doc.max_history_size);
        Self {
            blocks: doc.blocks,
            index,
            selection: Selection::default(),
            history,
            clipboard: None,
            library: doc.library,
            ids: doc.ids,
        }
    }

    // ---- internals --------------------------------------------------------

    /// Commit the mutated tree: rebuild the index, prune the selection, push
    /// one labeled snapshot. Nothing observes the tree between mutation and
    /// commit.
    fn commit(&mut self, action: &str) {
        self.index = BlockIndex::build(&self.blocks);
        self.selection.retain_present(&self.index);
        self.history.commit(&self.blocks, action);
        tracing::debug!(action, nodes = self.index.len(), "commit");
    }

    fn restore(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
        self.index = BlockIndex::build(&self.blocks);
        self.selection.retain_present(&self.index);
    }

    /// True if `id` equals `root_id` or sits inside its subtree.
    fn is_within_subtree(&self, root_id: &str, id: &str) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == root_id {
                return true;
            }
            current = self.index.parent_of(node).flatten();
        }
        false
    }

    fn sibling_count(&self, parent_id: Option<&str>) -> Option<(usize, bool)> {
        match parent_id {
            None => Some((self.blocks.len(), false)),
            Some(pid) => self
                .index
                .node(&self.blocks, pid)
                .map(|p| (p.children.len(), p.kind.is_grid())),
        }
    }

    /// Detach the subtree rooted at `id`. Inside a grid the vacated slot is
    /// back-filled with a placeholder so later cells keep their position.
    fn detach(&mut self, id: &str) -> Option<Block> {
        let parent_id = self.index.parent_of(id)?.map(str::to_string);
        let pos = self.index.position_of(id)?;

        match parent_id {
            None => Some(self.blocks.remove(pos)),
            Some(pid) => {
                let parent = walk::find_block_mut(&mut self.blocks, &pid)?;
                if parent.kind.is_grid() {
                    let slot = Block::empty_slot(&mut self.ids);
                    Some(std::mem::replace(&mut parent.children[pos], slot))
                } else {
                    Some(parent.children.remove(pos))
                }
            }
        }
    }

    fn insert_block(
        &mut self,
        block: Block,
        parent_id: Option<&str>,
        index: Option<usize>,
        mode: InsertMode,
    ) -> Result<(), MutationError> {
        match parent_id {
            None => {
                let at = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
                self.blocks.insert(at, block);
                Ok(())
            }
            Some(pid) => {
                let Some(parent) = walk::find_block_mut(&mut self.blocks, pid) else {
                    return Err(MutationError::ParentNotFound(pid.to_string()));
                };
                let len = parent.children.len();
                let at = index.unwrap_or(len);

                if at > len {
                    match mode {
                        InsertMode::Pad => {
                            while parent.children.len() < at {
                                parent.children.push(Block::empty_slot(&mut self.ids));
                            }
                            parent.children.push(block);
                        }
                        InsertMode::Clamp => parent.children.insert(len, block),
                    }
                } else if parent.kind.is_grid()
                    && parent.children.get(at).is_some_and(Block::is_empty_slot)
                {
                    // filling a fixed slot replaces its placeholder
                    parent.children[at] = block;
                } else {
                    parent.children.insert(at, block);
                }
                Ok(())
            }
        }
    }

    /// A grid cell named by an explicit insertion index must be free (or the
    /// moving block's own cell); non-grid parents accept any index.
    fn check_grid_insert(
        &self,
        parent_id: Option<&str>,
        index: Option<usize>,
        moving_id: Option<&str>,
    ) -> Result<(), MutationError> {
        let (Some(pid), Some(at)) = (parent_id, index) else {
            return Ok(());
        };
        let Some(parent) = self.index.node(&self.blocks, pid) else {
            return Ok(());
        };
        if !parent.kind.is_grid() {
            return Ok(());
        }
        match parent.children.get(at) {
            Some(occupant)
                if !occupant.is_empty_slot() && moving_id != Some(occupant.id.as_str()) =>
            {
                Err(MutationError::GridCellOccupied {
                    grid_id: pid.to_string(),
                    cell: at,
                })
            }
            _ => Ok(()),
        }
    }

    fn check_grid_cell(
        &self,
        grid_id: &str,
        cell: usize,
        moving_id: Option<&str>,
    ) -> Result<(), MutationError> {
        let Some(grid) = self.index.node(&self.blocks, grid_id) else {
            return Err(MutationError::ParentNotFound(grid_id.to_string()));
        };
        if !grid.kind.is_grid() {
            return Err(MutationError::NotAGrid(grid_id.to_string()));
        }
        if let Some(occupant) = grid.children.get(cell) {
            let is_self = moving_id.is_some_and(|id| id == occupant.id);
            if !occupant.is_empty_slot() && !is_self {
                return Err(MutationError::GridCellOccupied {
                    grid_id: grid_id.to_string(),
                    cell,
                });
            }
        }
        Ok(())
    }

    fn place_block_in_grid(
        &mut self,
        block: Block,
        grid_id: &str,
        cell: usize,
    ) -> Result<(), MutationError> {
        let Some(grid) = walk::find_block_mut(&mut self.blocks, grid_id) else {
            return Err(MutationError::ParentNotFound(grid_id.to_string()));
        };
        while grid.children.len() < cell {
            grid.children.push(Block::empty_slot(&mut self.ids));
        }
        if grid.children.len() == cell {
            grid.children.push(block);
        } else {
            grid.children[cell] = block;
        }
        Ok(())
    }

    fn swap_with_sibling(&mut self, id: &str, direction: isize) -> Result<(), MutationError> {
        let Some(kind) = self.index.node(&self.blocks, id).map(|b| b.kind) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };
        let parent_id = self.index.parent_of(id).flatten().map(str::to_string);
        let Some(pos) = self.index.position_of(id) else {
            return Err(MutationError::NodeNotFound(id.to_string()));
        };

        let siblings = match parent_id.as_deref() {
            None => &mut self.blocks,
            Some(pid) => match walk::find_block_mut(&mut self.blocks, pid) {
                Some(parent) => &mut parent.children,
                None => return Err(MutationError::ParentNotFound(pid.to_string())),
            },
        };

        let other = pos as isize + direction;
        if other < 0 || other as usize >= siblings.len() {
            // already at the boundary
            return Ok(());
        }
        siblings.swap(pos, other as usize);

        let label = if direction < 0 {
            format!("Move {kind} up")
        } else {
            format!("Move {kind} down")
        };
        self.commit(&label);
        Ok(())
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}
