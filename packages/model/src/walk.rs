//! Tree combinators shared by every mutation.
//!
//! All structural operations go through these walkers instead of re-deriving
//! the recursion per call site. Searches cover every branch of the forest,
//! not just the root level.

use crate::block::Block;
use crate::id_generator::IdGenerator;

/// Find a block by id anywhere in the forest.
pub fn find_block<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_block(&block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable variant of [`find_block`].
pub fn find_block_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Child-index path from the root sequence to the block with `id`.
pub fn find_path(blocks: &[Block], id: &str) -> Option<Vec<usize>> {
    fn search(blocks: &[Block], id: &str, path: &mut Vec<usize>) -> bool {
        for (i, block) in blocks.iter().enumerate() {
            path.push(i);
            if block.id == id || search(&block.children, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    search(blocks, id, &mut path).then_some(path)
}

/// Resolve a child-index path produced by [`find_path`].
pub fn node_at_path<'a>(blocks: &'a [Block], path: &[usize]) -> Option<&'a Block> {
    let (&first, rest) = path.split_first()?;
    let mut current = blocks.get(first)?;
    for &i in rest {
        current = current.children.get(i)?;
    }
    Some(current)
}

/// Detach the subtree rooted at `id` from wherever it lives in the forest.
pub fn remove_block(blocks: &mut Vec<Block>, id: &str) -> Option<Block> {
    if let Some(pos) = blocks.iter().position(|b| b.id == id) {
        return Some(blocks.remove(pos));
    }
    for block in blocks {
        if let Some(removed) = remove_block(&mut block.children, id) {
            return Some(removed);
        }
    }
    None
}

/// Preorder traversal; the callback receives each block and its parent's id.
pub fn walk<'a>(blocks: &'a [Block], f: &mut impl FnMut(&'a Block, Option<&'a str>)) {
    fn visit<'a>(
        blocks: &'a [Block],
        parent: Option<&'a str>,
        f: &mut impl FnMut(&'a Block, Option<&'a str>),
    ) {
        for block in blocks {
            f(block, parent);
            visit(&block.children, Some(&block.id), f);
        }
    }
    visit(blocks, None, f);
}

/// Every id in the forest, in preorder.
pub fn collect_ids(blocks: &[Block]) -> Vec<String> {
    let mut ids = Vec::new();
    walk(blocks, &mut |block, _| ids.push(block.id.clone()));
    ids
}

/// Assign fresh ids to a whole subtree (paste, duplicate, import).
pub fn regenerate_ids(block: &mut Block, ids: &mut IdGenerator) {
    block.id = ids.new_id();
    for child in &mut block.children {
        regenerate_ids(child, ids);
    }
}
