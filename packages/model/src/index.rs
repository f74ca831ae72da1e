//! Derived lookup maps over the committed forest.
//!
//! The index is rebuilt in full after every mutation, never patched
//! incrementally. A stale index is a correctness bug; the rebuild is O(n)
//! per edit and edits are human-paced.

use std::collections::HashMap;

use crate::block::Block;
use crate::walk;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockIndex {
    /// id -> child-index path from the root sequence
    paths: HashMap<String, Vec<usize>>,
    /// id -> parent id, `None` for roots
    parents: HashMap<String, Option<String>>,
}

impl BlockIndex {
    /// Build both maps in one pass. Pure; the input forest is not touched.
    pub fn build(blocks: &[Block]) -> Self {
        fn visit(
            blocks: &[Block],
            parent: Option<&str>,
            prefix: &mut Vec<usize>,
            index: &mut BlockIndex,
        ) {
            for (i, block) in blocks.iter().enumerate() {
                prefix.push(i);
                index.paths.insert(block.id.clone(), prefix.clone());
                index
                    .parents
                    .insert(block.id.clone(), parent.map(str::to_string));
                visit(&block.children, Some(&block.id), prefix, index);
                prefix.pop();
            }
        }

        let mut index = Self::default();
        let mut prefix = Vec::new();
        visit(blocks, None, &mut prefix, &mut index);
        index
    }

    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    pub fn path(&self, id: &str) -> Option<&[usize]> {
        self.paths.get(id).map(Vec::as_slice)
    }

    /// Parent id of `id`; outer `None` means the id is unknown, inner `None`
    /// means the block is a root.
    pub fn parent_of(&self, id: &str) -> Option<Option<&str>> {
        self.parents.get(id).map(Option::as_deref)
    }

    /// Position of `id` within its parent's children (or the root sequence).
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.paths.get(id).and_then(|path| path.last().copied())
    }

    /// Resolve `id` to its node in the given forest.
    ///
    /// The forest must be the one this index was built from.
    pub fn node<'a>(&self, blocks: &'a [Block], id: &str) -> Option<&'a Block> {
        walk::node_at_path(blocks, self.paths.get(id)?)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
