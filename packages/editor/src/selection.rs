//! Selection bookkeeping: an ordered id set with single/multi semantics.
//!
//! Selection is independent of the tree but never outlives it; the engine
//! prunes vanished ids on every commit and restore.

use blockforge_model::BlockIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    /// Click semantics: `None` clears; single mode replaces; multi mode
    /// toggles membership (set semantics, re-added ids go to the end).
    pub fn select(&mut self, id: Option<&str>, multi: bool) {
        match id {
            None => self.clear(),
            Some(id) if multi => self.toggle(id),
            Some(id) => self.set_only(id),
        }
    }

    pub fn set_only(&mut self, id: &str) {
        self.ids.clear();
        self.ids.push(id.to_string());
    }

    /// Add to the current selection without replacing it.
    pub fn push(&mut self, id: &str) {
        if !self.contains(id) {
            self.ids.push(id.to_string());
        }
    }

    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that are no longer present in the committed tree.
    pub fn retain_present(&mut self, index: &BlockIndex) {
        self.ids.retain(|id| index.contains(id));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
