//! Durable document state.
//!
//! Only the committed tree, the template library, the history bound and the
//! id generator survive a reload; live history does not, so a restored
//! editor starts from a single "Load Canvas" entry. A save always works on a
//! deep copy taken at call time; overlapping fire-and-forget saves are fine,
//! the last committed copy wins.

use std::path::Path;

use serde::{Deserialize, Serialize};

use blockforge_model::{Block, IdGenerator, TransferError};

use crate::errors::EditorError;
use crate::library::TemplateLibrary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub library: TemplateLibrary,
    pub max_history_size: usize,
    /// Carrying the generator keeps restored sessions minting unique ids.
    pub ids: IdGenerator,
}

impl PersistedDocument {
    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let data = std::fs::read_to_string(path)?;
        let doc = serde_json::from_str(&data).map_err(TransferError::from)?;
        Ok(doc)
    }

    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        let data = serde_json::to_string_pretty(self).map_err(TransferError::from)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}
