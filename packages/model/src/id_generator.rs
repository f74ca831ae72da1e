use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Derive a stable document seed from a document name using CRC32
pub fn doc_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for blocks within a document
///
/// Ids have the form `<seed>-<n>`. A generator never hands out the same id
/// twice; content arriving from outside (paste, import) gets its ids
/// regenerated through the owning document's generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_name: &str) -> Self {
        Self {
            seed: doc_seed(document_name),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
