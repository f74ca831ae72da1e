//! Canonical JSON import/export of a block forest.
//!
//! Export is read-only over the tree. Import is all-or-nothing: a malformed
//! payload yields a typed error and leaves nothing half-built, and every
//! imported node gets a fresh id so re-importing exported content never
//! collides with a live session.

use serde_json::Value;
use thiserror::Error;

use crate::block::Block;
use crate::id_generator::IdGenerator;
use crate::walk;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("invalid document JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid document structure: {0}")]
    InvalidStructure(String),
}

/// Serialize the forest to its canonical export shape.
///
/// Renderer props are passed through untouched except for a stray `id` key:
/// some inspector paths have historically leaked the node id into the props
/// bag, and the canonical form strips it.
pub fn export_blocks(blocks: &[Block]) -> Value {
    fn strip(value: &mut Value) {
        if let Value::Object(node) = value {
            let mut drop_props = false;
            if let Some(Value::Object(props)) = node.get_mut("props") {
                props.remove("id");
                drop_props = props.is_empty();
            }
            if drop_props {
                node.remove("props");
            }
            if let Some(Value::Array(children)) = node.get_mut("children") {
                for child in children {
                    strip(child);
                }
            }
        }
    }

    let mut value = serde_json::to_value(blocks).unwrap_or(Value::Array(Vec::new()));
    if let Value::Array(nodes) = &mut value {
        for node in nodes {
            strip(node);
        }
    }
    value
}

/// Parse an untrusted forest and regenerate every id recursively.
pub fn import_blocks(value: &Value, ids: &mut IdGenerator) -> Result<Vec<Block>, TransferError> {
    if !value.is_array() {
        return Err(TransferError::InvalidStructure(
            "expected a top-level array of blocks".to_string(),
        ));
    }

    let mut blocks: Vec<Block> = serde_json::from_value(value.clone())?;
    for block in &mut blocks {
        walk::regenerate_ids(block, ids);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, BlockTemplate};
    use serde_json::json;

    #[test]
    fn test_export_strips_stray_id_prop() {
        let mut ids = IdGenerator::new("doc");
        let mut block = BlockTemplate::new(BlockKind::Text)
            .with_prop("content", "hello")
            .instantiate(&mut ids);
        block
            .props
            .insert("id".to_string(), Value::String("leaked".to_string()));

        let value = export_blocks(&[block]);
        let props = &value[0]["props"];
        assert_eq!(props["content"], "hello");
        assert!(props.get("id").is_none());
    }

    #[test]
    fn test_round_trip_regenerates_ids() {
        let mut ids = IdGenerator::new("doc");
        let forest = vec![BlockTemplate::new(BlockKind::Section)
            .with_child(BlockTemplate::new(BlockKind::Text))
            .instantiate(&mut ids)];
        let original_ids = walk::collect_ids(&forest);

        let exported = export_blocks(&forest);
        let imported = import_blocks(&exported, &mut ids).unwrap();

        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].kind, BlockKind::Section);
        assert_eq!(imported[0].children[0].kind, BlockKind::Text);
        for id in walk::collect_ids(&imported) {
            assert!(!original_ids.contains(&id), "imported ids must be fresh");
        }
    }

    #[test]
    fn test_import_accepts_missing_ids_and_children() {
        let mut ids = IdGenerator::new("doc");
        let value = json!([
            { "type": "section", "children": [ { "type": "text" } ] },
            { "type": "image" }
        ]);

        let imported = import_blocks(&value, &mut ids).unwrap();
        assert_eq!(imported.len(), 2);
        assert!(!imported[0].id.is_empty());
        assert!(!imported[0].children[0].id.is_empty());
    }

    #[test]
    fn test_import_rejects_non_array() {
        let mut ids = IdGenerator::new("doc");
        let err = import_blocks(&json!({ "type": "section" }), &mut ids).unwrap_err();
        assert!(matches!(err, TransferError::InvalidStructure(_)));
    }

    #[test]
    fn test_import_rejects_unknown_kind() {
        let mut ids = IdGenerator::new("doc");
        let err = import_blocks(&json!([{ "type": "hologram" }]), &mut ids).unwrap_err();
        assert!(matches!(err, TransferError::Parse(_)));
    }
}
