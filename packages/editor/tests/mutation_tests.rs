//! Mutation operations against a live editor: structural edits, reference
//! errors, selection follow-on, and the grid special cases.

use blockforge_editor::{Editor, EditorOptions, MutationError};
use blockforge_model::{walk, BlockKind, BlockTemplate};
use serde_json::{json, Map};

fn editor() -> Editor {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Editor::new(EditorOptions {
        document_name: "mutation-tests".to_string(),
        ..EditorOptions::default()
    })
}

fn text() -> BlockTemplate {
    BlockTemplate::new(BlockKind::Text).with_prop("content", "hi")
}

fn patch(key: &str, value: serde_json::Value) -> Map<String, serde_json::Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

/// Every id in the tree appears in both maps, and the parent map mirrors the
/// actual structure.
fn assert_index_consistent(editor: &Editor) {
    let mut count = 0;
    walk::walk(editor.blocks(), &mut |block, parent| {
        count += 1;
        let resolved = editor
            .index()
            .node(editor.blocks(), &block.id)
            .unwrap_or_else(|| panic!("{} missing from index", block.id));
        assert_eq!(resolved.id, block.id);
        assert_eq!(editor.index().parent_of(&block.id), Some(parent));
    });
    assert_eq!(editor.index().len(), count);
}

#[test]
fn test_add_block_from_empty_tree() {
    // Scenario A
    let mut editor = editor();
    let id = editor.add_block(&text(), None, None).unwrap();

    assert_eq!(editor.blocks().len(), 1);
    assert_eq!(editor.selected_ids(), [id.clone()]);
    assert_eq!(editor.history().len(), 2);
    assert_eq!(editor.history_index(), 1);
    assert_eq!(editor.blocks()[0].props["content"], "hi");
    assert_index_consistent(&editor);
}

#[test]
fn test_add_block_into_parent() {
    // Scenario B
    let mut editor = editor();
    let section_id = editor
        .add_block(&BlockTemplate::new(BlockKind::Section), None, None)
        .unwrap();
    let child_id = editor.add_block(&text(), Some(&section_id), None).unwrap();

    let section = editor.index().node(editor.blocks(), &section_id).unwrap();
    assert_eq!(section.children.len(), 1);
    assert_eq!(
        editor.index().parent_of(&child_id),
        Some(Some(section_id.as_str()))
    );
    assert_index_consistent(&editor);
}

#[test]
fn test_add_block_unknown_parent_is_reported_noop() {
    let mut editor = editor();
    let before = editor.history().len();

    let err = editor.add_block(&text(), Some("ghost-1"), None).unwrap_err();

    assert_eq!(err, MutationError::ParentNotFound("ghost-1".to_string()));
    assert!(editor.blocks().is_empty());
    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_add_block_pads_fixed_slots() {
    let mut editor = editor();
    let section_id = editor
        .add_block(&BlockTemplate::new(BlockKind::Section), None, None)
        .unwrap();
    let child_id = editor.add_block(&text(), Some(&section_id), Some(3)).unwrap();

    let section = editor.index().node(editor.blocks(), &section_id).unwrap();
    assert_eq!(section.children.len(), 4);
    assert!(section.children[..3].iter().all(|c| c.is_empty_slot()));
    assert_eq!(section.children[3].id, child_id);
    assert_index_consistent(&editor);
}

#[test]
fn test_update_block_shallow_merges_props() {
    let mut editor = editor();
    let id = editor.add_block(&text(), None, None).unwrap();

    editor.update_block(&id, &patch("align", json!("center"))).unwrap();

    let block = &editor.blocks()[0];
    assert_eq!(block.props["content"], "hi");
    assert_eq!(block.props["align"], "center");

    let err = editor
        .update_block("ghost-2", &patch("x", json!(1)))
        .unwrap_err();
    assert_eq!(err, MutationError::NodeNotFound("ghost-2".to_string()));
}

#[test]
fn test_delete_block_cascades() {
    let mut editor = editor();
    let section_id = editor
        .add_block(
            &BlockTemplate::new(BlockKind::Section)
                .with_child(BlockTemplate::new(BlockKind::Row).with_child(text_template())),
            None,
            None,
        )
        .unwrap();
    let row_id = editor.blocks()[0].children[0].id.clone();
    let leaf_id = editor.blocks()[0].children[0].children[0].id.clone();

    editor.select_block(Some(&leaf_id), false);
    editor.select_block(Some(&row_id), true);
    editor.delete_block(&section_id).unwrap();

    assert!(editor.blocks().is_empty());
    assert!(editor.index().is_empty());
    assert!(editor.selected_ids().is_empty());
    assert!(!editor.index().contains(&row_id));
    assert!(!editor.index().contains(&leaf_id));
}

fn text_template() -> BlockTemplate {
    BlockTemplate::new(BlockKind::Text)
}

#[test]
fn test_delete_clears_selection() {
    // Scenario E
    let mut editor = editor();
    let id = editor.add_block(&text(), None, None).unwrap();
    editor.select_block(Some(&id), false);

    editor.delete_block(&id).unwrap();

    assert!(editor.selected_ids().is_empty());
}

#[test]
fn test_delete_unknown_id_is_reported_noop() {
    let mut editor = editor();
    editor.add_block(&text(), None, None).unwrap();
    let before = editor.history().len();

    let err = editor.delete_block("ghost-3").unwrap_err();

    assert_eq!(err, MutationError::NodeNotFound("ghost-3".to_string()));
    assert_eq!(editor.blocks().len(), 1);
    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_move_block_to_front_of_root() {
    // Scenario D
    let mut editor = editor();
    let a = editor.add_block(&text(), None, None).unwrap();
    let b = editor.add_block(&text(), None, None).unwrap();
    let c = editor.add_block(&text(), None, None).unwrap();

    editor.move_block(&c, None, 0).unwrap();

    let order: Vec<_> = editor.blocks().iter().map(|b| b.id.clone()).collect();
    assert_eq!(order, [c, a, b]);
    assert_index_consistent(&editor);
}

#[test]
fn test_move_block_reparents_preserving_ids() {
    let mut editor = editor();
    let section_id = editor
        .add_block(&BlockTemplate::new(BlockKind::Section), None, None)
        .unwrap();
    let leaf_id = editor.add_block(&text(), None, None).unwrap();
    let before: Vec<_> = walk::collect_ids(editor.blocks());

    editor.move_block(&leaf_id, Some(&section_id), 0).unwrap();

    // same ids, new structure
    let mut after = walk::collect_ids(editor.blocks());
    let mut expected = before;
    expected.sort();
    after.sort();
    assert_eq!(after, expected);
    assert_eq!(
        editor.index().parent_of(&leaf_id),
        Some(Some(section_id.as_str()))
    );
}

#[test]
fn test_move_unknown_source_is_silent_noop() {
    let mut editor = editor();
    editor.add_block(&text(), None, None).unwrap();
    let before = editor.history().len();

    editor.move_block("ghost-4", None, 0).unwrap();

    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_move_into_own_subtree_is_rejected() {
    let mut editor = editor();
    editor
        .add_block(
            &BlockTemplate::new(BlockKind::Section)
                .with_child(BlockTemplate::new(BlockKind::Row)),
            None,
            None,
        )
        .unwrap();
    let section_id = editor.blocks()[0].id.clone();
    let row_id = editor.blocks()[0].children[0].id.clone();
    let before = editor.history().len();

    let err = editor.move_block(&section_id, Some(&row_id), 0).unwrap_err();

    assert_eq!(err, MutationError::CycleDetected);
    assert_eq!(editor.blocks().len(), 1);
    assert_eq!(editor.history().len(), before);
    assert_index_consistent(&editor);
}

#[test]
fn test_move_to_same_slot_adds_no_history_entry() {
    let mut editor = editor();
    editor.add_block(&text(), None, None).unwrap();
    let b = editor.add_block(&text(), None, None).unwrap();
    let before = editor.history().len();

    // b sits at 1; both its own slot and the shifted-back raw slot are no-ops
    editor.move_block(&b, None, 1).unwrap();
    editor.move_block(&b, None, 2).unwrap();

    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_duplicate_inserts_after_original() {
    let mut editor = editor();
    let a = editor.add_block(&text(), None, None).unwrap();
    let b = editor.add_block(&text(), None, None).unwrap();
    editor.select_block(Some(&a), false);

    let clone_id = editor.duplicate_block(&a).unwrap();

    let order: Vec<_> = editor.blocks().iter().map(|b| b.id.clone()).collect();
    assert_eq!(order, [a.clone(), clone_id.clone(), b]);
    // clone joins the selection instead of replacing it
    assert_eq!(editor.selected_ids(), [a, clone_id]);
}

#[test]
fn test_duplicate_regenerates_every_id() {
    let mut editor = editor();
    editor
        .add_block(
            &BlockTemplate::new(BlockKind::Section)
                .with_child(BlockTemplate::new(BlockKind::Row).with_child(text_template())),
            None,
            None,
        )
        .unwrap();
    let section_id = editor.blocks()[0].id.clone();

    editor.duplicate_block(&section_id).unwrap();

    let ids = walk::collect_ids(editor.blocks());
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), 6);
    assert_eq!(deduped.len(), 6, "originals and clone share no id");
}

#[test]
fn test_move_up_down_and_boundaries() {
    let mut editor = editor();
    let a = editor.add_block(&text(), None, None).unwrap();
    let b = editor.add_block(&text(), None, None).unwrap();
    let history_before = editor.history().len();

    // boundary no-ops: a is first, b is last
    editor.move_block_up(&a).unwrap();
    editor.move_block_down(&b).unwrap();
    assert_eq!(editor.history().len(), history_before);

    editor.move_block_down(&a).unwrap();
    let order: Vec<_> = editor.blocks().iter().map(|b| b.id.clone()).collect();
    assert_eq!(order, [b.clone(), a.clone()]);

    editor.move_block_up(&a).unwrap();
    let order: Vec<_> = editor.blocks().iter().map(|b| b.id.clone()).collect();
    assert_eq!(order, [a, b]);
}

#[test]
fn test_copy_paste_regenerates_ids() {
    let mut editor = editor();
    let original = editor
        .add_block(
            &BlockTemplate::new(BlockKind::Section).with_child(text_template()),
            None,
            None,
        )
        .unwrap();

    editor.copy_block(&original).unwrap();
    let first = editor.paste_block(None, None).unwrap().unwrap();
    let second = editor.paste_block(None, None).unwrap().unwrap();

    assert_ne!(first, second);
    let ids = walk::collect_ids(editor.blocks());
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len(), "pasted subtrees never alias");
    assert_eq!(editor.selected_ids(), [second]);
}

#[test]
fn test_paste_with_empty_clipboard_is_noop() {
    let mut editor = editor();
    let before = editor.history().len();

    assert_eq!(editor.paste_block(None, None).unwrap(), None);
    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_cut_then_paste_moves_content() {
    let mut editor = editor();
    let id = editor.add_block(&text(), None, None).unwrap();

    editor.cut_block(&id).unwrap();
    assert!(editor.blocks().is_empty());
    assert!(editor.clipboard().is_some());

    let pasted = editor.paste_block(None, None).unwrap().unwrap();
    assert_ne!(pasted, id, "paste mints fresh ids even after cut");
    assert_eq!(editor.blocks().len(), 1);
}

#[test]
fn test_id_uniqueness_across_mixed_operations() {
    let mut editor = editor();
    let section = BlockTemplate::new(BlockKind::Section)
        .with_child(BlockTemplate::new(BlockKind::Row).with_child(text_template()));

    let a = editor.add_block(&section, None, None).unwrap();
    editor.add_block(&section, None, None).unwrap();
    editor.duplicate_block(&a).unwrap();
    editor.copy_block(&a).unwrap();
    editor.paste_block(None, None).unwrap();
    editor.paste_block(Some(&a), Some(0)).unwrap();

    let ids = walk::collect_ids(editor.blocks());
    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len());
    assert_index_consistent(&editor);
}

#[test]
fn test_selection_multi_toggle() {
    let mut editor = editor();
    let a = editor.add_block(&text(), None, None).unwrap();
    let b = editor.add_block(&text(), None, None).unwrap();

    editor.select_block(Some(&a), false);
    editor.select_block(Some(&b), true);
    assert_eq!(editor.selected_ids(), [a.clone(), b.clone()]);

    editor.select_block(Some(&a), true);
    assert_eq!(editor.selected_ids(), [b]);

    editor.select_block(None, false);
    assert!(editor.selected_ids().is_empty());

    // stale ids are ignored
    editor.select_block(Some("ghost-5"), false);
    assert!(editor.selected_ids().is_empty());
}

// ---- grid cells -----------------------------------------------------------

fn grid_editor() -> (Editor, String) {
    let mut editor = editor();
    let grid_id = editor
        .add_block(
            &BlockTemplate::new(BlockKind::Grid)
                .with_child(BlockTemplate::new(BlockKind::Empty))
                .with_child(BlockTemplate::new(BlockKind::Button))
                .with_child(BlockTemplate::new(BlockKind::Empty)),
            None,
            None,
        )
        .unwrap();
    (editor, grid_id)
}

#[test]
fn test_place_in_grid_fills_empty_cell() {
    let (mut editor, grid_id) = grid_editor();

    let id = editor.place_in_grid(&text(), &grid_id, 2).unwrap();

    let grid = editor.index().node(editor.blocks(), &grid_id).unwrap();
    assert_eq!(grid.children.len(), 3);
    assert_eq!(grid.children[2].id, id);
    assert_eq!(editor.selected_ids(), [id]);
}

#[test]
fn test_place_in_grid_occupied_cell_is_rejected() {
    let (mut editor, grid_id) = grid_editor();
    let before = editor.history().len();

    let err = editor.place_in_grid(&text(), &grid_id, 1).unwrap_err();

    assert_eq!(
        err,
        MutationError::GridCellOccupied {
            grid_id: grid_id.clone(),
            cell: 1
        }
    );
    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_place_in_grid_pads_past_the_end() {
    let (mut editor, grid_id) = grid_editor();

    let id = editor.place_in_grid(&text(), &grid_id, 5).unwrap();

    let grid = editor.index().node(editor.blocks(), &grid_id).unwrap();
    assert_eq!(grid.children.len(), 6);
    assert!(grid.children[3].is_empty_slot());
    assert!(grid.children[4].is_empty_slot());
    assert_eq!(grid.children[5].id, id);
}

#[test]
fn test_grid_delete_backfills_slot() {
    let (mut editor, grid_id) = grid_editor();
    let button_id = editor
        .index()
        .node(editor.blocks(), &grid_id)
        .unwrap()
        .children[1]
        .id
        .clone();

    editor.delete_block(&button_id).unwrap();

    let grid = editor.index().node(editor.blocks(), &grid_id).unwrap();
    assert_eq!(grid.children.len(), 3, "later cells keep their index");
    assert!(grid.children[1].is_empty_slot());
}

#[test]
fn test_move_between_grid_cells() {
    let (mut editor, grid_id) = grid_editor();
    let button_id = editor
        .index()
        .node(editor.blocks(), &grid_id)
        .unwrap()
        .children[1]
        .id
        .clone();

    editor.move_to_grid(&button_id, &grid_id, 0).unwrap();

    let grid = editor.index().node(editor.blocks(), &grid_id).unwrap();
    assert_eq!(grid.children[0].id, button_id);
    assert!(grid.children[1].is_empty_slot(), "vacated cell back-filled");
    assert_eq!(grid.children.len(), 3);

    // moving onto its own cell is a quiet no-op
    let before = editor.history().len();
    editor.move_to_grid(&button_id, &grid_id, 0).unwrap();
    assert_eq!(editor.history().len(), before);
}

#[test]
fn test_move_to_grid_from_outside() {
    let (mut editor, grid_id) = grid_editor();
    let outside = editor.add_block(&text(), None, None).unwrap();

    editor.move_to_grid(&outside, &grid_id, 2).unwrap();

    assert_eq!(editor.blocks().len(), 1, "source left the root sequence");
    let grid = editor.index().node(editor.blocks(), &grid_id).unwrap();
    assert_eq!(grid.children[2].id, outside);
}

#[test]
fn test_move_to_grid_rejects_occupied_and_non_grid() {
    let (mut editor, grid_id) = grid_editor();
    let outside = editor.add_block(&text(), None, None).unwrap();

    let err = editor.move_to_grid(&outside, &grid_id, 1).unwrap_err();
    assert!(matches!(err, MutationError::GridCellOccupied { .. }));

    let section = editor
        .add_block(&BlockTemplate::new(BlockKind::Section), None, None)
        .unwrap();
    let err = editor.move_to_grid(&outside, &section, 0).unwrap_err();
    assert_eq!(err, MutationError::NotAGrid(section));
}

#[test]
fn test_duplicate_in_grid_takes_first_free_cell() {
    let (mut editor, grid_id) = grid_editor();
    let button_id = editor
        .index()
        .node(editor.blocks(), &grid_id)
        .unwrap()
        .children[1]
        .id
        .clone();

    let clone_id = editor.duplicate_block(&button_id).unwrap();

    let grid = editor.index().node(editor.blocks(), &grid_id).unwrap();
    assert_eq!(grid.children.len(), 3, "no cell shifted");
    assert_eq!(grid.children[0].id, clone_id);
    assert_eq!(grid.children[1].id, button_id);
}
