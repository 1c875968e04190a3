//! Tests for TileManager.

use super::*;
use crate::tiles::surface::{HeadlessSurface, SurfaceOp};

// ===== Test Helpers =====

fn file(id: u64) -> FileRecord {
    FileRecord::new(FileId::new(id), "image/jpeg")
}

fn files(ids: std::ops::RangeInclusive<u64>) -> Vec<FileRecord> {
    ids.map(file).collect()
}

fn fid(id: u64) -> FileId {
    FileId::new(id)
}

fn manager_with(ids: std::ops::RangeInclusive<u64>) -> TileManager<HeadlessSurface> {
    let mut tm = TileManager::new(HeadlessSurface::new());
    tm.render_files(&files(ids), &RenderOptions::default());
    tm.surface_mut().clear_ops();
    tm
}

// ===== create_tile =====

#[test]
fn create_tile_is_idempotent_for_known_id() {
    let mut tm = TileManager::new(HeadlessSurface::new());
    let first = tm.create_tile(&file(1), 0).handle();
    let again = tm.create_tile(&file(1), 0).handle();

    assert_eq!(first, again, "same id must keep its render handle");
    assert_eq!(tm.len(), 1);
    assert_eq!(tm.slots(), &[Some(fid(1))]);
}

#[test]
fn create_tile_updates_record_and_moves_display_index() {
    let mut tm = manager_with(1..=3);
    let updated = FileRecord::new(fid(1), "video/mp4");

    tm.create_tile(&updated, 2);

    assert_eq!(tm.display_order(), vec![fid(2), fid(3), fid(1)]);
    assert!(tm.tile(fid(1)).is_some_and(|t| t.file().is_video()));
    assert_eq!(tm.len(), 3);
}

#[test]
fn create_tile_beyond_length_leaves_holes() {
    let mut tm = TileManager::new(HeadlessSurface::new());
    tm.create_tile(&file(7), 3);

    assert_eq!(tm.slots(), &[None, None, None, Some(fid(7))]);
    assert_eq!(tm.display_index(fid(7)), Some(3));
    assert_eq!(tm.display_order(), vec![fid(7)]);
}

#[test]
fn create_tile_fills_hole_without_shifting() {
    let mut tm = TileManager::new(HeadlessSurface::new());
    tm.create_tile(&file(7), 2);
    tm.create_tile(&file(8), 1);

    assert_eq!(tm.slots(), &[None, Some(fid(8)), Some(fid(7))]);
}

#[test]
fn create_tile_into_occupied_slot_shifts_right() {
    let mut tm = manager_with(1..=2);
    tm.create_tile(&file(9), 0);

    assert_eq!(tm.display_order(), vec![fid(9), fid(1), fid(2)]);
}

// ===== removal =====

#[test]
fn remove_tile_compacts_and_keeps_relative_order() {
    let mut tm = manager_with(1..=5);

    assert!(tm.remove_tile(fid(3)));

    assert_eq!(tm.display_order(), vec![fid(1), fid(2), fid(4), fid(5)]);
    assert_eq!(tm.display_index(fid(4)), Some(2));
    assert!(tm.tile(fid(3)).is_none());
}

#[test]
fn remove_tile_destroys_render_handle() {
    let mut tm = manager_with(1..=2);
    let handle = tm.tile(fid(2)).map(|t| t.handle()).expect("tile exists");

    tm.remove_tile(fid(2));

    assert_eq!(tm.surface().ops(), &[SurfaceOp::Destroy(handle)]);
}

#[test]
fn remove_unknown_tile_returns_false() {
    let mut tm = manager_with(1..=2);
    assert!(!tm.remove_tile(fid(99)));
    assert!(tm.surface().ops().is_empty());
}

#[test]
fn remove_tiles_batch_skips_unknown_ids() {
    let mut tm = manager_with(1..=6);

    let removed = tm.remove_tiles(&[fid(2), fid(4), fid(42), fid(6)]);

    assert_eq!(removed, 3);
    assert_eq!(tm.display_order(), vec![fid(1), fid(3), fid(5)]);
    let destroys = tm
        .surface()
        .ops()
        .iter()
        .filter(|op| matches!(op, SurfaceOp::Destroy(_)))
        .count();
    assert_eq!(destroys, 3);
}

// ===== render_files =====

#[test]
fn render_files_attaches_in_one_batch() {
    let mut tm = TileManager::new(HeadlessSurface::new());

    let rendered = tm.render_files(&files(1..=500), &RenderOptions::default());

    assert_eq!(rendered, 500);
    assert_eq!(tm.surface().attach_calls(), 1, "bulk attach must be a single call");
    assert_eq!(tm.len(), 500);
}

#[test]
fn render_files_clears_by_default() {
    let mut tm = manager_with(1..=3);

    tm.render_files(&files(10..=11), &RenderOptions::default());

    assert_eq!(tm.display_order(), vec![fid(10), fid(11)]);
    let destroys = tm
        .surface()
        .ops()
        .iter()
        .filter(|op| matches!(op, SurfaceOp::Destroy(_)))
        .count();
    assert_eq!(destroys, 3);
}

#[test]
fn render_files_without_clear_appends_new_and_keeps_existing() {
    let mut tm = manager_with(1..=3);
    let options = RenderOptions {
        clear: false,
        ..RenderOptions::default()
    };

    let rendered = tm.render_files(&[file(2), file(4)], &options);

    assert_eq!(rendered, 1);
    assert_eq!(tm.display_order(), vec![fid(1), fid(2), fid(3), fid(4)]);
}

#[test]
fn render_files_applies_initial_selection() {
    let mut tm = TileManager::new(HeadlessSurface::new());
    let options = RenderOptions {
        clear: true,
        selected_ids: [fid(2)].into_iter().collect(),
    };

    tm.render_files(&files(1..=3), &options);

    assert!(tm.tile(fid(2)).is_some_and(|t| t.is_selected()));
    assert!(tm.tile(fid(1)).is_some_and(|t| !t.is_selected()));
}

#[test]
fn insert_batch_places_by_index_with_one_attach() {
    let mut tm = manager_with(3..=4);
    let new = [file(1), file(2)];

    let created = tm.insert_batch(new.iter().enumerate(), &HashSet::new());

    assert_eq!(created, 2);
    assert_eq!(tm.display_order(), vec![fid(1), fid(2), fid(3), fid(4)]);
    assert_eq!(tm.surface().attach_calls(), 1);
}

#[test]
fn sync_selection_reports_changed_tiles() {
    let mut tm = manager_with(1..=4);
    let selected: HashSet<_> = [fid(1), fid(3)].into_iter().collect();

    assert_eq!(tm.sync_selection(&selected), 2);
    assert_eq!(tm.sync_selection(&selected), 0);
}

// ===== lazy activation =====

#[test]
fn activate_requests_each_tile_once() {
    let mut tm = manager_with(1..=3);

    assert_eq!(tm.activate([fid(1), fid(2)]), 2);
    assert_eq!(tm.activate([fid(1), fid(2), fid(3)]), 1);

    let requests = tm
        .surface()
        .ops()
        .iter()
        .filter(|op| matches!(op, SurfaceOp::RequestImage(_)))
        .count();
    assert_eq!(requests, 3);
}

#[test]
fn failed_load_falls_back_to_placeholder_without_retry() {
    let mut tm = manager_with(1..=1);
    tm.activate([fid(1)]);

    assert!(tm.resource_loaded(fid(1), LoadOutcome::Failed));
    assert_eq!(
        tm.tile(fid(1)).map(|t| t.resource()),
        Some(ResourceState::Placeholder)
    );

    // Placeholder tiles are never observed again.
    assert_eq!(tm.activate([fid(1)]), 0);
    assert!(!tm.resource_loaded(fid(1), LoadOutcome::Loaded));
}

#[test]
fn load_completion_for_unrequested_tile_is_ignored() {
    let mut tm = manager_with(1..=1);
    assert!(!tm.resource_loaded(fid(1), LoadOutcome::Loaded));
    assert!(!tm.resource_loaded(fid(9), LoadOutcome::Loaded));
}

// ===== setup_viewport =====

#[test]
fn setup_viewport_assigns_triplet_from_display_order() {
    let mut tm = manager_with(1..=7);

    let triplet = tm.setup_viewport(fid(5), None).expect("file present");

    assert_eq!(triplet.prev, Some(fid(4)));
    assert_eq!(triplet.next, Some(fid(6)));
    assert_eq!(tm.ids_with_position(TilePosition::Prev), vec![fid(4)]);
    assert_eq!(tm.ids_with_position(TilePosition::Current), vec![fid(5)]);
    assert_eq!(tm.ids_with_position(TilePosition::Next), vec![fid(6)]);
}

#[test]
fn setup_viewport_uses_supplied_navigation_order() {
    let mut tm = manager_with(1..=7);
    let nav = [fid(7), fid(5), fid(1)];

    let triplet = tm.setup_viewport(fid(5), Some(&nav)).expect("file present");

    assert_eq!(triplet.prev, Some(fid(7)));
    assert_eq!(triplet.next, Some(fid(1)));
}

#[test]
fn setup_viewport_absent_file_is_noop() {
    let mut tm = manager_with(1..=3);

    assert_eq!(tm.setup_viewport(fid(99), None), None);
    assert!(tm.surface().ops().is_empty());
    assert!(tm.ids_with_position(TilePosition::Current).is_empty());
}

#[test]
fn setup_viewport_retargets_triplet_members_directly() {
    let mut tm = manager_with(1..=7);
    tm.setup_viewport(fid(5), None);
    tm.surface_mut().clear_ops();

    tm.setup_viewport(fid(6), None);

    let next_tile = tm.tile(fid(6)).expect("tile");
    assert_eq!(next_tile.position(), TilePosition::Current);
    assert_eq!(next_tile.animation_from(), Some(TilePosition::Next));

    let handle = next_tile.handle();
    let moves: Vec<_> = tm
        .surface()
        .ops()
        .iter()
        .filter(|op| matches!(op, SurfaceOp::Move { handle: h, .. } if *h == handle))
        .cloned()
        .collect();
    assert_eq!(
        moves,
        vec![SurfaceOp::Move {
            handle,
            from: TilePosition::Next,
            to: TilePosition::Current,
        }],
        "must not snap through GRID"
    );

    // Old PREV leaves the triplet and returns to GRID.
    assert_eq!(
        tm.tile(fid(4)).map(|t| t.position()),
        Some(TilePosition::Grid)
    );
}

#[test]
fn setup_viewport_resets_hidden_tiles_to_grid() {
    let mut tm = manager_with(1..=5);
    tm.set_position(fid(1), TilePosition::Hidden);

    tm.setup_viewport(fid(3), None);

    assert_eq!(
        tm.tile(fid(1)).map(|t| t.position()),
        Some(TilePosition::Grid)
    );
}

#[test]
fn setup_viewport_hides_tiles_outside_navigation_order() {
    let mut tm = manager_with(1..=6);
    let nav = [fid(2), fid(3), fid(4)];

    tm.setup_viewport(fid(3), Some(&nav));
    assert_eq!(
        tm.ids_with_position(TilePosition::Hidden),
        vec![fid(1), fid(5), fid(6)]
    );
    tm.surface_mut().clear_ops();

    tm.setup_viewport(fid(4), Some(&nav));

    let hidden_handle = tm.tile(fid(6)).map(|t| t.handle()).expect("tile");
    assert!(!tm.surface().ops().iter().any(
        |op| matches!(op, SurfaceOp::Move { handle, .. } if *handle == hidden_handle)
    ));
    assert_eq!(
        tm.tile(fid(2)).map(|t| t.position()),
        Some(TilePosition::Grid)
    );
}

#[test]
fn reset_all_to_grid_clears_boxes_on_non_triplet_tiles() {
    let mut tm = manager_with(1..=5);
    tm.setup_viewport(fid(3), None);
    // Tile 1 only picked up a box from some layout pass.
    tm.set_layout(fid(1), Some(TileBox::new(0.0, 0.0, 10.0, 10.0)));
    tm.set_overlay_active(fid(3), true);
    tm.swap_media(
        fid(3),
        MediaSurface::Video {
            poster: ResourceState::Pending,
        },
    );

    let touched = tm.reset_all_to_grid();

    assert_eq!(touched, 4, "tiles 1, 2, 3, 4 carried overlay state");
    assert!(tm.iter().all(|t| !t.has_manual_positioning()));
    assert!(tm.iter().all(|t| t.media() == MediaSurface::Image));
}
