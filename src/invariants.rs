//! Structural invariant checks over the presentation core.
//!
//! Every check reads shared references only, so it can run after any
//! operation without disturbing state. An empty result means the components
//! agree with each other.

use crate::model::FileId;
use crate::tiles::{RenderSurface, TileManager, TilePosition};
use crate::viewport::ViewportController;
use crate::window::{PositionSlider, VirtualWindow};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// A broken invariant, with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("expected exactly one CURRENT tile while active, found {count}")]
    CurrentCount { count: usize },

    #[error("tile {file_id} is at {position:?} while the overlay is inactive")]
    OverlaySlotWhileInactive {
        file_id: FileId,
        position: TilePosition,
    },

    #[error("tile {file_id} is at {actual:?} but the triplet puts it at {expected:?}")]
    TripletMismatch {
        file_id: FileId,
        expected: TilePosition,
        actual: Option<TilePosition>,
    },

    #[error("window paused = {paused} while overlay active = {active}")]
    PauseMismatch { paused: bool, active: bool },

    #[error("pinned ids {pinned:?} differ from triplet ids {expected:?}")]
    PinMismatch {
        pinned: Vec<FileId>,
        expected: Vec<FileId>,
    },

    #[error("pinned id {file_id} has no tile")]
    PinWithoutTile { file_id: FileId },

    #[error("tile {file_id} keeps manual positioning while the overlay is inactive")]
    ManualPositionWhileInactive { file_id: FileId },

    #[error("tile {file_id} shows a media surface at {position:?}")]
    MediaOutsideCurrent {
        file_id: FileId,
        position: TilePosition,
    },

    #[error("window range {start}..{end} is outside 0..{total}")]
    WindowBounds {
        start: usize,
        end: usize,
        total: usize,
    },

    #[error("display order lists {file_id} more than once")]
    DuplicateInOrder { file_id: FileId },

    #[error("tile {file_id} is missing from the display order")]
    MissingFromOrder { file_id: FileId },

    #[error("slider offset {offset} exceeds limit {limit}")]
    OffsetOutOfRange { offset: usize, limit: usize },

    #[error("slider window size is 0 for a non-empty area")]
    EmptyWindowSize,
}

/// Cross-check tiles, window, and overlay controller.
pub fn check<S: RenderSurface>(
    tiles: &TileManager<S>,
    window: &VirtualWindow,
    controller: &ViewportController,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_order(tiles, &mut violations);
    check_window_bounds(window, &mut violations);

    let active = controller.is_active();
    if window.is_paused() != active {
        violations.push(Violation::PauseMismatch {
            paused: window.is_paused(),
            active,
        });
    }

    for tile in tiles.iter() {
        if tile.media().is_video() && tile.position() != TilePosition::Current {
            violations.push(Violation::MediaOutsideCurrent {
                file_id: tile.file_id(),
                position: tile.position(),
            });
        }
    }

    for file_id in window.pinned() {
        if !tiles.contains(file_id) {
            violations.push(Violation::PinWithoutTile { file_id });
        }
    }

    if active {
        check_active(tiles, window, controller, &mut violations);
    } else {
        check_inactive(tiles, window, &mut violations);
    }
    violations
}

/// Offset clamping and non-empty window size.
pub fn check_slider(slider: &PositionSlider) -> Vec<Violation> {
    let mut violations = Vec::new();
    if slider.current_offset() > slider.limit() {
        violations.push(Violation::OffsetOutOfRange {
            offset: slider.current_offset(),
            limit: slider.limit(),
        });
    }
    if !slider.area().is_empty() && slider.window_size() == 0 {
        violations.push(Violation::EmptyWindowSize);
    }
    violations
}

fn check_order<S: RenderSurface>(tiles: &TileManager<S>, out: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for file_id in tiles.slots().iter().flatten() {
        if !seen.insert(*file_id) {
            out.push(Violation::DuplicateInOrder { file_id: *file_id });
        }
    }
    for tile in tiles.iter() {
        if !seen.contains(&tile.file_id()) {
            out.push(Violation::MissingFromOrder {
                file_id: tile.file_id(),
            });
        }
    }
}

fn check_window_bounds(window: &VirtualWindow, out: &mut Vec<Violation>) {
    let (start, end, total) = (window.start_idx(), window.end_idx(), window.total());
    if start > end || end > total {
        out.push(Violation::WindowBounds { start, end, total });
    }
}

fn check_active<S: RenderSurface>(
    tiles: &TileManager<S>,
    window: &VirtualWindow,
    controller: &ViewportController,
    out: &mut Vec<Violation>,
) {
    let count = tiles.ids_with_position(TilePosition::Current).len();
    if count != 1 {
        out.push(Violation::CurrentCount { count });
    }

    let Some(triplet) = controller.triplet() else {
        return;
    };
    for file_id in triplet.ids() {
        let Some(expected) = triplet.position_of(file_id) else {
            continue;
        };
        let actual = tiles.tile(file_id).map(|t| t.position());
        if actual != Some(expected) {
            out.push(Violation::TripletMismatch {
                file_id,
                expected,
                actual,
            });
        }
    }

    let pinned: BTreeSet<FileId> = window.pinned().collect();
    let expected: BTreeSet<FileId> = triplet.ids().collect();
    if pinned != expected {
        out.push(Violation::PinMismatch {
            pinned: pinned.into_iter().collect(),
            expected: expected.into_iter().collect(),
        });
    }
}

fn check_inactive<S: RenderSurface>(
    tiles: &TileManager<S>,
    window: &VirtualWindow,
    out: &mut Vec<Violation>,
) {
    for tile in tiles.iter() {
        let position = tile.position();
        if position != TilePosition::Grid {
            out.push(Violation::OverlaySlotWhileInactive {
                file_id: tile.file_id(),
                position,
            });
        } else if tile.has_manual_positioning() {
            out.push(Violation::ManualPositionWhileInactive {
                file_id: tile.file_id(),
            });
        }
    }
    if window.pinned_count() > 0 {
        out.push(Violation::PinMismatch {
            pinned: window.pinned().collect(),
            expected: Vec::new(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Area, TileBox};
    use crate::model::{Catalog, FileRecord};
    use crate::tiles::{HeadlessSurface, RenderOptions};
    use crate::viewport::OverlayContext;
    use crate::window::{DensityClass, SliderConfig};

    fn setup(n: u64) -> (TileManager<HeadlessSurface>, VirtualWindow, Catalog) {
        let catalog = Catalog::new((1..=n).map(|i| FileRecord::new(FileId::new(i), "image/png")));
        let mut tiles = TileManager::new(HeadlessSurface::new());
        let records: Vec<FileRecord> = catalog.iter().cloned().collect();
        tiles.render_files(&records, &RenderOptions::default());
        let mut window = VirtualWindow::default();
        window.set_total(catalog.len());
        window.resize(Area::new(800.0, 600.0));
        (tiles, window, catalog)
    }

    #[test]
    fn fresh_grid_is_clean() {
        let (tiles, window, _) = setup(10);
        let controller = ViewportController::default();
        assert_eq!(check(&tiles, &window, &controller), vec![]);
    }

    #[test]
    fn active_overlay_is_clean() {
        let (mut tiles, mut window, catalog) = setup(10);
        let mut controller = ViewportController::default();
        let ids = catalog.ids();
        let mut ctx = OverlayContext {
            tiles: &mut tiles,
            window: &mut window,
            catalog: &catalog,
        };
        controller.enter(&mut ctx, FileId::new(4), &ids);
        controller.next(&mut ctx);

        assert_eq!(check(&tiles, &window, &controller), vec![]);
    }

    #[test]
    fn stray_current_while_inactive_is_reported() {
        let (mut tiles, window, _) = setup(3);
        tiles.set_position(FileId::new(2), TilePosition::Current);
        let controller = ViewportController::default();

        let violations = check(&tiles, &window, &controller);
        assert_eq!(
            violations,
            vec![Violation::OverlaySlotWhileInactive {
                file_id: FileId::new(2),
                position: TilePosition::Current,
            }]
        );
    }

    #[test]
    fn leftover_layout_while_inactive_is_reported() {
        let (mut tiles, window, _) = setup(3);
        tiles.set_layout(FileId::new(1), Some(TileBox::new(0.0, 0.0, 10.0, 10.0)));
        let controller = ViewportController::default();

        assert_eq!(
            check(&tiles, &window, &controller),
            vec![Violation::ManualPositionWhileInactive {
                file_id: FileId::new(1)
            }]
        );
    }

    #[test]
    fn paused_window_without_overlay_is_reported() {
        let (tiles, mut window, _) = setup(3);
        window.pause();
        let controller = ViewportController::default();

        assert!(check(&tiles, &window, &controller).contains(&Violation::PauseMismatch {
            paused: true,
            active: false
        }));
    }

    #[test]
    fn pin_without_tile_is_reported() {
        let (tiles, mut window, _) = setup(3);
        window.set_pins([FileId::new(99)]);
        let controller = ViewportController::default();

        let violations = check(&tiles, &window, &controller);
        assert!(violations.contains(&Violation::PinWithoutTile {
            file_id: FileId::new(99)
        }));
    }

    #[test]
    fn displaced_triplet_tile_is_reported() {
        let (mut tiles, mut window, catalog) = setup(5);
        let mut controller = ViewportController::default();
        let ids = catalog.ids();
        let mut ctx = OverlayContext {
            tiles: &mut tiles,
            window: &mut window,
            catalog: &catalog,
        };
        controller.enter(&mut ctx, FileId::new(3), &ids);
        tiles.set_position(FileId::new(4), TilePosition::Grid);

        assert_eq!(
            check(&tiles, &window, &controller),
            vec![Violation::TripletMismatch {
                file_id: FileId::new(4),
                expected: TilePosition::Next,
                actual: Some(TilePosition::Grid),
            }]
        );
    }

    #[test]
    fn slider_checks_pass_after_resize() {
        let mut slider = PositionSlider::new(SliderConfig::default(), DensityClass::Comfortable);
        slider.set_total(10);
        slider.resize(Area::new(10.0, 10.0));
        assert!(check_slider(&slider).is_empty());
        assert_eq!(slider.window_size(), 1);
    }

    #[test]
    fn violation_messages_name_the_file() {
        let v = Violation::PinWithoutTile {
            file_id: FileId::new(7),
        };
        assert!(v.to_string().contains('7'));
    }
}
