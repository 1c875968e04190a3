//! TriageView - composition root wiring the core components together.
//!
//! The view owns the catalog snapshot and every component, and keeps the
//! materialized tiles in step with the virtual window: after any window
//! change it batch-removes tiles that left, batch-inserts tiles that
//! entered, and requests images for tiles near the visible rows.

use crate::config::ResolvedConfig;
use crate::events::Notification;
use crate::geometry::{Area, TileBox};
use crate::invariants::{self, Violation};
use crate::model::{Catalog, FileId, FileRecord};
use crate::tiles::{
    LoadOutcome, MediaSurface, RenderSurface, ResourceState, TileManager, TilePosition,
};
use crate::viewport::{OverlayContext, OverlayMode, OverlayState, ViewportController};
use crate::window::{DensityClass, Membership, PositionSlider, VirtualWindow};
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, error};

/// Rows above and below the visible rows whose images are requested.
pub const DEFAULT_ACTIVATION_MARGIN_ROWS: usize = 1;

/// Media triage presentation state.
#[derive(Debug)]
pub struct TriageView<S: RenderSurface> {
    catalog: Catalog,
    tiles: TileManager<S>,
    window: VirtualWindow,
    slider: PositionSlider,
    controller: ViewportController,
    selection: HashSet<FileId>,
    activation_margin_rows: usize,
    /// The overlay was opened over the whole catalog rather than a filter.
    overlay_follows_catalog: bool,
}

impl<S: RenderSurface> TriageView<S> {
    pub fn new(surface: S, config: &ResolvedConfig) -> Self {
        let mode = if config.compare_default {
            OverlayMode::Compare
        } else {
            OverlayMode::Single
        };
        Self {
            catalog: Catalog::default(),
            tiles: TileManager::new(surface),
            window: VirtualWindow::new(config.grid),
            slider: PositionSlider::new(config.slider, config.density),
            controller: ViewportController::new(config.overlay, mode),
            selection: HashSet::new(),
            activation_margin_rows: DEFAULT_ACTIVATION_MARGIN_ROWS,
            overlay_follows_catalog: false,
        }
    }

    // ===== Accessors =====

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tiles(&self) -> &TileManager<S> {
        &self.tiles
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn slider(&self) -> &PositionSlider {
        &self.slider
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    pub fn surface(&self) -> &S {
        self.tiles.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.tiles.surface_mut()
    }

    pub fn subscribe_overlay(&mut self) -> Receiver<Notification> {
        self.controller.subscribe()
    }

    pub fn subscribe_slider(&mut self) -> Receiver<Notification> {
        self.slider.subscribe()
    }

    pub fn set_activation_margin_rows(&mut self, rows: usize) {
        self.activation_margin_rows = rows;
        self.sync_materialization();
    }

    // ===== Data source =====

    /// Replace the collection snapshot.
    ///
    /// While the overlay is up, an unfiltered navigation set follows the new
    /// snapshot and a filtered one keeps only its files that survive, in its
    /// own order. Materialization catches up once the overlay closes.
    pub fn set_files(&mut self, files: Vec<FileRecord>) {
        self.catalog = Catalog::new(files);
        debug!(total = self.catalog.len(), "Catalog replaced");
        self.window.set_total(self.catalog.len());
        self.slider.set_total(self.catalog.len());

        if self.controller.is_active() {
            let ids = if self.overlay_follows_catalog {
                self.catalog.ids()
            } else {
                let catalog = &self.catalog;
                self.controller
                    .navigation_ids()
                    .iter()
                    .copied()
                    .filter(|id| catalog.get(*id).is_some())
                    .collect()
            };
            let (controller, mut ctx) = self.split();
            controller.update_navigation_set(&mut ctx, &ids);
        }
        self.sync_materialization();
        self.verify();
    }

    /// Replace the selection highlight set.
    pub fn set_selection(&mut self, selected: impl IntoIterator<Item = FileId>) -> usize {
        self.selection = selected.into_iter().collect();
        self.tiles.sync_selection(&self.selection)
    }

    // ===== Grid inputs =====

    /// Scroll the grid to `offset_px`.
    pub fn scroll_to(&mut self, offset_px: f32) -> Option<Range<usize>> {
        let moved = self.window.scroll_to(offset_px);
        if moved.is_some() {
            self.sync_materialization();
        }
        self.verify();
        moved
    }

    /// Resize the render area. Overlay relayout is debounced; see [`Self::tick`].
    pub fn resize(&mut self, area: Area, now: Instant) -> Option<Range<usize>> {
        let moved = self.window.resize(area);
        self.slider.resize(area);
        self.slider.set_track_length(area.height);
        self.controller.on_resize(area, now);
        if moved.is_some() {
            self.sync_materialization();
        }
        self.verify();
        moved
    }

    /// Change the slider density class.
    pub fn set_density(&mut self, density: DensityClass) -> bool {
        self.slider.set_density(density)
    }

    /// Move the slider to `offset` and scroll the grid to the row holding it.
    pub fn slider_go_to(&mut self, offset: i64) -> usize {
        let offset = self.slider.go_to_offset(offset);
        self.scroll_to_index(offset);
        offset
    }

    /// Page the slider and follow with the grid.
    pub fn slider_page(&mut self, forward: bool, shift: bool) -> usize {
        let offset = self.slider.page(forward, shift);
        self.scroll_to_index(offset);
        offset
    }

    fn scroll_to_index(&mut self, index: usize) {
        let columns = self.window.columns();
        if columns == 0 {
            return;
        }
        let geometry = self.window.geometry();
        let row = index / columns;
        self.scroll_to(row as f32 * (geometry.tile_height + geometry.gap));
    }

    /// Image load completion from the surface.
    pub fn resource_loaded(&mut self, id: FileId, outcome: LoadOutcome) -> bool {
        self.tiles.resource_loaded(id, outcome)
    }

    // ===== Overlay =====

    /// Open the overlay on `file_id` over the whole catalog.
    pub fn enter(&mut self, file_id: FileId) -> bool {
        let ids = self.catalog.ids();
        self.open_overlay(file_id, &ids, true)
    }

    /// Open the overlay on `file_id` over an explicit navigation set.
    pub fn enter_with(&mut self, file_id: FileId, navigable_ids: &[FileId]) -> bool {
        self.open_overlay(file_id, navigable_ids, false)
    }

    fn open_overlay(&mut self, file_id: FileId, ids: &[FileId], follows_catalog: bool) -> bool {
        let area = self.window.area();
        let (controller, mut ctx) = self.split();
        if !controller.is_active() {
            controller.set_area(&mut ctx, area);
        }
        let entered = controller.enter(&mut ctx, file_id, ids);
        if entered {
            self.overlay_follows_catalog = follows_catalog;
        }
        self.verify();
        entered
    }

    pub fn next(&mut self) -> bool {
        let (controller, mut ctx) = self.split();
        let moved = controller.next(&mut ctx);
        self.verify();
        moved
    }

    pub fn previous(&mut self) -> bool {
        let (controller, mut ctx) = self.split();
        let moved = controller.previous(&mut ctx);
        self.verify();
        moved
    }

    pub fn go_to_index(&mut self, index: usize) -> bool {
        let (controller, mut ctx) = self.split();
        let moved = controller.go_to_index(&mut ctx, index);
        self.verify();
        moved
    }

    pub fn go_to_file(&mut self, file_id: FileId) -> bool {
        let (controller, mut ctx) = self.split();
        let moved = controller.go_to_file(&mut ctx, file_id);
        self.verify();
        moved
    }

    /// Filter change while the overlay is up. Returns whether it stays up.
    pub fn update_navigation_set(&mut self, ids: &[FileId]) -> bool {
        let (controller, mut ctx) = self.split();
        let still_active = controller.update_navigation_set(&mut ctx, ids);
        if still_active {
            self.overlay_follows_catalog = false;
        }
        if !still_active {
            self.sync_materialization();
        }
        self.verify();
        still_active
    }

    pub fn exit(&mut self) -> bool {
        let (controller, mut ctx) = self.split();
        let exited = controller.exit(&mut ctx);
        if exited {
            self.sync_materialization();
        }
        self.verify();
        exited
    }

    pub fn set_mode(&mut self, mode: OverlayMode) -> bool {
        let (controller, mut ctx) = self.split();
        let relaid = controller.set_mode(&mut ctx, mode);
        self.verify();
        relaid
    }

    pub fn set_side_panel_width(&mut self, width: f32) {
        let (controller, mut ctx) = self.split();
        controller.set_side_panel_width(&mut ctx, width);
    }

    /// Drive debounced work. Returns whether an overlay relayout ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (controller, mut ctx) = self.split();
        let relaid = controller.tick(&mut ctx, now);
        self.verify();
        relaid
    }

    // ===== Materialization =====

    /// Bring the tile set in line with the window range.
    ///
    /// Does nothing while the overlay holds the window paused.
    pub fn sync_materialization(&mut self) {
        if self.window.is_paused() {
            return;
        }

        let desired = self.window.materialized(&self.catalog);
        let keep: HashSet<FileId> = desired.iter().map(|(id, _)| *id).collect();
        let departed: Vec<FileId> = self
            .tiles
            .iter()
            .map(|t| t.file_id())
            .filter(|id| !keep.contains(id))
            .collect();
        let removed = self.tiles.remove_tiles(&departed);

        let catalog = &self.catalog;
        let created = self.tiles.insert_batch(
            desired
                .iter()
                .filter_map(|(id, _)| catalog.get(*id))
                .enumerate(),
            &self.selection,
        );

        let near = self
            .window
            .proximity_range(self.activation_margin_rows);
        let requested = self
            .tiles
            .activate(catalog.slice(near).iter().map(|r| r.id));

        if removed + created + requested > 0 {
            debug!(removed, created, requested, "Materialization synced");
        }
    }

    // ===== Diagnostics =====

    /// Every broken invariant across the components.
    pub fn violations(&self) -> Vec<Violation> {
        let mut found = invariants::check(&self.tiles, &self.window, &self.controller);
        found.extend(invariants::check_slider(&self.slider));
        found
    }

    fn verify(&self) {
        if cfg!(debug_assertions) {
            for violation in self.violations() {
                error!(%violation, "Invariant violated");
            }
        }
    }

    /// Serializable snapshot of the whole view.
    pub fn report(&self) -> ViewReport {
        let tiles = self
            .tiles
            .iter()
            .map(|tile| TileReport {
                file_id: tile.file_id(),
                position: tile.position(),
                membership: self
                    .window
                    .membership(tile.file_id(), self.catalog.index_of(tile.file_id())),
                resource: tile.resource(),
                selected: tile.is_selected(),
                media: tile.media(),
                layout: tile.layout(),
            })
            .collect();

        ViewReport {
            total: self.catalog.len(),
            window: WindowReport {
                start: self.window.start_idx(),
                end: self.window.end_idx(),
                columns: self.window.columns(),
                total_rows: self.window.total_rows(),
                paused: self.window.is_paused(),
                pinned: self.window.pinned().collect(),
            },
            slider: SliderReport {
                density: self.slider.density(),
                window_size: self.slider.window_size(),
                offset: self.slider.current_offset(),
                limit: self.slider.limit(),
            },
            overlay: OverlayReport {
                state: self.controller.state(),
                mode: self.controller.mode(),
                current: self.controller.current_file(),
                index: self.controller.current_index(),
                has_next: self.controller.has_next(),
                has_prev: self.controller.has_prev(),
            },
            tiles,
            violations: self.violations().iter().map(ToString::to_string).collect(),
        }
    }

    fn split(&mut self) -> (&mut ViewportController, OverlayContext<'_, S>) {
        (
            &mut self.controller,
            OverlayContext {
                tiles: &mut self.tiles,
                window: &mut self.window,
                catalog: &self.catalog,
            },
        )
    }
}

/// JSON-friendly snapshot produced by [`TriageView::report`].
#[derive(Debug, Clone, Serialize)]
pub struct ViewReport {
    pub total: usize,
    pub window: WindowReport,
    pub slider: SliderReport,
    pub overlay: OverlayReport,
    /// Materialized tiles in display order.
    pub tiles: Vec<TileReport>,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowReport {
    pub start: usize,
    pub end: usize,
    pub columns: usize,
    pub total_rows: usize,
    pub paused: bool,
    pub pinned: Vec<FileId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderReport {
    pub density: DensityClass,
    pub window_size: usize,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayReport {
    pub state: OverlayState,
    pub mode: OverlayMode,
    pub current: Option<FileId>,
    pub index: Option<usize>,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileReport {
    pub file_id: FileId,
    pub position: TilePosition,
    pub membership: Option<Membership>,
    pub resource: ResourceState,
    pub selected: bool,
    pub media: MediaSurface,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<TileBox>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{HeadlessSurface, SurfaceOp};
    use std::time::Duration;

    fn files(n: u64) -> Vec<FileRecord> {
        (1..=n)
            .map(|i| FileRecord::new(FileId::new(i), "image/jpeg"))
            .collect()
    }

    /// 4 columns, 3 visible rows, overscan 2 with the default grid.
    fn view(n: u64) -> TriageView<HeadlessSurface> {
        let mut view = TriageView::new(HeadlessSurface::new(), &ResolvedConfig::default());
        view.set_files(files(n));
        view.resize(Area::new(1000.0, 600.0), Instant::now());
        view
    }

    #[test]
    fn initial_sync_materializes_window_range() {
        let view = view(100);
        // Rows 0..5 (3 visible + 2 overscan below).
        assert_eq!(view.window().range(), 0..20);
        assert_eq!(view.tiles().len(), 20);
        assert_eq!(
            view.tiles().display_order(),
            (1..=20).map(FileId::new).collect::<Vec<_>>()
        );
    }

    #[test]
    fn lazy_activation_covers_visible_rows_plus_margin() {
        let view = view(100);
        let requested: Vec<FileId> = view
            .tiles()
            .iter()
            .filter(|t| t.resource() == ResourceState::Requested)
            .map(|t| t.file_id())
            .collect();
        // Visible rows 0..3 plus one margin row.
        assert_eq!(requested.len(), 16);
    }

    #[test]
    fn scrolling_replaces_tiles_in_display_order() {
        let mut view = view(100);
        view.surface_mut().clear_ops();

        // First visible row 10, window rows 8..15.
        assert_eq!(view.scroll_to(2080.0), Some(32..60));

        let expected: Vec<FileId> = (33..=60).map(FileId::new).collect();
        assert_eq!(view.tiles().display_order(), expected);
        assert_eq!(view.surface().attach_calls(), 1, "one bulk attach");
    }

    #[test]
    fn overlay_holds_window_until_exit() {
        let mut view = view(100);
        assert!(view.enter(FileId::new(5)));
        let before = view.tiles().len();

        view.scroll_to(4000.0);
        assert_eq!(view.tiles().len(), before);
        assert_eq!(view.window().range(), 0..20);

        assert!(view.exit());
        assert_ne!(view.window().range(), 0..20);
        assert!(view.tiles().contains(FileId::new(80)));
        assert!(!view.tiles().contains(FileId::new(5)));
        assert!(view.violations().is_empty());
    }

    #[test]
    fn enter_far_file_pins_it_then_exit_drops_it() {
        let mut view = view(100);
        assert!(view.enter(FileId::new(90)));
        assert_eq!(
            view.report().overlay.current,
            Some(FileId::new(90))
        );
        assert!(view.tiles().contains(FileId::new(91)));
        assert!(view.violations().is_empty());

        view.exit();
        assert!(!view.tiles().contains(FileId::new(90)));
    }

    #[test]
    fn set_files_while_active_refilters_navigation() {
        let mut view = view(10);
        view.enter(FileId::new(5));

        let survivors: Vec<FileRecord> = files(10).into_iter().filter(|f| f.id.get() > 7).collect();
        view.set_files(survivors);

        assert!(view.controller().is_active());
        assert_eq!(view.controller().current_file(), Some(FileId::new(8)));
        assert!(view.violations().is_empty());
    }

    #[test]
    fn refresh_keeps_filtered_navigation_set() {
        let mut view = view(10);
        let filter: Vec<FileId> = (3..=5).map(FileId::new).collect();
        assert!(view.enter_with(FileId::new(5), &filter));

        view.set_files(files(11));

        assert_eq!(view.controller().navigation_ids(), filter.as_slice());
        assert_eq!(view.controller().current_file(), Some(FileId::new(5)));
        assert!(!view.controller().has_next());
        assert!(view.violations().is_empty());
    }

    #[test]
    fn refresh_drops_vanished_files_from_filter() {
        let mut view = view(10);
        let filter = [FileId::new(2), FileId::new(9), FileId::new(4)];
        assert!(view.enter_with(FileId::new(9), &filter));

        let survivors: Vec<FileRecord> = files(10).into_iter().filter(|f| f.id.get() != 9).collect();
        view.set_files(survivors);

        assert_eq!(
            view.controller().navigation_ids(),
            &[FileId::new(2), FileId::new(4)]
        );
        assert_eq!(view.controller().current_file(), Some(FileId::new(2)));
    }

    #[test]
    fn far_current_tile_requests_its_image() {
        let mut view = view(100);
        assert!(view.enter(FileId::new(90)));

        let tile = view.tiles().tile(FileId::new(90)).expect("pinned tile");
        assert_eq!(tile.resource(), ResourceState::Requested);
    }

    #[test]
    fn set_files_to_empty_closes_overlay() {
        let mut view = view(10);
        view.enter(FileId::new(5));

        view.set_files(Vec::new());

        assert!(!view.controller().is_active());
        assert!(view.tiles().is_empty());
    }

    #[test]
    fn selection_applies_to_existing_and_new_tiles() {
        let mut view = view(100);
        assert_eq!(view.set_selection([FileId::new(2), FileId::new(50)]), 1);
        assert!(view.tiles().tile(FileId::new(2)).is_some_and(|t| t.is_selected()));

        view.scroll_to(2080.0);
        assert!(view.tiles().tile(FileId::new(50)).is_some_and(|t| t.is_selected()));
    }

    #[test]
    fn failed_load_shows_placeholder_once() {
        let mut view = view(8);
        assert!(view.resource_loaded(FileId::new(1), LoadOutcome::Failed));
        assert!(!view.resource_loaded(FileId::new(1), LoadOutcome::Failed));
        let placeholders = view
            .surface()
            .ops()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Placeholder(_)))
            .count();
        assert_eq!(placeholders, 1);
    }

    #[test]
    fn slider_paging_scrolls_grid() {
        let mut view = view(100);
        let window_size = view.slider().window_size();
        assert!(window_size > 0);

        let offset = view.slider_page(true, true);
        assert_eq!(offset, window_size);
        assert!(view.window().range().contains(&offset));
    }

    #[test]
    fn resize_during_overlay_relays_out_on_tick() {
        let mut view = view(10);
        view.set_mode(OverlayMode::Compare);
        view.enter(FileId::new(5));
        let t0 = Instant::now();

        view.resize(Area::new(1400.0, 800.0), t0);
        assert!(!view.tick(t0 + Duration::from_millis(10)));
        assert!(view.tick(t0 + Duration::from_millis(150)));
        assert!(view.violations().is_empty());
    }

    #[test]
    fn report_serializes_to_json() {
        let mut view = view(6);
        view.enter(FileId::new(2));

        let json = serde_json::to_value(view.report()).unwrap();

        assert_eq!(json["total"], 6);
        assert_eq!(json["overlay"]["state"], "active_single");
        assert_eq!(json["overlay"]["current"], 2);
        assert_eq!(json["window"]["paused"], true);
        assert_eq!(json["tiles"][1]["position"], "current");
        assert_eq!(json["tiles"][1]["membership"]["kind"], "pinned");
        assert!(json["violations"].as_array().is_some_and(|v| v.is_empty()));
    }
}
