//! ViewportController - overlay enter/navigate/exit.
//!
//! The controller owns no tiles. Every call receives the tile manager, the
//! virtual window, and the catalog through an [`OverlayContext`], and the
//! controller is the only place that pauses the window or pins ids.
//!
//! Position assignment is authoritative as soon as a call returns; the
//! surface may still be animating the previous transition.

use super::layout::{compute_compare_layout, compute_single_layout, LayoutParams};
use super::state::{OverlayMode, OverlayState};
use crate::events::{NavDirection, Notification, Notifier};
use crate::geometry::Area;
use crate::model::{Catalog, FileId};
use crate::tiles::{MediaSurface, RenderSurface, TileManager, Triplet};
use crate::window::VirtualWindow;
use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, info};

/// Collaborators the controller drives.
pub struct OverlayContext<'a, S: RenderSurface> {
    pub tiles: &'a mut TileManager<S>,
    pub window: &'a mut VirtualWindow,
    pub catalog: &'a Catalog,
}

/// Overlay state machine.
#[derive(Debug)]
pub struct ViewportController {
    state: OverlayState,
    mode: OverlayMode,
    params: LayoutParams,
    area: Area,

    navigation: Vec<FileId>,
    current_index: usize,
    triplet: Option<Triplet>,
    laid_out: Vec<FileId>,
    pending_resize: Option<(Area, Instant)>,

    notifier: Notifier,
}

impl ViewportController {
    pub fn new(params: LayoutParams, mode: OverlayMode) -> Self {
        Self {
            state: OverlayState::Inactive,
            mode,
            params,
            area: Area::default(),
            navigation: Vec::new(),
            current_index: 0,
            triplet: None,
            laid_out: Vec::new(),
            pending_resize: None,
            notifier: Notifier::new(),
        }
    }

    /// Register for overlay notifications.
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ===== Queries =====

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn area(&self) -> Area {
        self.area
    }

    /// Index of the current file within the navigation set.
    pub fn current_index(&self) -> Option<usize> {
        self.is_active().then_some(self.current_index)
    }

    pub fn current_file(&self) -> Option<FileId> {
        self.triplet.map(|t| t.current)
    }

    pub fn triplet(&self) -> Option<Triplet> {
        self.triplet
    }

    pub fn navigation_ids(&self) -> &[FileId] {
        &self.navigation
    }

    pub fn has_next(&self) -> bool {
        self.is_active() && self.current_index + 1 < self.navigation.len()
    }

    pub fn has_prev(&self) -> bool {
        self.is_active() && self.current_index > 0
    }

    // ===== Transitions =====

    /// Open the overlay on `file_id`.
    ///
    /// Returns `false` without touching anything if the overlay is already
    /// up or `file_id` is not in `navigable_ids`.
    pub fn enter<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        file_id: FileId,
        navigable_ids: &[FileId],
    ) -> bool {
        if self.state != OverlayState::Inactive {
            debug!(state = ?self.state, "enter ignored: overlay not inactive");
            return false;
        }
        let navigation = resolvable(ctx, navigable_ids);
        let Some(index) = navigation.iter().position(|id| *id == file_id) else {
            debug!(file_id = %file_id, "enter ignored: file not navigable");
            return false;
        };

        self.state = OverlayState::TransitioningEnter;
        ctx.window.pause();
        ctx.tiles.set_surface_overlay(true);
        self.navigation = navigation;
        self.current_index = index;
        self.apply_triplet(ctx);

        self.state = OverlayState::active(self.mode);
        info!(file_id = %file_id, total = self.navigation.len(), mode = ?self.mode, "Overlay entered");
        self.notifier.send(Notification::OverlayEnter {
            file_id,
            total: self.navigation.len(),
        });
        self.send_details(ctx);
        true
    }

    /// Step to the next file. `false` at the last index.
    pub fn next<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) -> bool {
        if !self.has_next() {
            return false;
        }
        self.navigate_to(ctx, self.current_index + 1, NavDirection::Next)
    }

    /// Step to the previous file. `false` at index 0.
    pub fn previous<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.navigate_to(ctx, self.current_index - 1, NavDirection::Previous)
    }

    /// Jump to an index of the navigation set.
    pub fn go_to_index<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        index: usize,
    ) -> bool {
        self.navigate_to(ctx, index, NavDirection::Jump)
    }

    /// Jump to a file of the navigation set.
    pub fn go_to_file<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        file_id: FileId,
    ) -> bool {
        match self.navigation.iter().position(|id| *id == file_id) {
            Some(index) => self.navigate_to(ctx, index, NavDirection::Jump),
            None => false,
        }
    }

    fn navigate_to<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        index: usize,
        direction: NavDirection,
    ) -> bool {
        if !self.is_active() || index >= self.navigation.len() || index == self.current_index {
            return false;
        }

        self.release_media(ctx);
        self.current_index = index;
        self.apply_triplet(ctx);
        self.send_navigate(ctx, direction);
        true
    }

    /// React to a filter change while the overlay is up.
    ///
    /// Keeps the current file if it survives the filter, otherwise falls
    /// back to the first file of `new_ids`. An empty set forces an exit.
    /// Returns whether the overlay is still active.
    pub fn update_navigation_set<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        new_ids: &[FileId],
    ) -> bool {
        if !self.is_active() {
            return false;
        }
        let navigation = resolvable(ctx, new_ids);
        if navigation.is_empty() {
            info!("Navigation set emptied, closing overlay");
            self.exit(ctx);
            return false;
        }

        let current = self.current_file();
        let index = current
            .and_then(|id| navigation.iter().position(|n| *n == id))
            .unwrap_or(0);
        if current != Some(navigation[index]) {
            self.release_media(ctx);
        }

        self.navigation = navigation;
        self.current_index = index;
        self.apply_triplet(ctx);
        self.send_navigate(ctx, NavDirection::Jump);
        true
    }

    /// Close the overlay, undoing every side effect of `enter`.
    pub fn exit<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = OverlayState::TransitioningExit;

        self.release_media(ctx);
        let touched = ctx.tiles.reset_all_to_grid();
        ctx.tiles.set_surface_overlay(false);
        ctx.window.clear_pins();
        ctx.window.resume();

        self.navigation.clear();
        self.current_index = 0;
        self.triplet = None;
        self.laid_out.clear();
        self.pending_resize = None;

        self.state = OverlayState::Inactive;
        info!(tiles_reset = touched, "Overlay exited");
        self.notifier.send(Notification::OverlayExit);
        true
    }

    /// Switch presentation mode. While active this relays out immediately.
    pub fn set_mode<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        mode: OverlayMode,
    ) -> bool {
        self.mode = mode;
        if !self.is_active() {
            return false;
        }
        self.state = OverlayState::active(mode);
        self.apply_layout(ctx);
        true
    }

    /// Change the side panel width (opening/closing the details panel).
    pub fn set_side_panel_width<S: RenderSurface>(
        &mut self,
        ctx: &mut OverlayContext<'_, S>,
        width: f32,
    ) {
        self.params.side_panel_width = width.max(0.0);
        if self.is_active() {
            self.apply_layout(ctx);
        }
    }

    // ===== Resize =====

    /// Set the overlay area without debounce (initial sizing).
    pub fn set_area<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>, area: Area) {
        self.area = area;
        self.pending_resize = None;
        if self.is_active() {
            self.apply_layout(ctx);
        }
    }

    /// Record a resize; it is applied by [`Self::tick`] once the debounce
    /// interval has passed without a newer resize.
    pub fn on_resize(&mut self, area: Area, now: Instant) {
        if self.is_active() {
            self.pending_resize = Some((area, now));
        } else {
            self.area = area;
        }
    }

    /// Apply a debounced resize if it is due. Returns whether layout ran.
    pub fn tick<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>, now: Instant) -> bool {
        let Some((area, at)) = self.pending_resize else {
            return false;
        };
        if now.saturating_duration_since(at) < self.params.resize_debounce {
            return false;
        }
        self.pending_resize = None;
        self.area = area;
        if self.is_active() {
            self.apply_layout(ctx);
            true
        } else {
            false
        }
    }

    // ===== Internals =====

    /// Recompute the triplet around `current_index` and push it everywhere.
    fn apply_triplet<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) {
        let Some(triplet) = Triplet::around(&self.navigation, self.current_index) else {
            return;
        };
        let previous = self.triplet.replace(triplet);

        // Bracketing tiles may sit far outside the last scroll window.
        let catalog = ctx.catalog;
        let base = ctx.tiles.slots().len();
        let missing: Vec<_> = triplet
            .ids()
            .filter(|id| !ctx.tiles.contains(*id))
            .filter_map(|id| catalog.get(id))
            .collect();
        ctx.tiles.insert_batch(
            missing.into_iter().enumerate().map(|(i, r)| (base + i, r)),
            &HashSet::new(),
        );

        // Overlay tiles are on screen, so their images are due now.
        ctx.tiles.activate(triplet.ids());

        ctx.window.set_pins(triplet.ids());
        ctx.tiles
            .setup_viewport(triplet.current, Some(self.navigation.as_slice()));

        if let Some(prev) = previous {
            for id in prev.ids().filter(|id| !triplet.contains(*id)) {
                ctx.tiles.set_overlay_active(id, false);
            }
        }
        for id in triplet.ids() {
            ctx.tiles.set_overlay_active(id, true);
        }

        self.apply_layout(ctx);
        self.attach_media(ctx);
    }

    /// Assign manual boxes for the current mode and clear stale ones.
    fn apply_layout<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) {
        let Some(triplet) = self.triplet else {
            return;
        };

        let mut placed = Vec::with_capacity(3);
        match self.mode {
            OverlayMode::Single => {
                let dims = ctx
                    .tiles
                    .tile(triplet.current)
                    .and_then(|t| t.file().dimensions());
                let single = compute_single_layout(self.area, dims, &self.params);
                ctx.tiles.set_layout(triplet.current, Some(single));
                placed.push(triplet.current);
            }
            OverlayMode::Compare => {
                let ids: Vec<FileId> = triplet.ids().collect();
                let layout = compute_compare_layout(self.area, ids.len(), &self.params);
                for (id, tile_box) in ids.iter().zip(layout.boxes) {
                    ctx.tiles.set_layout(*id, Some(tile_box));
                    placed.push(*id);
                }
            }
        }

        for id in &self.laid_out {
            if !placed.contains(id) {
                ctx.tiles.set_layout(*id, None);
            }
        }
        self.laid_out = placed;
    }

    /// Swap a video current tile to its playable surface.
    fn attach_media<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) {
        let Some(current) = self.current_file() else {
            return;
        };
        let Some(tile) = ctx.tiles.tile(current) else {
            return;
        };
        if tile.file().is_video() && !tile.media().is_video() {
            let poster = tile.resource();
            ctx.tiles.swap_media(current, MediaSurface::Video { poster });
        }
    }

    /// Swap the current tile back to its image before it leaves CURRENT.
    fn release_media<S: RenderSurface>(&mut self, ctx: &mut OverlayContext<'_, S>) {
        let Some(current) = self.current_file() else {
            return;
        };
        if ctx.tiles.tile(current).is_some_and(|t| t.media().is_video()) {
            ctx.tiles.swap_media(current, MediaSurface::Image);
        }
    }

    fn send_navigate<S: RenderSurface>(
        &mut self,
        ctx: &OverlayContext<'_, S>,
        direction: NavDirection,
    ) {
        let Some(file_id) = self.current_file() else {
            return;
        };
        debug!(file_id = %file_id, index = self.current_index, ?direction, "Overlay navigated");
        self.notifier.send(Notification::OverlayNavigate {
            direction,
            file_id,
            index: self.current_index,
            has_next: self.has_next(),
            has_prev: self.has_prev(),
        });
        self.send_details(ctx);
    }

    fn send_details<S: RenderSurface>(&mut self, ctx: &OverlayContext<'_, S>) {
        let Some(file_id) = self.current_file() else {
            return;
        };
        if let Some(tile) = ctx.tiles.tile(file_id) {
            self.notifier.send(Notification::DetailsChanged {
                file_id,
                file: Box::new(tile.file().clone()),
            });
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(LayoutParams::default(), OverlayMode::default())
    }
}

/// Navigation ids that can be materialized, in the given order, first
/// occurrence only.
fn resolvable<S: RenderSurface>(ctx: &OverlayContext<'_, S>, ids: &[FileId]) -> Vec<FileId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .copied()
        .filter(|id| ctx.tiles.contains(*id) || ctx.catalog.get(*id).is_some())
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
