//! VirtualWindow - which slice of the collection is materialized.
//!
//! The window works on a uniform grid: every tile has the same footprint,
//! so the materialized range follows directly from columns, row pitch, and
//! scroll offset. No scroll technology is assumed; callers feed it pixel
//! offsets and sizes.
//!
//! # Invariants
//! - `start_idx <= end_idx <= total`
//! - `start_idx` is a multiple of `columns` whenever `columns > 0`
//! - While paused the range does not move; inputs are recorded and applied
//!   on resume

use super::membership::Membership;
use crate::geometry::Area;
use crate::model::{Catalog, FileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use tracing::trace;

/// Fixed grid footprint used by the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Tile width in pixels.
    pub tile_width: f32,
    /// Tile height in pixels.
    pub tile_height: f32,
    /// Gap between tiles, both axes.
    pub gap: f32,
    /// Extra rows materialized above and below the visible rows.
    pub overscan: usize,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            tile_width: 200.0,
            tile_height: 200.0,
            gap: 8.0,
            overscan: 2,
        }
    }
}

/// Windowing engine over a uniform tile grid.
#[derive(Debug, Clone)]
pub struct VirtualWindow {
    geometry: GridGeometry,
    area: Area,
    scroll_offset: f32,
    total: usize,

    start_idx: usize,
    end_idx: usize,
    columns: usize,
    total_rows: usize,
    first_visible_row: usize,
    visible_rows: usize,

    paused: bool,
    stale: bool,
    deferred_total: Option<usize>,
    pinned: BTreeSet<FileId>,
}

impl VirtualWindow {
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            area: Area::default(),
            scroll_offset: 0.0,
            total: 0,
            start_idx: 0,
            end_idx: 0,
            columns: 0,
            total_rows: 0,
            first_visible_row: 0,
            visible_rows: 0,
            paused: false,
            stale: false,
            deferred_total: None,
            pinned: BTreeSet::new(),
        }
    }

    // ===== Inputs =====

    /// Change the tile footprint. Returns the new range if it moved.
    pub fn configure(&mut self, geometry: GridGeometry) -> Option<Range<usize>> {
        self.geometry = geometry;
        self.recompute()
    }

    /// Change the available area. Returns the new range if it moved.
    pub fn resize(&mut self, area: Area) -> Option<Range<usize>> {
        self.area = area;
        self.recompute()
    }

    /// Change the scroll offset in pixels. Returns the new range if it moved.
    pub fn scroll_to(&mut self, offset_px: f32) -> Option<Range<usize>> {
        self.scroll_offset = if offset_px.is_finite() {
            offset_px.max(0.0)
        } else {
            0.0
        };
        self.recompute()
    }

    /// Change the collection size. Returns the new range if it moved.
    ///
    /// While paused the new total is held back with the range, so the
    /// frozen range never points past the applied total.
    pub fn set_total(&mut self, total: usize) -> Option<Range<usize>> {
        if self.paused {
            self.deferred_total = Some(total);
            self.stale = true;
            return None;
        }
        self.total = total;
        self.recompute()
    }

    // ===== Overlay control (crate-private) =====

    /// Freeze the range. Only the overlay controller calls this.
    pub(crate) fn pause(&mut self) {
        self.paused = true;
    }

    /// Unfreeze and catch up on inputs recorded while paused.
    pub(crate) fn resume(&mut self) -> Option<Range<usize>> {
        self.paused = false;
        if let Some(total) = self.deferred_total.take() {
            self.total = total;
        }
        if std::mem::take(&mut self.stale) {
            self.recompute()
        } else {
            None
        }
    }

    /// Replace the pinned set.
    pub(crate) fn set_pins(&mut self, ids: impl IntoIterator<Item = FileId>) {
        self.pinned = ids.into_iter().collect();
    }

    pub(crate) fn clear_pins(&mut self) {
        self.pinned.clear();
    }

    // ===== Queries =====

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn start_idx(&self) -> usize {
        self.start_idx
    }

    pub fn end_idx(&self) -> usize {
        self.end_idx
    }

    /// Half-open materialized range.
    pub fn range(&self) -> Range<usize> {
        self.start_idx..self.end_idx
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether inputs changed while paused.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Pinned ids in ascending id order.
    pub fn pinned(&self) -> impl Iterator<Item = FileId> + '_ {
        self.pinned.iter().copied()
    }

    pub fn pinned_count(&self) -> usize {
        self.pinned.len()
    }

    pub fn is_pinned(&self, id: FileId) -> bool {
        self.pinned.contains(&id)
    }

    /// Membership of `id` at collection index `index`, or `None` if the id
    /// is not materialized. Pinning wins over range membership.
    pub fn membership(&self, id: FileId, index: Option<usize>) -> Option<Membership> {
        if self.pinned.contains(&id) {
            return Some(Membership::Pinned);
        }
        index
            .filter(|i| self.range().contains(i))
            .map(|index| Membership::Managed { index })
    }

    /// Every materialized id: the window range in collection order, then
    /// pinned ids that fall outside it.
    pub fn materialized(&self, catalog: &Catalog) -> Vec<(FileId, Membership)> {
        let mut out: Vec<(FileId, Membership)> = catalog
            .slice(self.range())
            .iter()
            .enumerate()
            .map(|(offset, record)| {
                let membership = if self.pinned.contains(&record.id) {
                    Membership::Pinned
                } else {
                    Membership::Managed {
                        index: self.start_idx + offset,
                    }
                };
                (record.id, membership)
            })
            .collect();
        for id in &self.pinned {
            let in_range = catalog
                .index_of(*id)
                .is_some_and(|i| self.range().contains(&i));
            if !in_range {
                out.push((*id, Membership::Pinned));
            }
        }
        out
    }

    /// Visible index range (no overscan).
    pub fn visible_range(&self) -> Range<usize> {
        self.rows_to_indices(
            self.first_visible_row,
            self.first_visible_row + self.visible_rows,
        )
    }

    /// Visible range widened by `margin_rows` on both sides, clamped to the
    /// collection. This is the lazy-activation observation area.
    pub fn proximity_range(&self, margin_rows: usize) -> Range<usize> {
        self.rows_to_indices(
            self.first_visible_row.saturating_sub(margin_rows),
            self.first_visible_row + self.visible_rows + margin_rows,
        )
    }

    // ===== Recompute =====

    fn rows_to_indices(&self, start_row: usize, end_row: usize) -> Range<usize> {
        if self.columns == 0 {
            return 0..0;
        }
        let end_row = end_row.min(self.total_rows);
        let start = (start_row * self.columns).min(self.total);
        let end = (end_row * self.columns).min(self.total).max(start);
        start..end
    }

    fn recompute(&mut self) -> Option<Range<usize>> {
        if self.paused {
            self.stale = true;
            return None;
        }

        let GridGeometry {
            tile_width,
            tile_height,
            gap,
            overscan,
        } = self.geometry;

        let col_pitch = tile_width + gap;
        self.columns = if self.area.width > 0.0 && col_pitch > 0.0 {
            ((self.area.width / col_pitch).floor() as usize).max(1)
        } else {
            0
        };
        self.total_rows = if self.columns > 0 {
            self.total.div_ceil(self.columns)
        } else {
            0
        };

        let row_pitch = tile_height + gap;
        if self.columns == 0 || self.area.height <= 0.0 || row_pitch <= 0.0 {
            self.visible_rows = 0;
            self.first_visible_row = 0;
        } else {
            // A mid-row offset exposes part of one more row at the bottom.
            let into_row = self.scroll_offset % row_pitch;
            self.visible_rows = ((self.area.height + into_row) / row_pitch).ceil() as usize;
            let max_first = self.total_rows.saturating_sub(self.visible_rows);
            self.first_visible_row =
                ((self.scroll_offset / row_pitch).floor() as usize).min(max_first);
        }

        let old = self.range();
        let new = if self.visible_rows == 0 {
            0..0
        } else {
            self.rows_to_indices(
                self.first_visible_row.saturating_sub(overscan),
                self.first_visible_row + self.visible_rows + overscan,
            )
        };
        self.start_idx = new.start;
        self.end_idx = new.end;

        if new != old {
            trace!(start = new.start, end = new.end, columns = self.columns, "Window moved");
            Some(new)
        } else {
            None
        }
    }
}

impl Default for VirtualWindow {
    fn default() -> Self {
        Self::new(GridGeometry::default())
    }
}
