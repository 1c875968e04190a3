//! PositionSlider - page-based windowing cursor independent of scrolling.
//!
//! The slider divides the render area by a fixed per-density tile
//! footprint to get a window size, then lets the user move an offset over
//! the collection by dragging a thumb or paging with the keyboard.
//!
//! # Notification order
//! A `WindowSizeChanged` is always sent before any `OffsetChanged` caused by
//! the same input, so listeners never see an offset that is only valid for
//! the new size before hearing about the size.

use crate::events::{Notification, Notifier};
use crate::geometry::Area;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::debug;

/// Lower bound on the drag dispatch interval.
pub const MIN_THROTTLE: Duration = Duration::from_millis(50);

/// Discrete tile density selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityClass {
    Compact,
    #[default]
    Comfortable,
    Spacious,
}

impl std::str::FromStr for DensityClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "comfortable" => Ok(Self::Comfortable),
            "spacious" => Ok(Self::Spacious),
            other => Err(format!("unknown density class: {other}")),
        }
    }
}

/// Fixed edge size and gap of one tile for a density class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub edge: f32,
    pub gap: f32,
}

/// Footprints for every density class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityTable {
    pub compact: Footprint,
    pub comfortable: Footprint,
    pub spacious: Footprint,
}

impl DensityTable {
    pub fn footprint(&self, class: DensityClass) -> Footprint {
        match class {
            DensityClass::Compact => self.compact,
            DensityClass::Comfortable => self.comfortable,
            DensityClass::Spacious => self.spacious,
        }
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self {
            compact: Footprint { edge: 120.0, gap: 4.0 },
            comfortable: Footprint { edge: 200.0, gap: 8.0 },
            spacious: Footprint { edge: 320.0, gap: 12.0 },
        }
    }
}

/// Slider tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderConfig {
    pub densities: DensityTable,
    /// Minimum interval between throttled drag dispatches; never below
    /// [`MIN_THROTTLE`].
    pub throttle: Duration,
    /// Smallest thumb length in pixels.
    pub min_thumb: f32,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            densities: DensityTable::default(),
            throttle: Duration::from_millis(60),
            min_thumb: 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DragState {
    last_dispatch: Option<Instant>,
}

/// Paging cursor over the collection.
///
/// # Invariants
/// - `0 <= current_offset <= max(0, total_items - window_size)`
/// - `window_size > 0` whenever the area is non-empty
#[derive(Debug)]
pub struct PositionSlider {
    config: SliderConfig,
    density: DensityClass,
    area: Area,
    total_items: usize,
    window_size: usize,
    current_offset: usize,
    track_length: f32,
    drag: Option<DragState>,
    notifier: Notifier,
}

impl PositionSlider {
    pub fn new(config: SliderConfig, density: DensityClass) -> Self {
        let config = SliderConfig {
            throttle: config.throttle.max(MIN_THROTTLE),
            ..config
        };
        Self {
            config,
            density,
            area: Area::default(),
            total_items: 0,
            window_size: 0,
            current_offset: 0,
            track_length: 0.0,
            drag: None,
            notifier: Notifier::new(),
        }
    }

    /// Register for `WindowSizeChanged` / `OffsetChanged`.
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ===== Queries =====

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn current_offset(&self) -> usize {
        self.current_offset
    }

    pub fn density(&self) -> DensityClass {
        self.density
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Largest valid offset.
    pub fn limit(&self) -> usize {
        self.total_items.saturating_sub(self.window_size)
    }

    /// Index range currently shown.
    pub fn window(&self) -> std::ops::Range<usize> {
        let end = (self.current_offset + self.window_size).min(self.total_items);
        self.current_offset..end
    }

    /// Thumb length for the current track, proportional to window/total.
    pub fn thumb_length(&self) -> f32 {
        if self.total_items == 0 || self.window_size >= self.total_items {
            return self.track_length;
        }
        let proportional =
            self.track_length * self.window_size as f32 / self.total_items as f32;
        proportional.max(self.config.min_thumb).min(self.track_length)
    }

    /// Track pixels the thumb can travel.
    pub fn usable_track(&self) -> f32 {
        (self.track_length - self.thumb_length()).max(0.0)
    }

    /// Thumb top for the current offset.
    pub fn thumb_position(&self) -> f32 {
        let limit = self.limit();
        if limit == 0 {
            return 0.0;
        }
        self.usable_track() * self.current_offset as f32 / limit as f32
    }

    // ===== Size inputs =====

    /// Change the render area. Returns whether the window size changed.
    pub fn resize(&mut self, area: Area) -> bool {
        self.area = area;
        self.refresh_size()
    }

    /// Change the density class. Returns whether the window size changed.
    pub fn set_density(&mut self, density: DensityClass) -> bool {
        self.density = density;
        self.refresh_size()
    }

    /// Change the collection size, reclamping the offset.
    pub fn set_total(&mut self, total: usize) {
        self.total_items = total;
        self.reclamp();
    }

    /// Change the track length in pixels.
    pub fn set_track_length(&mut self, length: f32) {
        self.track_length = if length.is_finite() { length.max(0.0) } else { 0.0 };
    }

    fn refresh_size(&mut self) -> bool {
        let size = compute_window_size(self.area, self.config.densities.footprint(self.density));
        let changed = size != self.window_size;
        if changed {
            debug!(size, density = ?self.density, "Slider window size changed");
            self.window_size = size;
            self.notifier
                .send(Notification::WindowSizeChanged { size });
        }
        self.reclamp();
        changed
    }

    fn reclamp(&mut self) {
        let clamped = self.current_offset.min(self.limit());
        if clamped != self.current_offset {
            self.current_offset = clamped;
            self.notify_offset();
        }
    }

    fn notify_offset(&mut self) {
        self.notifier.send(Notification::OffsetChanged {
            offset: self.current_offset,
            limit: self.limit(),
        });
    }

    // ===== Offset movement =====

    /// Move to `offset`, clamped into `[0, limit]`. Never panics.
    ///
    /// Sends `OffsetChanged` only if the offset actually moved. Returns the
    /// resulting offset.
    pub fn go_to_offset(&mut self, offset: i64) -> usize {
        let clamped = clamp_offset(offset, self.limit());
        if clamped != self.current_offset {
            self.current_offset = clamped;
            self.notify_offset();
        }
        self.current_offset
    }

    /// Page forward or backward: a quarter window, or a full window with shift.
    pub fn page(&mut self, forward: bool, shift: bool) -> usize {
        let step = if shift {
            self.window_size
        } else {
            self.window_size.div_ceil(4)
        };
        let step = i64::try_from(step).unwrap_or(i64::MAX);
        let current = i64::try_from(self.current_offset).unwrap_or(i64::MAX);
        let target = if forward {
            current.saturating_add(step)
        } else {
            current.saturating_sub(step)
        };
        self.go_to_offset(target)
    }

    pub fn home(&mut self) -> usize {
        self.go_to_offset(0)
    }

    pub fn end(&mut self) -> usize {
        self.go_to_offset(i64::MAX)
    }

    // ===== Dragging =====

    /// Offset for a thumb top at `thumb_px`: linear over the usable track.
    pub fn offset_for_thumb(&self, thumb_px: f32) -> usize {
        let usable = self.usable_track();
        let limit = self.limit();
        if usable <= 0.0 || limit == 0 || !thumb_px.is_finite() {
            return 0;
        }
        let ratio = (thumb_px / usable).clamp(0.0, 1.0);
        ((ratio * limit as f32).round() as usize).min(limit)
    }

    pub fn begin_drag(&mut self) {
        self.drag = Some(DragState::default());
    }

    /// Drag the thumb to `thumb_px`.
    ///
    /// Dispatches are throttled; returns `Some(offset)` when this call
    /// dispatched and `None` when it was swallowed by the throttle (or no
    /// drag is in progress).
    pub fn drag_to(&mut self, thumb_px: f32, now: Instant) -> Option<usize> {
        let throttle = self.config.throttle;
        let drag = self.drag.as_mut()?;
        let due = drag
            .last_dispatch
            .is_none_or(|last| now.saturating_duration_since(last) >= throttle);
        if !due {
            return None;
        }
        drag.last_dispatch = Some(now);

        let offset = self.offset_for_thumb(thumb_px);
        if offset != self.current_offset {
            self.current_offset = offset;
            self.notify_offset();
        }
        Some(self.current_offset)
    }

    /// Release the thumb at `thumb_px`.
    ///
    /// The terminal offset is always dispatched, even when it equals the
    /// last throttled value. Returns the final offset.
    pub fn end_drag(&mut self, thumb_px: f32) -> usize {
        self.drag = None;
        self.current_offset = self.offset_for_thumb(thumb_px);
        self.notify_offset();
        self.current_offset
    }
}

/// Tiles that fit `area` for `footprint`; at least 1 for any non-empty area.
pub fn compute_window_size(area: Area, footprint: Footprint) -> usize {
    if area.is_empty() {
        return 0;
    }
    let pitch = footprint.edge + footprint.gap;
    if pitch <= 0.0 {
        return 1;
    }
    let cols = (((area.width + footprint.gap) / pitch).floor() as usize).max(1);
    let rows = (((area.height + footprint.gap) / pitch).floor() as usize).max(1);
    cols.saturating_mul(rows)
}

fn clamp_offset(offset: i64, limit: usize) -> usize {
    if offset <= 0 {
        0
    } else {
        usize::try_from(offset).map_or(limit, |o| o.min(limit))
    }
}

#[cfg(test)]
#[path = "slider_tests.rs"]
mod tests;
