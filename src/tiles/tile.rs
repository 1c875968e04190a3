//! Tile value object: one file's render handle plus its position tag.

use crate::geometry::TileBox;
use crate::model::{FileId, FileRecord};
use serde::Serialize;

/// Opaque handle issued by a [`super::RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RenderHandle(u64);

impl RenderHandle {
    /// Wrap a surface-issued raw handle.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Where a tile is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TilePosition {
    /// Normal grid flow.
    #[default]
    Grid,
    /// Overlay slot before the current file.
    Prev,
    /// Overlay focus.
    Current,
    /// Overlay slot after the current file.
    Next,
    /// Materialized but not shown (filtered out while the overlay is up).
    Hidden,
}

impl TilePosition {
    /// Whether this is one of the overlay triplet slots.
    pub fn is_overlay_slot(&self) -> bool {
        matches!(self, Self::Prev | Self::Current | Self::Next)
    }
}

/// Lazy image activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Not yet near the visible surface; nothing requested.
    #[default]
    Pending,
    /// Real image requested; waiting for the completion callback.
    Requested,
    /// Real image shown.
    Loaded,
    /// Load failed; placeholder shown. Never retried.
    Placeholder,
}

/// Which surface a tile currently presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MediaSurface {
    /// Static image.
    #[default]
    Image,
    /// Playable video, with the prior image kept as poster.
    Video {
        /// Resource state of the poster image at swap time.
        poster: ResourceState,
    },
}

impl MediaSurface {
    /// Whether a decoding resource is held.
    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }
}

/// One materialized file.
#[derive(Debug, Clone)]
pub struct Tile {
    pub(crate) file: FileRecord,
    pub(crate) handle: RenderHandle,
    pub(crate) position: TilePosition,
    pub(crate) selected: bool,
    pub(crate) resource: ResourceState,
    pub(crate) media: MediaSurface,
    pub(crate) overlay_active: bool,
    pub(crate) layout: Option<TileBox>,
    pub(crate) animation_from: Option<TilePosition>,
}

impl Tile {
    pub(crate) fn new(file: FileRecord, handle: RenderHandle, selected: bool) -> Self {
        Self {
            file,
            handle,
            position: TilePosition::Grid,
            selected,
            resource: ResourceState::Pending,
            media: MediaSurface::Image,
            overlay_active: false,
            layout: None,
            animation_from: None,
        }
    }

    pub fn file_id(&self) -> FileId {
        self.file.id
    }

    pub fn file(&self) -> &FileRecord {
        &self.file
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle
    }

    pub fn position(&self) -> TilePosition {
        self.position
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn resource(&self) -> ResourceState {
        self.resource
    }

    pub fn media(&self) -> MediaSurface {
        self.media
    }

    /// Whether the tile carries the overlay-active marker.
    pub fn is_overlay_active(&self) -> bool {
        self.overlay_active
    }

    /// Manual box from the last overlay layout pass, if any.
    pub fn layout(&self) -> Option<TileBox> {
        self.layout
    }

    /// Start point of the most recent position change, for choreography.
    pub fn animation_from(&self) -> Option<TilePosition> {
        self.animation_from
    }

    /// Whether the tile holds any overlay-only presentation state.
    pub fn has_manual_positioning(&self) -> bool {
        self.layout.is_some() || self.overlay_active || self.position.is_overlay_slot()
    }
}
