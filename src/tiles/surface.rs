//! The render target seam.
//!
//! The core only ever pushes presentation changes through this trait; it
//! never reads layout back. Movement between positions is the surface's
//! animation concern: the stored position on the tile is authoritative the
//! moment `move_tile` is called, whether or not the animation has finished.

use super::tile::{MediaSurface, RenderHandle, TilePosition};
use crate::geometry::TileBox;
use crate::model::FileRecord;

/// A render target that can host tiles.
pub trait RenderSurface {
    /// Build an off-surface render element for `file`.
    fn create_handle(&mut self, file: &FileRecord) -> RenderHandle;

    /// Tear down an element and anything it holds.
    fn destroy_handle(&mut self, handle: RenderHandle);

    /// Attach freshly built elements in one layout pass.
    fn attach_batch(&mut self, handles: &[RenderHandle]);

    /// Start loading the real image. Completion comes back through
    /// `TileManager::resource_loaded`.
    fn request_image(&mut self, handle: RenderHandle, file: &FileRecord);

    /// Swap in the placeholder after a failed load.
    fn show_placeholder(&mut self, handle: RenderHandle);

    /// Retarget a tile from one position to another.
    fn move_tile(&mut self, handle: RenderHandle, from: TilePosition, to: TilePosition);

    /// Apply (or clear, with `None`) a manual overlay box.
    fn place_tile(&mut self, handle: RenderHandle, layout: Option<TileBox>);

    /// Toggle the overlay-active marker on a tile, or on the whole surface
    /// when `handle` is `None`.
    fn set_overlay_marker(&mut self, handle: Option<RenderHandle>, active: bool);

    /// Swap between the static image and a playable media element.
    fn swap_media(&mut self, handle: RenderHandle, media: MediaSurface);
}

/// Surface for when no render target exists. Every call is a no-op.
#[derive(Debug, Default)]
pub struct NullSurface {
    next_handle: u64,
}

impl RenderSurface for NullSurface {
    fn create_handle(&mut self, _file: &FileRecord) -> RenderHandle {
        self.next_handle += 1;
        RenderHandle::new(self.next_handle)
    }

    fn destroy_handle(&mut self, _handle: RenderHandle) {}

    fn attach_batch(&mut self, _handles: &[RenderHandle]) {}

    fn request_image(&mut self, _handle: RenderHandle, _file: &FileRecord) {}

    fn show_placeholder(&mut self, _handle: RenderHandle) {}

    fn move_tile(&mut self, _handle: RenderHandle, _from: TilePosition, _to: TilePosition) {}

    fn place_tile(&mut self, _handle: RenderHandle, _layout: Option<TileBox>) {}

    fn set_overlay_marker(&mut self, _handle: Option<RenderHandle>, _active: bool) {}

    fn swap_media(&mut self, _handle: RenderHandle, _media: MediaSurface) {}
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Create(RenderHandle),
    Destroy(RenderHandle),
    AttachBatch(Vec<RenderHandle>),
    RequestImage(RenderHandle),
    Placeholder(RenderHandle),
    Move {
        handle: RenderHandle,
        from: TilePosition,
        to: TilePosition,
    },
    Place {
        handle: RenderHandle,
        layout: Option<TileBox>,
    },
    OverlayMarker {
        handle: Option<RenderHandle>,
        active: bool,
    },
    SwapMedia {
        handle: RenderHandle,
        media: MediaSurface,
    },
}

/// In-memory surface that records every call, for tests and the headless CLI.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    next_handle: u64,
    ops: Vec<SurfaceOp>,
    surface_overlay: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Forget recorded calls (handles keep counting).
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Number of `attach_batch` calls recorded.
    pub fn attach_calls(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::AttachBatch(_)))
            .count()
    }

    /// Whether the surface-level overlay marker is set.
    pub fn overlay_marked(&self) -> bool {
        self.surface_overlay
    }
}

impl RenderSurface for HeadlessSurface {
    fn create_handle(&mut self, _file: &FileRecord) -> RenderHandle {
        self.next_handle += 1;
        let handle = RenderHandle::new(self.next_handle);
        self.ops.push(SurfaceOp::Create(handle));
        handle
    }

    fn destroy_handle(&mut self, handle: RenderHandle) {
        self.ops.push(SurfaceOp::Destroy(handle));
    }

    fn attach_batch(&mut self, handles: &[RenderHandle]) {
        self.ops.push(SurfaceOp::AttachBatch(handles.to_vec()));
    }

    fn request_image(&mut self, handle: RenderHandle, _file: &FileRecord) {
        self.ops.push(SurfaceOp::RequestImage(handle));
    }

    fn show_placeholder(&mut self, handle: RenderHandle) {
        self.ops.push(SurfaceOp::Placeholder(handle));
    }

    fn move_tile(&mut self, handle: RenderHandle, from: TilePosition, to: TilePosition) {
        self.ops.push(SurfaceOp::Move { handle, from, to });
    }

    fn place_tile(&mut self, handle: RenderHandle, layout: Option<TileBox>) {
        self.ops.push(SurfaceOp::Place { handle, layout });
    }

    fn set_overlay_marker(&mut self, handle: Option<RenderHandle>, active: bool) {
        if handle.is_none() {
            self.surface_overlay = active;
        }
        self.ops.push(SurfaceOp::OverlayMarker { handle, active });
    }

    fn swap_media(&mut self, handle: RenderHandle, media: MediaSurface) {
        self.ops.push(SurfaceOp::SwapMedia { handle, media });
    }
}
