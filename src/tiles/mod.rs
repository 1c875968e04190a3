//! Tile pool: value objects, the render surface seam, and the manager.

pub mod manager;
pub mod surface;
pub mod tile;
pub mod triplet;

pub use manager::{LoadOutcome, RenderOptions, TileManager};
pub use surface::{HeadlessSurface, NullSurface, RenderSurface, SurfaceOp};
pub use tile::{MediaSurface, RenderHandle, ResourceState, Tile, TilePosition};
pub use triplet::Triplet;
