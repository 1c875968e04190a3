//! Windowing: the scroll-driven materialization window and the paging slider.

pub mod membership;
pub mod slider;
pub mod virtual_window;

pub use membership::Membership;
pub use slider::{
    compute_window_size, DensityClass, DensityTable, Footprint, PositionSlider, SliderConfig,
};
pub use virtual_window::{GridGeometry, VirtualWindow};
