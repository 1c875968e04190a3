//! Overlay viewport: state machine, navigation, and layout.

pub mod controller;
pub mod layout;
pub mod state;

pub use controller::{OverlayContext, ViewportController};
pub use layout::{compute_compare_layout, compute_single_layout, CompareLayout, LayoutParams};
pub use state::{OverlayMode, OverlayState};
