//! triage-view
//!
//! Presentation core for a media triage grid: a virtualized tile grid, a
//! page-based position slider, and a fullscreen overlay that steps through
//! files with a PREV/CURRENT/NEXT triplet.
//!
//! The core is pure state. Every visual effect goes through the
//! [`tiles::RenderSurface`] seam, so the whole view can be driven headlessly
//! (see [`tiles::HeadlessSurface`]).

pub mod config;
pub mod events;
pub mod geometry;
pub mod invariants;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod tiles;
pub mod view;
pub mod viewport;
pub mod window;
