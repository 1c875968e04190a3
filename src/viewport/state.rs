//! Overlay state machine states.

use serde::Serialize;

/// Which overlay presentation is used when active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// One centered image, prev/next staged off-screen.
    #[default]
    Single,
    /// Up to three tiles in one equal-box row.
    Compare,
}

/// Controller state.
///
/// ```text
/// Inactive ──enter──▶ TransitioningEnter ──▶ ActiveSingle | ActiveCompare
///     ▲                                              │
///     └──────────── TransitioningExit ◀──exit────────┘
/// ```
///
/// The transitioning states only exist while `enter`/`exit` run; both
/// finish their bookkeeping before returning, so callers never observe them
/// between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayState {
    #[default]
    Inactive,
    TransitioningEnter,
    ActiveSingle,
    ActiveCompare,
    TransitioningExit,
}

impl OverlayState {
    /// Whether the overlay is up and navigable.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ActiveSingle | Self::ActiveCompare)
    }

    /// Active state for `mode`.
    pub fn active(mode: OverlayMode) -> Self {
        match mode {
            OverlayMode::Single => Self::ActiveSingle,
            OverlayMode::Compare => Self::ActiveCompare,
        }
    }
}
