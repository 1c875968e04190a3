//! Why an id is materialized.

use serde::Serialize;

/// Window membership of a materialized id.
///
/// An id that is neither in the window range nor pinned has no membership
/// at all (`Option::None` from the window), so "pinned but not
/// materialized" cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Membership {
    /// Inside `[start_idx, end_idx)`; recycled when the window moves away.
    Managed {
        /// Collection index.
        index: usize,
    },
    /// Held by the overlay regardless of scroll position.
    Pinned,
}

impl Membership {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned)
    }
}
