//! File records supplied by the data source.
//!
//! The core never fetches or mutates these; it keeps clones inside tiles so
//! the details panel can be fed on enter/navigate.

use super::identifiers::{FileId, GroupId};
use serde::{Deserialize, Serialize};

/// Review state assigned by the user during triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Not looked at yet.
    #[default]
    Unreviewed,
    /// Marked to keep.
    Kept,
    /// Marked for discard.
    Discarded,
    /// Flagged for a second look.
    Flagged,
}

/// One file of the collection, as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Backend id.
    pub id: FileId,

    /// MIME type, e.g. `image/jpeg` or `video/mp4`.
    pub mime: String,

    /// Groups this file belongs to.
    #[serde(default)]
    pub group_ids: Vec<GroupId>,

    /// Current review state.
    #[serde(default)]
    pub review: ReviewState,

    /// Intrinsic pixel width, when the backend knows it.
    #[serde(default)]
    pub width: Option<u32>,

    /// Intrinsic pixel height, when the backend knows it.
    #[serde(default)]
    pub height: Option<u32>,

    /// Thumbnail resource requested on lazy activation.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl FileRecord {
    /// Record with just an id and a mime type.
    pub fn new(id: FileId, mime: impl Into<String>) -> Self {
        Self {
            id,
            mime: mime.into(),
            group_ids: Vec::new(),
            review: ReviewState::default(),
            width: None,
            height: None,
            thumbnail_url: None,
        }
    }

    /// Builder: set intrinsic dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Builder: set group membership.
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.group_ids = groups.into_iter().collect();
        self
    }

    /// Whether this file plays as video in the overlay.
    pub fn is_video(&self) -> bool {
        self.mime.starts_with("video/")
    }

    /// Intrinsic dimensions, if both are known and non-zero.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }
}
