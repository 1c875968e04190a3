//! Identifier newtypes.
//!
//! File and group ids are assigned by the backend and arrive as plain
//! integers; the newtypes keep them from being mixed up with indices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one file in the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(u64);

impl FileId {
    /// Wrap a raw backend id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw backend id.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for FileId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a group (duplicate cluster, album, ...) a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u64);

impl GroupId {
    /// Wrap a raw backend id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw backend id.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
