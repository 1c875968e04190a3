//! Domain model types (pure).
//!
//! File records are externally owned; the catalog is the ordered snapshot
//! the data source hands to the view.

pub mod catalog;
pub mod error;
pub mod file_record;
pub mod identifiers;

// Re-export for convenience
pub use catalog::Catalog;
pub use error::{AppError, ManifestError};
pub use file_record::{FileRecord, ReviewState};
pub use identifiers::{FileId, GroupId};
