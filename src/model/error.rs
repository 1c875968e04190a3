//! Error types for the triage-view binary and its loaders.
//!
//! The presentation core itself has no error path: precondition violations
//! return `false`/`None`, and resource failures recover to a placeholder.
//! Errors only arise at the impure edges: reading configuration, setting up
//! logging, and loading a file manifest.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - top-level error returned from the binary's setup
//!   - [`crate::config::ConfigError`] - config file read/parse failures
//!   - [`crate::logging::LoggingError`] - tracing subscriber setup failures
//!   - [`ManifestError`] - manifest read/parse failures

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// All variants are fatal for the binary: they happen before any view state
/// exists, so there is nothing to degrade to.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// The file manifest could not be loaded.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

/// Errors encountered while loading a JSON manifest of file records.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("Failed to read manifest at {path:?}: {source}")]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not a JSON array of file records.
    #[error("Invalid manifest {path:?}: {reason}")]
    Parse {
        /// Manifest path.
        path: PathBuf,
        /// Parser message, including line/column.
        reason: String,
    },
}
