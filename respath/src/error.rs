//! Error types for resource resolution and scanning.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

/// Result type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors that can occur while enumerating roots, resolving resources or
/// scanning a search space.
///
/// None of these are retried internally. Recovery (falling back to default
/// content, skipping a scenario) belongs to the caller.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A root URI could not be turned into a navigable location.
    #[error("cannot resolve root '{uri}': {reason}")]
    RootResolution { uri: String, reason: String },

    /// No candidate location exists for the requested path.
    #[error("resource not found: {path}")]
    ResourceNotFound { path: String },

    /// An archive exists but its virtual filesystem could not be opened.
    #[error("failed to open archive {}: {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    /// Unexpected I/O failure while walking a root. Aborts the whole scan.
    #[error("I/O error while scanning {}: {source}", path.display())]
    ScanIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A resolved resource could not be opened or read.
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ResourceError {
    /// Create a not-found error for the given path string.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::ResourceNotFound { path: path.into() }
    }

    /// Check whether this error means the resource simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}
