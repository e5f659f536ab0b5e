//! Error types for globe-sync.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use globe_core::{ManifestError, PlatformError};

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Manifest unreadable, or a module version missing from the root.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// The platform's apply step failed.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory walk failure while mirroring a package.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// JSON serialization error (distribution manifest).
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another sync held the location lock for the whole wait window.
    #[error("location is busy: {lock} still held after {waited:?}")]
    LocationBusy { lock: PathBuf, waited: Duration },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
