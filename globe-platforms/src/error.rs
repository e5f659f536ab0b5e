//! Error types for globe-platforms.

use std::path::PathBuf;

use thiserror::Error;

use globe_core::PlatformError;
use globe_sync::SyncError;

/// Errors from rendering entry files and rewriting deploy config.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context or a manifest).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `app.yaml` could not be parsed or emitted.
    #[error("yaml error at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Writing a generated file failed.
    #[error(transparent)]
    Write(#[from] SyncError),
}

impl From<RenderError> for PlatformError {
    fn from(err: RenderError) -> Self {
        PlatformError::Other(Box::new(err))
    }
}
