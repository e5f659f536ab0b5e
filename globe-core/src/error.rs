//! Error types for globe-core.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors from reading manifests, selecting a platform, or pinning module
/// versions. Always surfaced before any destination write for a sync.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file did not exist at the expected path.
    #[error("failed to read package file at \"{path}\": not found")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure other than not-found.
    #[error("failed to read package file at \"{path}\": {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON: includes file path and line context from serde_json.
    #[error("failed to parse package file at \"{path}\": {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The app manifest has no `globe.env`.
    #[error("no platform env specified in package.json globe.env for \"{app}\"")]
    MissingPlatform { app: String },

    /// `globe.env` names neither a built-in platform nor a local env package.
    #[error("failed to load platform env \"{env}\" as specified in package.json globe.env for \"{app}\"")]
    UnknownPlatform { app: String, env: String },

    /// A module dependency is not pinned by the workspace root manifest.
    #[error("cannot find dependency \"{module}\" inside package.json for globe at {workspace_root}")]
    MissingModuleVersion {
        module: String,
        workspace_root: PathBuf,
    },
}

/// Errors from the persisted workspace state and location allocation.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// State file exists but is not valid JSON.
    #[error("failed to parse globe state at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (write path).
    #[error("state serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.globe/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The platform failed to initialize a freshly allocated location.
    #[error("platform init failed: {0}")]
    Platform(#[from] PlatformError),
}

/// Errors raised by platform adapters. Opaque to the core: whichever
/// pipeline step invoked the adapter treats them as fatal.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("platform JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform \"{platform}\": {message}")]
    InvalidOptions { platform: String, message: String },

    #[error("platform \"{platform}\" does not support {action}")]
    Unsupported {
        platform: String,
        action: &'static str,
    },

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PlatformError {
    /// Convenience constructor for [`PlatformError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlatformError::Io {
            path: path.into(),
            source,
        }
    }
}

pub(crate) fn state_io(path: impl Into<PathBuf>, source: std::io::Error) -> StateError {
    StateError::Io {
        path: path.into(),
        source,
    }
}
