//! The platform capability interface.
//!
//! A platform translates init / sync-finish / start / build / deploy into
//! target-specific external actions. The core only calls these methods and
//! treats their success or failure as opaque.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::PlatformError;
use crate::types::{DistManifest, PackageManifest};

/// Everything a platform operation receives.
#[derive(Debug, Clone, Copy)]
pub struct PlatformContext<'a> {
    pub workspace_root: &'a Path,
    pub app_name: &'a str,
    pub app_manifest: &'a PackageManifest,
    pub location: &'a Path,
}

/// Result of a platform build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub build_location: PathBuf,
}

pub trait Platform: Send + Sync {
    /// Name recorded in the app state (`expo`, `web`, ...).
    fn name(&self) -> &str;

    /// Workspace-relative directory an in-place platform operates in.
    /// `None` for platforms that build in an allocated location.
    fn in_place_dir(&self) -> Option<&Path> {
        None
    }

    /// Whether the platform operates directly inside the workspace.
    fn run_in_place(&self) -> bool {
        self.in_place_dir().is_some()
    }

    /// Subtree of the workspace the platform itself writes to. File events
    /// under it must never trigger a resync.
    fn local_subtree(&self, workspace_root: &Path) -> Option<PathBuf> {
        self.in_place_dir().map(|dir| workspace_root.join(dir))
    }

    /// Scaffold a fresh location. In-place platforms must be idempotent.
    fn init(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError>;

    /// Directory under `location` that synced packages are mirrored into.
    fn package_source_dir(&self, location: &Path) -> PathBuf;

    /// The manifest every merge starts from.
    fn template_manifest(&self, cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError>;

    /// Write `dist` and any entry files, then run the platform's finishing
    /// action (typically a dependency install).
    fn apply_manifest(
        &self,
        cx: &PlatformContext<'_>,
        dist: &DistManifest,
    ) -> Result<(), PlatformError>;

    /// Run the dev loop. Returns when the external process exits.
    fn start(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError>;

    fn build(&self, cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError>;

    fn deploy(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError>;
}
