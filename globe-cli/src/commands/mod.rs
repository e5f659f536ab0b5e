pub mod build;
pub mod clean;
pub mod start;

use anyhow::{Context as _, Result};
use clap::Args;

use globe_core::manifest::read_app_manifest;
use globe_core::{Context, PackageManifest};
use globe_platforms::PlatformKind;

/// Arguments shared by every per-app command.
#[derive(Args, Debug)]
pub struct AppArgs {
    /// Name of the app package in the workspace.
    pub app: String,
}

/// Read the app manifest and pick its platform.
pub(crate) fn load_app(ctx: &Context, app: &str) -> Result<(PackageManifest, PlatformKind)> {
    let manifest = read_app_manifest(ctx, app)
        .with_context(|| format!("failed to load app \"{app}\""))?;
    let platform = PlatformKind::select(ctx, app, &manifest)?;
    Ok((manifest, platform))
}
