//! `globe build` / `globe deploy`: one-shot sync into a fresh location.
//!
//! The app's dev location is resolved and recorded first, exactly like
//! `start`; the build itself never reuses it unless the platform runs in
//! place.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Serialize;

use globe_core::{state, Context, Platform, PlatformContext};
use globe_sync::sync;

use super::{load_app, AppArgs};
use crate::output::Output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Build,
    Deploy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildResult {
    build_location: PathBuf,
    artifacts: PathBuf,
}

pub fn run(args: AppArgs, mode: BuildMode, ctx: &Context, out: &Output) -> Result<()> {
    let app = args.app.as_str();
    out.heading(match mode {
        BuildMode::Build => "Globe Build",
        BuildMode::Deploy => "Globe Deploy",
    });
    let (manifest, platform) = load_app(ctx, app)?;

    let previous = state::load_at(ctx).context("failed to read globe state")?;
    let app_state = state::resolve_location(ctx, app, &manifest, &platform, previous.apps.get(app))
        .with_context(|| format!("failed to prepare a location for \"{app}\""))?;
    state::record_app(ctx, app, app_state.clone()).context("failed to write globe state")?;

    let location = if platform.run_in_place() {
        app_state.location
    } else {
        let location = state::allocate_location(ctx, &format!("{app}_build"))
            .context("failed to allocate a build location")?;
        platform
            .init(&PlatformContext {
                workspace_root: &ctx.workspace_root,
                app_name: app,
                app_manifest: &manifest,
                location: &location,
            })
            .with_context(|| format!("{} init failed", platform.name()))?;
        location
    };
    tracing::info!(app, location = %location.display(), "building");
    let cx = PlatformContext {
        workspace_root: &ctx.workspace_root,
        app_name: app,
        app_manifest: &manifest,
        location: &location,
    };

    out.progress(format!("Synchronizing workspace to app \"{app}\" at {}", location.display()));
    let report = sync(ctx, &platform, &location, app, &manifest)
        .with_context(|| format!("sync failed for \"{app}\""))?;
    out.synced(&report);

    let built = platform
        .build(&cx)
        .with_context(|| format!("build failed for \"{app}\""))?;
    out.done(format!("Build complete {}", built.build_location.display()));

    if mode == BuildMode::Deploy {
        platform
            .deploy(&cx)
            .with_context(|| format!("deploy failed for \"{app}\""))?;
        out.done("Deploy complete");
    }

    out.result(&BuildResult {
        build_location: location.clone(),
        artifacts: built.build_location,
    })
}
