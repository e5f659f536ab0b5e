//! `globe start`: locate, sync, then watch while the platform's dev loop
//! runs. A failed resync ends the command with a non-zero exit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;

use globe_core::manifest::read_app_manifest;
use globe_core::{state, Context, Platform, PlatformContext, PlatformError};
use globe_platforms::PlatformKind;
use globe_sync::{sync, SyncError};
use globe_watch::{watch, EventFilter, WatchError, DEBOUNCE_WINDOW};

use super::{load_app, AppArgs};
use crate::output::Output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartResult {
    location: PathBuf,
    resyncs: usize,
}

/// How the dev session ended.
enum Finished {
    Platform(Result<Result<(), PlatformError>, tokio::task::JoinError>),
    Watch(Result<usize, WatchError>),
}

pub fn run(args: AppArgs, ctx: &Context, out: &Output) -> Result<()> {
    let app = args.app;
    out.heading("Globe Start");
    let (manifest, platform) = load_app(ctx, &app)?;
    let platform = Arc::new(platform);

    let previous = state::load_at(ctx).context("failed to read globe state")?;
    let app_state = state::resolve_location(
        ctx,
        &app,
        &manifest,
        platform.as_ref(),
        previous.apps.get(&app),
    )
    .with_context(|| format!("failed to prepare a location for \"{app}\""))?;
    state::record_app(ctx, &app, app_state.clone()).context("failed to write globe state")?;
    let location = app_state.location;
    tracing::info!(app = %app, location = %location.display(), platform = platform.name(), "starting");

    out.progress(format!("Synchronizing workspace to app \"{app}\" at {}", location.display()));
    let report = sync(ctx, platform.as_ref(), &location, &app, &manifest)
        .with_context(|| format!("sync failed for \"{app}\""))?;
    out.synced(&report);

    let mut roots = vec![ctx.workspace_root.clone()];
    roots.extend(ctx.extend_override.clone());
    let filter = EventFilter::new(
        platform.local_subtree(&ctx.workspace_root),
        report.package_dirs.clone(),
    );
    let resync = {
        let ctx = ctx.clone();
        let platform = platform.clone();
        let app = app.clone();
        let location = location.clone();
        let out = *out;
        move || -> Result<Vec<PathBuf>, SyncError> {
            out.progress(format!("Synchronizing workspace to app \"{app}\" at {}", location.display()));
            let manifest = read_app_manifest(&ctx, &app)?;
            let report = sync(&ctx, platform.as_ref(), &location, &app, &manifest)?;
            out.synced(&report);
            Ok(report.package_dirs)
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let outcome = runtime.block_on(dev_session(
        &roots,
        filter,
        resync,
        platform,
        ctx.workspace_root.clone(),
        app,
        manifest,
        location.clone(),
        out,
    ));
    // The platform's dev process may still be running on a blocking thread
    // after a failed resync; do not wait for it.
    runtime.shutdown_background();

    let resyncs = outcome?;
    out.done("Dev session ended");
    out.result(&StartResult { location, resyncs })
}

#[allow(clippy::too_many_arguments)]
async fn dev_session<F>(
    roots: &[PathBuf],
    filter: EventFilter,
    resync: F,
    platform: Arc<PlatformKind>,
    workspace_root: PathBuf,
    app: String,
    manifest: globe_core::PackageManifest,
    location: PathBuf,
    out: &Output,
) -> Result<usize>
where
    F: FnMut() -> Result<Vec<PathBuf>, SyncError> + Send + 'static,
{
    let mut handle = watch(roots, filter, DEBOUNCE_WINDOW, resync).context("failed to watch workspace")?;
    for root in roots {
        out.progress(format!("Watching {} for changes", root.display()));
    }

    let mut start_task = tokio::task::spawn_blocking(move || {
        platform.start(&PlatformContext {
            workspace_root: &workspace_root,
            app_name: &app,
            app_manifest: &manifest,
            location: &location,
        })
    });

    let finished = tokio::select! {
        started = &mut start_task => Finished::Platform(started),
        stopped = handle.stopped() => Finished::Watch(stopped),
    };

    match finished {
        Finished::Platform(started) => {
            let resyncs = handle.close().await.context("watch loop failed")?;
            started
                .map_err(|err| anyhow!("platform start task failed: {err}"))?
                .context("platform start failed")?;
            Ok(resyncs)
        }
        Finished::Watch(Ok(resyncs)) => Err(anyhow!("watch loop stopped unexpectedly after {resyncs} resync(s)")),
        Finished::Watch(Err(err)) => {
            tracing::error!(error = %err, "watch loop failed; abandoning the dev process");
            Err(anyhow::Error::new(err).context("error after file change sync"))
        }
    }
}
