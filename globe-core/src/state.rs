//! Persisted app-location state.
//!
//! # Storage layout
//!
//! ```text
//! <workspace>/
//!   .globe.state.json     (one per workspace root, ignored by git)
//! ~/.globe/
//!   <app>_<uuid>/         (dev locations, one per app incarnation)
//!   <app>_build_<uuid>/   (fresh build locations)
//! ```
//!
//! The state records the workspace root it was written for. A state file whose
//! fingerprint does not match the current root is never trusted: it is deleted
//! and treated as empty.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::{state_io, StateError};
use crate::platform::{Platform, PlatformContext};
use crate::types::{AppState, PackageManifest, WorkspaceState};

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

/// Load `<workspace>/.globe.state.json`.
///
/// A missing file yields empty state. A fingerprint mismatch deletes the file
/// and yields empty state. Any other read or parse failure propagates.
pub fn load_at(ctx: &Context) -> Result<WorkspaceState, StateError> {
    let path = ctx.state_path();
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(WorkspaceState::default()),
        Err(err) => return Err(state_io(&path, err)),
    };
    let state: WorkspaceState =
        serde_json::from_str(&contents).map_err(|source| StateError::Parse {
            path: path.clone(),
            source,
        })?;

    if state.workspace_root_fingerprint.as_deref() != Some(ctx.workspace_root.as_path()) {
        tracing::warn!(
            recorded = ?state.workspace_root_fingerprint,
            current = %ctx.workspace_root.display(),
            "workspace has moved; removing old globe state",
        );
        remove_if_exists(&path)?;
        return Ok(WorkspaceState::default());
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// 2. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the state, stamping it with the current workspace root.
///
/// Write flow: serialize → `.globe.state.json.tmp` sibling → `rename`.
pub fn save_at(ctx: &Context, state: &WorkspaceState) -> Result<(), StateError> {
    let path = ctx.state_path();
    let tmp = path.with_extension("json.tmp");

    let mut stamped = state.clone();
    stamped.workspace_root_fingerprint = Some(ctx.workspace_root.clone());
    let json = serde_json::to_string_pretty(&stamped)?;

    std::fs::write(&tmp, json).map_err(|e| state_io(&tmp, e))?;
    if let Err(err) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(state_io(&path, err));
    }
    Ok(())
}

/// Read-modify-write: record `app_state` for `app_name`, keeping other apps.
pub fn record_app(ctx: &Context, app_name: &str, app_state: AppState) -> Result<(), StateError> {
    let mut state = load_at(ctx)?;
    state.apps.insert(app_name.to_string(), app_state);
    save_at(ctx, &state)
}

// ---------------------------------------------------------------------------
// 3. Location policy
// ---------------------------------------------------------------------------

/// Decide where `app_name` is materialized.
///
/// 1. In-place platforms always get `<workspace>/<in_place_dir>`.
/// 2. With no usable previous location (none recorded, gone from disk, or
///    initialized by another platform) a fresh one is allocated under
///    `~/.globe` and initialized by the platform.
/// 3. Otherwise the previous location is reused unchanged.
pub fn resolve_location(
    ctx: &Context,
    app_name: &str,
    app_manifest: &PackageManifest,
    platform: &dyn Platform,
    previous: Option<&AppState>,
) -> Result<AppState, StateError> {
    if let Some(dir) = platform.in_place_dir() {
        return Ok(AppState {
            location: ctx.workspace_root.join(dir),
            platform_name: platform.name().to_string(),
        });
    }

    match previous {
        Some(prev) if prev.platform_name != platform.name() => {
            tracing::info!(
                app = app_name,
                from = %prev.platform_name,
                to = platform.name(),
                "platform changed; allocating a new location",
            );
        }
        Some(prev) if prev.location.is_dir() => return Ok(prev.clone()),
        Some(prev) => {
            tracing::info!(
                app = app_name,
                location = %prev.location.display(),
                "recorded location is gone; allocating a new one",
            );
        }
        None => {}
    }

    let location = allocate_location(ctx, app_name)?;
    platform.init(&PlatformContext {
        workspace_root: &ctx.workspace_root,
        app_name,
        app_manifest,
        location: &location,
    })?;
    Ok(AppState {
        location,
        platform_name: platform.name().to_string(),
    })
}

/// Create `~/.globe/<stem>_<uuid>` and return it.
pub fn allocate_location(ctx: &Context, stem: &str) -> Result<PathBuf, StateError> {
    let location = ctx
        .globe_home()
        .join(format!("{stem}_{}", uuid::Uuid::new_v4().simple()));
    std::fs::create_dir_all(&location).map_err(|e| state_io(&location, e))?;
    Ok(location)
}

// ---------------------------------------------------------------------------
// 4. Clean
// ---------------------------------------------------------------------------

/// Remove `~/.globe` and the workspace state file. Returns what was removed.
pub fn clean_at(ctx: &Context) -> Result<Vec<PathBuf>, StateError> {
    let mut removed = Vec::new();

    let home = ctx.globe_home();
    match std::fs::remove_dir_all(&home) {
        Ok(()) => removed.push(home),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(state_io(&home, err)),
    }

    let state = ctx.state_path();
    if remove_if_exists(&state)? {
        removed.push(state);
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn remove_if_exists(path: &Path) -> Result<bool, StateError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(state_io(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
