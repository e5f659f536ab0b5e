//! The sync pipeline.
//!
//! ```text
//! read root manifest
//!   └─ resolve dependency set
//!        └─ pin module versions (fails before any write)
//!             └─ lock location
//!                  ├─ evict stale packages   ┐ concurrently
//!                  └─ mirror live packages   ┘
//!                       └─ merge template manifest → platform apply
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use globe_core::manifest::read_root_manifest;
use globe_core::resolver::module_versions;
use globe_core::{
    resolve, Context, DependencySet, PackageManifest, PackageName, Platform, PlatformContext,
    WorkspaceManifests,
};

use crate::error::{io_err, SyncError};
use crate::lock::LocationLock;
use crate::merge::merge_manifest;
use crate::mirror::{mirror_tree, remove_entry, MirrorStats, EXCLUDED_PREFIXES};

/// What a single sync did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub packages: BTreeSet<PackageName>,
    pub modules: BTreeSet<String>,
    /// Workspace directories the synced packages were read from.
    pub package_dirs: Vec<PathBuf>,
    /// Names evicted from the package-source directory.
    pub removed: Vec<String>,
    pub copied: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub synced_at: DateTime<Utc>,
}

/// Reconcile `location` with the current dependency set of `app_name`.
pub fn sync(
    ctx: &Context,
    platform: &dyn Platform,
    location: &Path,
    app_name: &str,
    app_manifest: &PackageManifest,
) -> Result<SyncReport, SyncError> {
    let root = read_root_manifest(ctx)?;
    let manifests = WorkspaceManifests::new(ctx, &root);
    let set = resolve(&manifests, &PackageName::from(app_name))?;
    let versions = module_versions(ctx, &set, &root)?;

    let _lock = LocationLock::acquire(location)?;

    let source_dir = platform.package_source_dir(location);
    fs::create_dir_all(&source_dir).map_err(|e| io_err(&source_dir, e))?;
    tracing::info!(
        "syncing {} package(s) for {} into {}",
        set.packages.len(),
        app_name,
        source_dir.display()
    );

    let stale = stale_entries(&source_dir, &set)?;
    let (removed, stats) = rayon::join(
        || evict(&source_dir, &stale),
        || mirror_packages(&source_dir, &set),
    );
    let removed = removed?;
    let stats = stats?;

    let cx = PlatformContext {
        workspace_root: &ctx.workspace_root,
        app_name,
        app_manifest,
        location,
    };
    let template = platform.template_manifest(&cx)?;
    let dist = merge_manifest(&template, &app_manifest.dependencies, &versions);
    platform.apply_manifest(&cx, &dist)?;

    Ok(SyncReport {
        package_dirs: set.package_dirs(),
        packages: set.packages,
        modules: set.modules,
        removed,
        copied: stats.copied,
        unchanged: stats.unchanged,
        deleted: stats.deleted,
        synced_at: Utc::now(),
    })
}

/// Entry names under `source_dir` that are not in the current set.
fn stale_entries(source_dir: &Path, set: &DependencySet) -> Result<Vec<String>, SyncError> {
    let mut stale = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(|e| io_err(source_dir, e))? {
        let entry = entry.map_err(|e| io_err(source_dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !set.contains(&name) {
            stale.push(name);
        }
    }
    stale.sort();
    Ok(stale)
}

fn evict(source_dir: &Path, stale: &[String]) -> Result<Vec<String>, SyncError> {
    stale
        .par_iter()
        .map(|name| {
            tracing::debug!("evicting {name}");
            remove_entry(&source_dir.join(name)).map(|()| name.clone())
        })
        .collect()
}

fn mirror_packages(source_dir: &Path, set: &DependencySet) -> Result<MirrorStats, SyncError> {
    set.sources
        .par_iter()
        .map(|(name, src)| {
            let stats = mirror_tree(src, &source_dir.join(name.as_str()), EXCLUDED_PREFIXES)?;
            tracing::debug!(
                "{name}: {} copied, {} unchanged, {} deleted",
                stats.copied,
                stats.unchanged,
                stats.deleted
            );
            Ok(stats)
        })
        .try_reduce(MirrorStats::default, |a, b| Ok(a.merge(b)))
}
