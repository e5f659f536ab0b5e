//! Package tree mirroring.
//!
//! Copies a package directory into its destination, skipping files whose
//! length and mtime already match, preserving source mtimes on copy, and
//! deleting destination entries that no longer exist in the source.
//! Entries whose name starts with an excluded prefix are neither copied nor
//! deleted, at any depth.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use walkdir::WalkDir;

use crate::error::{io_err, SyncError};

/// Generated dependency directories and previously-synced subtrees.
pub const EXCLUDED_PREFIXES: &[&str] = &["node_modules", "src-sync"];

/// Per-package mirroring counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub copied: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

impl MirrorStats {
    pub fn merge(self, other: MirrorStats) -> MirrorStats {
        MirrorStats {
            copied: self.copied + other.copied,
            unchanged: self.unchanged + other.unchanged,
            deleted: self.deleted + other.deleted,
        }
    }
}

/// Mirror `src` into `dest`.
pub fn mirror_tree(src: &Path, dest: &Path, excludes: &[&str]) -> Result<MirrorStats, SyncError> {
    if !src.is_dir() {
        return Err(io_err(
            src,
            std::io::Error::new(ErrorKind::NotFound, "package directory does not exist"),
        ));
    }
    fs::create_dir_all(dest).map_err(|e| io_err(dest, e))?;

    let mut stats = MirrorStats::default();
    let mut seen = HashSet::<PathBuf>::new();

    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_excluded(e.file_name(), excludes));
    for entry in walker {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path()).to_path_buf();
        let target = dest.join(&rel);
        let ty = entry.file_type();

        if ty.is_dir() {
            if target.is_file() || target.is_symlink() {
                fs::remove_file(&target).map_err(|e| io_err(&target, e))?;
            }
            fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
        } else if ty.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            stats.copied += 1;
        } else {
            let meta = entry.metadata()?;
            if is_up_to_date(&meta, &target) {
                stats.unchanged += 1;
            } else {
                copy_file(entry.path(), &target, &meta)?;
                stats.copied += 1;
            }
        }
        seen.insert(rel);
    }

    stats.deleted = prune(dest, &seen, excludes)?;
    Ok(stats)
}

/// Remove a synced entry (package directory or stray file).
pub fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(io_err(path, err)),
    };
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| io_err(path, e))
}

pub fn is_excluded(name: &OsStr, excludes: &[&str]) -> bool {
    name.to_str()
        .map(|name| excludes.iter().any(|prefix| name.starts_with(prefix)))
        .unwrap_or(false)
}

fn is_up_to_date(src_meta: &fs::Metadata, target: &Path) -> bool {
    let Ok(dest_meta) = fs::symlink_metadata(target) else {
        return false;
    };
    dest_meta.is_file()
        && dest_meta.len() == src_meta.len()
        && FileTime::from_last_modification_time(&dest_meta)
            == FileTime::from_last_modification_time(src_meta)
}

fn copy_file(src: &Path, target: &Path, meta: &fs::Metadata) -> Result<(), SyncError> {
    if target.is_dir() && !target.is_symlink() {
        fs::remove_dir_all(target).map_err(|e| io_err(target, e))?;
    } else if target.is_symlink() {
        fs::remove_file(target).map_err(|e| io_err(target, e))?;
    }
    fs::copy(src, target).map_err(|e| io_err(target, e))?;
    filetime::set_file_mtime(target, FileTime::from_last_modification_time(meta))
        .map_err(|e| io_err(target, e))?;
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> Result<(), SyncError> {
    let link = fs::read_link(src).map_err(|e| io_err(src, e))?;
    if fs::read_link(target).ok().as_deref() == Some(link.as_path()) {
        return Ok(());
    }
    remove_entry(target)?;
    std::os::unix::fs::symlink(&link, target).map_err(|e| io_err(target, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, target: &Path) -> Result<(), SyncError> {
    let meta = fs::metadata(src).map_err(|e| io_err(src, e))?;
    copy_file(src, target, &meta)
}

/// Delete everything under `dest` that was not seen in the source walk.
fn prune(dest: &Path, seen: &HashSet<PathBuf>, excludes: &[&str]) -> Result<usize, SyncError> {
    let mut stale = Vec::new();
    let mut walker = WalkDir::new(dest)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_excluded(e.file_name(), excludes));
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(dest).unwrap_or(entry.path());
        if seen.contains(rel) {
            continue;
        }
        if entry.file_type().is_dir() {
            walker.skip_current_dir();
        }
        stale.push(entry.path().to_path_buf());
    }

    for path in &stale {
        tracing::debug!("pruning: {}", path.display());
        remove_entry(path)?;
    }
    Ok(stale.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
