//! Which file events count towards a resync.

use std::path::{Path, PathBuf};

/// An event qualifies when its path is under a tracked package directory
/// and not under any ignored subtree.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    ignored: Vec<PathBuf>,
    tracked: Vec<PathBuf>,
}

impl EventFilter {
    pub fn new(ignored: impl IntoIterator<Item = PathBuf>, tracked: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            ignored: ignored.into_iter().map(canonical).collect(),
            tracked: tracked.into_iter().map(canonical).collect(),
        }
    }

    /// Replace the tracked package directories after a resync.
    pub fn set_tracked(&mut self, tracked: impl IntoIterator<Item = PathBuf>) {
        self.tracked = tracked.into_iter().map(canonical).collect();
    }

    pub fn tracked(&self) -> &[PathBuf] {
        &self.tracked
    }

    pub fn qualifies(&self, path: &Path) -> bool {
        !self.ignored.iter().any(|dir| path.starts_with(dir))
            && self.tracked.iter().any(|dir| path.starts_with(dir))
    }
}

// Event paths arrive as real paths (e.g. /private/var/... on macOS).
fn canonical(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path).unwrap_or(path)
}
