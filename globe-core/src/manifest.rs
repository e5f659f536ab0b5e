//! Package manifest reading.
//!
//! Manifests are read from disk on every call. The [`ManifestSource`] trait is
//! the seam the resolver walks through, so tests can count reads or serve
//! manifests from memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::context::Context;
use crate::error::ManifestError;
use crate::paths::manifest_path;
use crate::types::{PackageManifest, PackageName, RootManifest};

/// Where package manifests come from.
pub trait ManifestSource {
    /// Directory holding `package`'s files.
    fn package_dir(&self, package: &PackageName) -> PathBuf;

    /// Read and parse `package`'s manifest.
    fn read(&self, package: &PackageName) -> Result<PackageManifest, ManifestError> {
        read_manifest(&manifest_path(&self.package_dir(package)))
    }
}

/// Manifests of a workspace on disk, falling back to the extends module for
/// packages that do not exist locally.
#[derive(Debug, Clone)]
pub struct WorkspaceManifests {
    workspace_root: PathBuf,
    extends_dir: Option<PathBuf>,
}

impl WorkspaceManifests {
    /// `root` is the workspace root manifest; its `globe.extendsGlobeModule`
    /// decides whether a fallback directory exists at all.
    pub fn new(ctx: &Context, root: &RootManifest) -> Self {
        let extends_dir = root.globe.extends_globe_module.as_ref().map(|module| {
            ctx.extend_override
                .clone()
                .unwrap_or_else(|| ctx.workspace_root.join("node_modules").join(module))
        });
        Self {
            workspace_root: ctx.workspace_root.clone(),
            extends_dir,
        }
    }

    /// The directory packages missing locally are read from, if any.
    pub fn extends_dir(&self) -> Option<&Path> {
        self.extends_dir.as_deref()
    }
}

impl ManifestSource for WorkspaceManifests {
    fn package_dir(&self, package: &PackageName) -> PathBuf {
        let local = self.workspace_root.join(package.as_str());
        match &self.extends_dir {
            Some(extends) if !local.exists() => extends.join(package.as_str()),
            _ => local,
        }
    }
}

/// Read a manifest file, mapping a missing file to [`ManifestError::NotFound`].
pub fn read_manifest(path: &Path) -> Result<PackageManifest, ManifestError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(ManifestError::Read {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    serde_json::from_str(&contents).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `<workspace>/package.json`
pub fn read_root_manifest(ctx: &Context) -> Result<RootManifest, ManifestError> {
    read_manifest(&manifest_path(&ctx.workspace_root))
}

/// `<workspace>/<app>/package.json`. Apps are always local to the workspace.
pub fn read_app_manifest(ctx: &Context, app: &str) -> Result<PackageManifest, ManifestError> {
    read_manifest(&manifest_path(&ctx.package_dir(app)))
}
