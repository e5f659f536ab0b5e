//! The closed set of platforms, selected by `globe.env`.

use std::path::{Path, PathBuf};

use globe_core::{
    BuildOutput, Context, DistManifest, ManifestError, PackageManifest, Platform,
    PlatformContext, PlatformError,
};

use crate::dom::{self, DomPlatform};
use crate::expo::{self, ExpoPlatform};
use crate::local::LocalPlatform;
use crate::web::{self, WebPlatform};

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformKind {
    Expo(ExpoPlatform),
    Web(WebPlatform),
    Dom(DomPlatform),
    Local(LocalPlatform),
}

impl PlatformKind {
    /// Pick the platform for `app` from its manifest's `globe.env`.
    ///
    /// Built-in names win; anything else must be a workspace directory with
    /// a manifest declaring `globe.envCommands`.
    pub fn select(ctx: &Context, app: &str, manifest: &PackageManifest) -> Result<Self, ManifestError> {
        let env = manifest
            .globe
            .env
            .as_deref()
            .ok_or_else(|| ManifestError::MissingPlatform { app: app.to_string() })?;
        match env {
            expo::NAME => Ok(PlatformKind::Expo(ExpoPlatform)),
            web::NAME => Ok(PlatformKind::Web(WebPlatform)),
            dom::NAME => Ok(PlatformKind::Dom(DomPlatform)),
            other => LocalPlatform::load(&ctx.workspace_root, other)?
                .map(PlatformKind::Local)
                .ok_or_else(|| ManifestError::UnknownPlatform {
                    app: app.to_string(),
                    env: other.to_string(),
                }),
        }
    }

    fn inner(&self) -> &dyn Platform {
        match self {
            PlatformKind::Expo(p) => p,
            PlatformKind::Web(p) => p,
            PlatformKind::Dom(p) => p,
            PlatformKind::Local(p) => p,
        }
    }
}

impl Platform for PlatformKind {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn in_place_dir(&self) -> Option<&Path> {
        self.inner().in_place_dir()
    }

    fn run_in_place(&self) -> bool {
        self.inner().run_in_place()
    }

    fn local_subtree(&self, workspace_root: &Path) -> Option<PathBuf> {
        self.inner().local_subtree(workspace_root)
    }

    fn init(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        self.inner().init(cx)
    }

    fn package_source_dir(&self, location: &Path) -> PathBuf {
        self.inner().package_source_dir(location)
    }

    fn template_manifest(&self, cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError> {
        self.inner().template_manifest(cx)
    }

    fn apply_manifest(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        self.inner().apply_manifest(cx, dist)
    }

    fn start(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        self.inner().start(cx)
    }

    fn build(&self, cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError> {
        self.inner().build(cx)
    }

    fn deploy(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        self.inner().deploy(cx)
    }
}
