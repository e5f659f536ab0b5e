//! Browser single-page app platform.

use std::path::{Path, PathBuf};

use globe_core::paths::MANIFEST_FILE;
use globe_core::{BuildOutput, DistManifest, Platform, PlatformContext, PlatformError};

use crate::engine::{EntryContext, Renderer};
use crate::process;
use crate::proto;

pub const NAME: &str = "dom";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomPlatform;

impl DomPlatform {
    pub fn write_entries(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        let entry = Renderer::new()?.render(
            "dom/App.js",
            &EntryContext {
                app_name: cx.app_name,
                main: Some(cx.app_manifest.main.as_deref().unwrap_or("index.js")),
                ..Default::default()
            },
        )?;
        proto::write_generated(&cx.location.join("App.js"), &entry)?;
        proto::write_dist(cx.location, MANIFEST_FILE, dist)
    }
}

impl Platform for DomPlatform {
    fn name(&self) -> &str {
        NAME
    }

    fn init(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        proto::scaffold(cx.location, proto::DOM)
    }

    fn package_source_dir(&self, location: &Path) -> PathBuf {
        location.join("src-sync")
    }

    fn template_manifest(&self, _cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError> {
        proto::template(proto::DOM)
    }

    fn apply_manifest(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        self.write_entries(cx, dist)?;
        process::run("yarn", &[], cx.location, &[])
    }

    fn start(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        process::run("yarn", &["start"], cx.location, &[])
    }

    fn build(&self, cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError> {
        process::run("yarn", &["build"], cx.location, &[])?;
        Ok(BuildOutput {
            build_location: cx.location.join("build"),
        })
    }

    fn deploy(&self, _cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported { platform: NAME.into(), action: "deploy" })
    }
}
