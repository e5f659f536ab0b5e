//! Self-hosted platform defined by an env package inside the workspace.
//!
//! `globe.env` names a workspace directory whose `package.json` carries
//! `globe.envCommands`. The app runs in place at `<workspace>/<env>`; the
//! merged manifest goes to `package.dist.json` so the env package's own
//! manifest is never overwritten.

use std::path::{Path, PathBuf};

use globe_core::manifest::read_manifest;
use globe_core::paths::{manifest_path, TEMPLATE_MANIFEST_FILE};
use globe_core::types::EnvCommands;
use globe_core::{
    BuildOutput, DistManifest, ManifestError, Platform, PlatformContext, PlatformError,
};

use crate::process;
use crate::proto;

pub const DIST_MANIFEST_FILE: &str = "package.dist.json";

#[derive(Debug, Clone, PartialEq)]
pub struct LocalPlatform {
    env: String,
    env_dir: PathBuf,
    commands: EnvCommands,
}

impl LocalPlatform {
    /// Load the env package `<workspace>/<env>`. `Ok(None)` when the directory
    /// has no manifest or the manifest declares no `envCommands`.
    pub fn load(workspace_root: &Path, env: &str) -> Result<Option<Self>, ManifestError> {
        let env_dir = workspace_root.join(env);
        let path = manifest_path(&env_dir);
        if !path.is_file() {
            return Ok(None);
        }
        let manifest = read_manifest(&path)?;
        Ok(manifest.globe.env_commands.map(|commands| LocalPlatform {
            env: env.to_string(),
            env_dir,
            commands,
        }))
    }

    fn command(&self, action: &'static str, argv: &Option<Vec<String>>) -> Result<Vec<String>, PlatformError> {
        argv.clone()
            .filter(|argv| !argv.is_empty())
            .ok_or_else(|| PlatformError::Unsupported {
                platform: self.env.clone(),
                action,
            })
    }
}

impl Platform for LocalPlatform {
    fn name(&self) -> &str {
        &self.env
    }

    fn in_place_dir(&self) -> Option<&Path> {
        Some(Path::new(&self.env))
    }

    fn init(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        std::fs::create_dir_all(cx.location).map_err(|e| PlatformError::io(cx.location, e))
    }

    fn package_source_dir(&self, location: &Path) -> PathBuf {
        location.join("src-sync")
    }

    fn template_manifest(&self, _cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError> {
        let path = self.env_dir.join(TEMPLATE_MANIFEST_FILE);
        match std::fs::read_to_string(&path) {
            Ok(body) => Ok(serde_json::from_str(&body)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(DistManifest::default()),
            Err(err) => Err(PlatformError::io(&path, err)),
        }
    }

    fn apply_manifest(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        proto::write_dist(cx.location, DIST_MANIFEST_FILE, dist)?;
        match &self.commands.install {
            Some(argv) if !argv.is_empty() => process::run_argv(argv, cx.location),
            _ => Ok(()),
        }
    }

    fn start(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        process::run_argv(&self.command("start", &self.commands.start)?, cx.location)
    }

    fn build(&self, cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError> {
        process::run_argv(&self.command("build", &self.commands.build)?, cx.location)?;
        Ok(BuildOutput {
            build_location: cx.location.join("build"),
        })
    }

    fn deploy(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        process::run_argv(&self.command("deploy", &self.commands.deploy)?, cx.location)
    }
}
