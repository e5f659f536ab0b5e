//! Server-rendered web platform (Razzle build, App Engine deploy).
//!
//! Deploy rewrites `app.yaml` so the deployed server can read its build
//! config from two JSON env variables:
//!
//! - `PUBLIC_CONFIG_JSON`: `publicBuildConfigVars` from the process env
//! - `SECRET_CONFIG_JSON`: `secretBuildConfigVars` from the process env
//!
//! Each object carries `_configType`. A secret `SQL_INSTANCE_CONNECTION_NAME`
//! also sets `beta_settings.cloud_sql_instances`.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value as Json};
use serde_yaml::{Mapping, Value as Yaml};

use globe_core::paths::MANIFEST_FILE;
use globe_core::{
    BuildOutput, DistManifest, PackageManifest, Platform, PlatformContext, PlatformError,
};

use crate::engine::{EntryContext, Renderer};
use crate::error::RenderError;
use crate::process;
use crate::proto;

pub const NAME: &str = "web";
const SQL_INSTANCE_VAR: &str = "SQL_INSTANCE_CONNECTION_NAME";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebPlatform;

impl WebPlatform {
    /// Write `src/server.js`, `src/client.js` and `package.json`.
    pub fn write_entries(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        let ctx = EntryContext {
            app_name: cx.app_name,
            main_server: Some(required_option(cx.app_manifest, "mainServer")?),
            main_client: Some(required_option(cx.app_manifest, "mainClient")?),
            ..Default::default()
        };
        let renderer = Renderer::new()?;
        let src = cx.location.join("src");
        proto::write_generated(&src.join("server.js"), &renderer.render("web/server.js", &ctx)?)?;
        proto::write_generated(&src.join("client.js"), &renderer.render("web/client.js", &ctx)?)?;
        proto::write_dist(cx.location, MANIFEST_FILE, dist)
    }
}

fn required_option<'a>(manifest: &'a PackageManifest, key: &str) -> Result<&'a str, PlatformError> {
    manifest
        .env_option(key)
        .ok_or_else(|| PlatformError::InvalidOptions {
            platform: NAME.into(),
            message: format!("globe.envOptions.{key} is required"),
        })
}

// ---------------------------------------------------------------------------
// app.yaml rewrite
// ---------------------------------------------------------------------------

/// Collect `vars` from `lookup` into a config object tagged with `kind`.
/// Unset variables are left out.
fn config_object(kind: &str, vars: &[String], lookup: &dyn Fn(&str) -> Option<String>) -> Map<String, Json> {
    let mut config = Map::new();
    config.insert("_configType".into(), Json::from(kind));
    for var in vars {
        if let Some(value) = lookup(var) {
            config.insert(var.clone(), Json::from(value));
        }
    }
    config
}

/// Rewrite `app_yaml` in place with the public and secret build config.
pub fn rewrite_app_yaml(
    app_yaml: &Path,
    manifest: &PackageManifest,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<(), PlatformError> {
    let raw = std::fs::read_to_string(app_yaml).map_err(|e| PlatformError::io(app_yaml, e))?;
    let yaml_err = |source| RenderError::Yaml {
        path: app_yaml.to_path_buf(),
        source,
    };
    let mut doc: Mapping = if raw.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(&raw).map_err(yaml_err)?
    };

    let public = config_object("public", &manifest.globe.public_build_config_vars, lookup);
    let secret = config_object("secret", &manifest.globe.secret_build_config_vars, lookup);

    if !matches!(doc.get("env_variables"), Some(Yaml::Mapping(_))) {
        doc.insert(Yaml::from("env_variables"), Yaml::Mapping(Mapping::new()));
    }
    if let Some(Yaml::Mapping(env)) = doc.get_mut("env_variables") {
        env.insert(
            Yaml::from("PUBLIC_CONFIG_JSON"),
            Yaml::from(Json::Object(public).to_string()),
        );
        env.insert(
            Yaml::from("SECRET_CONFIG_JSON"),
            Yaml::from(Json::Object(secret.clone()).to_string()),
        );
    }

    if let Some(Json::String(instance)) = secret.get(SQL_INSTANCE_VAR) {
        let mut beta = Mapping::new();
        beta.insert(Yaml::from("cloud_sql_instances"), Yaml::from(instance.as_str()));
        doc.insert(Yaml::from("beta_settings"), Yaml::Mapping(beta));
    }

    let body = serde_yaml::to_string(&doc).map_err(yaml_err)?;
    proto::write_generated(app_yaml, &body)
}

impl Platform for WebPlatform {
    fn name(&self) -> &str {
        NAME
    }

    fn init(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        proto::scaffold(cx.location, proto::WEB)
    }

    fn package_source_dir(&self, location: &Path) -> PathBuf {
        location.join("src").join("sync")
    }

    fn template_manifest(&self, _cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError> {
        proto::template(proto::WEB)
    }

    fn apply_manifest(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        self.write_entries(cx, dist)?;
        process::run("yarn", &[], cx.location, &[])
    }

    fn start(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        process::run("yarn", &["start-dev"], cx.location, &[])
    }

    fn build(&self, cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError> {
        let razzle = cx.location.join("node_modules/razzle/bin/razzle.js");
        // CI=true turns every bundler warning into a failure.
        process::run(&razzle.to_string_lossy(), &["build"], cx.location, &[("CI", "false")])?;
        Ok(BuildOutput {
            build_location: cx.location.join("build"),
        })
    }

    fn deploy(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        rewrite_app_yaml(&cx.location.join("app.yaml"), cx.app_manifest, &|var| {
            std::env::var(var).ok()
        })?;
        process::run("gcloud", &["app", "deploy", "-q"], cx.location, &[])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
