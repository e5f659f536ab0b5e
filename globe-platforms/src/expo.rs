//! Mobile app platform driven by the Expo CLI.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use globe_core::paths::MANIFEST_FILE;
use globe_core::{BuildOutput, DistManifest, Platform, PlatformContext, PlatformError};

use crate::engine::{EntryContext, Renderer};
use crate::process;
use crate::proto;

pub const NAME: &str = "expo";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpoPlatform;

impl ExpoPlatform {
    /// Write `App.js`, `app.json` and `package.json` without installing.
    pub fn write_entries(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        let renderer = Renderer::new()?;
        let entry = renderer.render(
            "expo/App.js",
            &EntryContext {
                app_name: cx.app_name,
                main: Some(cx.app_manifest.main.as_deref().unwrap_or("index.js")),
                ..Default::default()
            },
        )?;
        proto::write_generated(&cx.location.join("App.js"), &entry)?;

        let app_json = json!({ "expo": expo_config(cx.app_manifest.globe.env_options.get("app")) });
        proto::write_generated(
            &cx.location.join("app.json"),
            &serde_json::to_string_pretty(&app_json)?,
        )?;
        proto::write_dist(cx.location, MANIFEST_FILE, dist)
    }
}

/// Default Expo app config, shallowly overridden by `envOptions.app`.
fn expo_config(overrides: Option<&Value>) -> Value {
    let mut config = json!({
        "name": "app",
        "description": "App description coming soon",
        "slug": "expo-app",
        "privacy": "unlisted",
        "sdkVersion": "30.0.0",
        "platforms": ["ios", "android"],
        "version": "0.1.0",
        "orientation": "portrait",
        "icon": "./assets/icon.png",
        "splash": {
            "image": "./assets/splash.png",
            "resizeMode": "contain",
            "backgroundColor": "#ffffff"
        },
        "updates": { "fallbackToCacheTimeout": 0 },
        "assetBundlePatterns": ["**/*"],
        "ios": { "supportsTablet": true }
    });
    if let (Some(base), Some(Value::Object(extra))) = (config.as_object_mut(), overrides) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    config
}

impl Platform for ExpoPlatform {
    fn name(&self) -> &str {
        NAME
    }

    fn init(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        proto::scaffold(cx.location, proto::EXPO)
    }

    fn package_source_dir(&self, location: &Path) -> PathBuf {
        location.join("src-sync")
    }

    fn template_manifest(&self, _cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError> {
        proto::template(proto::EXPO)
    }

    fn apply_manifest(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        self.write_entries(cx, dist)?;
        process::run("yarn", &[], cx.location, &[])
    }

    fn start(&self, cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        process::run("exp", &["start"], cx.location, &[])
    }

    fn build(&self, _cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError> {
        Err(PlatformError::Unsupported { platform: NAME.into(), action: "build" })
    }

    fn deploy(&self, _cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported { platform: NAME.into(), action: "deploy" })
    }
}
