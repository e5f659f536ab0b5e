//! Domain types for Globe workspaces.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Manifest types mirror the `package.json` layout: globe options live under
//! the reserved `globe` key and use camelCase field names on disk.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a workspace package (its directory name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(pub String);

impl PackageName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Manifests
// ---------------------------------------------------------------------------

/// External commands for a self-hosted (`local`) platform, each an argv list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvCommands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<Vec<String>>,
}

/// The reserved `globe` section of a package manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobeSection {
    /// Platform selector (`expo`, `web`, `dom`, or a local env directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Platform-specific option bag, opaque to the core.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub env_options: Map<String, Value>,
    #[serde(default)]
    pub globe_dependencies: Vec<PackageName>,
    #[serde(default)]
    pub module_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_build_config_vars: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_build_config_vars: Vec<String>,
    /// External package supplying workspace packages not found locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends_globe_module: Option<String>,
    /// Only meaningful on a local env package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_commands: Option<EnvCommands>,
}

/// A package's `package.json`, reduced to the fields Globe consumes.
///
/// Read fresh on every resolution; never cached across syncs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub globe: GlobeSection,
}

impl PackageManifest {
    /// Look up a string option in `globe.envOptions`.
    pub fn env_option(&self, key: &str) -> Option<&str> {
        self.globe.env_options.get(key).and_then(Value::as_str)
    }
}

/// The workspace root manifest has the same shape as any package manifest;
/// its `dependencies` pin the versions of every external module.
pub type RootManifest = PackageManifest;

/// The manifest written into a location: a template's fields plus a merged
/// `dependencies` table. Unknown template keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistManifest {
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Resolution result
// ---------------------------------------------------------------------------

/// The transitive closure of an app's workspace packages and external modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    /// Workspace package names, including the root app package.
    pub packages: BTreeSet<PackageName>,
    /// External module names that must be pinned by the root manifest.
    pub modules: BTreeSet<String>,
    /// Directory each package was read from (workspace or extends module).
    pub sources: BTreeMap<PackageName, PathBuf>,
}

impl DependencySet {
    pub fn contains(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.as_str() == name)
    }

    /// Source directories of every package in the set.
    pub fn package_dirs(&self) -> Vec<PathBuf> {
        self.sources.values().cloned().collect()
    }

    pub fn source_of(&self, name: &PackageName) -> Option<&Path> {
        self.sources.get(name).map(PathBuf::as_path)
    }
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// Where one application is materialized, and by which platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub location: PathBuf,
    pub platform_name: String,
}

/// Root of `<workspace>/.globe.state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    #[serde(default)]
    pub workspace_root_fingerprint: Option<PathBuf>,
    #[serde(default)]
    pub apps: BTreeMap<String, AppState>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn newtype_display() {
        assert_eq!(PackageName::from("ui-kit").to_string(), "ui-kit");
    }

    #[test]
    fn manifest_without_globe_section_defaults_to_empty() {
        let manifest: PackageManifest =
            serde_json::from_value(json!({ "name": "plain", "version": "1.0.0" })).unwrap();
        assert!(manifest.globe.globe_dependencies.is_empty());
        assert!(manifest.globe.module_dependencies.is_empty());
        assert!(manifest.globe.env.is_none());
    }

    #[test]
    fn globe_section_reads_camel_case_keys() {
        let manifest: PackageManifest = serde_json::from_value(json!({
            "main": "App.js",
            "globe": {
                "env": "web",
                "envOptions": { "mainServer": "server.js" },
                "globeDependencies": ["ui", "api"],
                "moduleDependencies": ["react"],
                "publicBuildConfigVars": ["API_URL"],
                "secretBuildConfigVars": ["DB_PASSWORD"],
                "extendsGlobeModule": "base-globe"
            }
        }))
        .unwrap();
        assert_eq!(manifest.globe.env.as_deref(), Some("web"));
        assert_eq!(manifest.env_option("mainServer"), Some("server.js"));
        assert_eq!(
            manifest.globe.globe_dependencies,
            vec![PackageName::from("ui"), PackageName::from("api")]
        );
        assert_eq!(manifest.globe.public_build_config_vars, vec!["API_URL"]);
        assert_eq!(manifest.globe.extends_globe_module.as_deref(), Some("base-globe"));
    }

    #[test]
    fn dist_manifest_keeps_unknown_template_keys() {
        let dist: DistManifest = serde_json::from_value(json!({
            "name": "app",
            "scripts": { "start": "node ." },
            "dependencies": { "react": "16.5.0" }
        }))
        .unwrap();
        assert_eq!(dist.dependencies["react"], "16.5.0");
        assert_eq!(dist.fields["scripts"]["start"], "node .");
        let back = serde_json::to_value(&dist).unwrap();
        assert_eq!(back["name"], "app");
    }

    #[test]
    fn workspace_state_uses_camel_case_on_disk() {
        let mut state = WorkspaceState {
            workspace_root_fingerprint: Some(PathBuf::from("/ws")),
            apps: BTreeMap::new(),
        };
        state.apps.insert(
            "shop".to_string(),
            AppState {
                location: PathBuf::from("/home/u/.globe/shop_1"),
                platform_name: "web".to_string(),
            },
        );
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["workspaceRootFingerprint"], "/ws");
        assert_eq!(value["apps"]["shop"]["platformName"], "web");
    }
}
