//! End-to-end sync against a temp workspace and a recording platform.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{json, Value};
use tempfile::TempDir;

use globe_core::{
    BuildOutput, Context, DistManifest, ManifestError, PackageManifest, Platform,
    PlatformContext, PlatformError,
};
use globe_sync::{atomic_write, sync, SyncError};

/// Writes the merged manifest to `<location>/package.json` and remembers it.
#[derive(Default)]
struct RecordingPlatform {
    applied: Mutex<Vec<DistManifest>>,
}

impl RecordingPlatform {
    fn applied(&self) -> Vec<DistManifest> {
        self.applied.lock().unwrap().clone()
    }
}

impl Platform for RecordingPlatform {
    fn name(&self) -> &str {
        "recording"
    }

    fn init(&self, _cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        Ok(())
    }

    fn package_source_dir(&self, location: &Path) -> PathBuf {
        location.join("src-sync")
    }

    fn template_manifest(&self, _cx: &PlatformContext<'_>) -> Result<DistManifest, PlatformError> {
        Ok(serde_json::from_value(json!({
            "name": "dist",
            "dependencies": { "react": "15.0.0", "expo": "30.0.0" }
        }))?)
    }

    fn apply_manifest(&self, cx: &PlatformContext<'_>, dist: &DistManifest) -> Result<(), PlatformError> {
        let body = serde_json::to_string_pretty(dist)?;
        atomic_write(&cx.location.join("package.json"), &body)
            .map_err(|e| PlatformError::Other(Box::new(e)))?;
        self.applied.lock().unwrap().push(dist.clone());
        Ok(())
    }

    fn start(&self, _cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        Ok(())
    }

    fn build(&self, cx: &PlatformContext<'_>) -> Result<BuildOutput, PlatformError> {
        Ok(BuildOutput { build_location: cx.location.to_path_buf() })
    }

    fn deploy(&self, _cx: &PlatformContext<'_>) -> Result<(), PlatformError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

struct Fixture {
    _tmp: TempDir,
    ctx: Context,
    location: PathBuf,
}

impl Fixture {
    fn new(root_deps: Value) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().join("ws");
        let home = tmp.path().join("home");
        let location = home.join(".globe").join("app_test");
        fs::create_dir_all(&ws).unwrap();
        fs::create_dir_all(&location).unwrap();
        write_json(&ws.join("package.json"), &json!({ "name": "ws", "dependencies": root_deps }));
        Self {
            ctx: Context::new(&ws, &home),
            _tmp: tmp,
            location,
        }
    }

    fn package(&self, name: &str, globe_deps: &[&str], modules: &[&str]) -> &Self {
        let dir = self.ctx.workspace_root.join(name);
        write_json(
            &dir.join("package.json"),
            &json!({
                "name": name,
                "globe": { "globeDependencies": globe_deps, "moduleDependencies": modules }
            }),
        );
        fs::write(dir.join("index.js"), format!("module.exports = '{name}';")).unwrap();
        self
    }

    fn app_manifest(&self, name: &str) -> PackageManifest {
        let path = self.ctx.workspace_root.join(name).join("package.json");
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    fn synced(&self, rel: &str) -> PathBuf {
        self.location.join("src-sync").join(rel)
    }
}

fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn initial_sync_mirrors_closure_and_merges_manifest() {
    let fx = Fixture::new(json!({ "lodash": "4.17.21", "react": "16.5.0" }));
    fx.package("app", &["ui"], &["react"])
        .package("ui", &["theme"], &["lodash"])
        .package("theme", &[], &[])
        .package("unrelated", &[], &[]);
    let platform = RecordingPlatform::default();

    let report = sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();

    assert_eq!(report.packages.len(), 3);
    assert!(fx.synced("app/index.js").is_file());
    assert!(fx.synced("ui/package.json").is_file());
    assert!(fx.synced("theme/index.js").is_file());
    assert!(!fx.synced("unrelated").exists());

    let applied = platform.applied();
    assert_eq!(applied.len(), 1);
    let deps = &applied[0].dependencies;
    assert_eq!(deps["react"], "16.5.0", "root version beats template");
    assert_eq!(deps["lodash"], "4.17.21");
    assert_eq!(deps["expo"], "30.0.0");
    assert!(fx.location.join("package.json").is_file());
    assert!(!fx.location.join(".globe.lock").exists(), "lock released");
}

#[test]
fn dropped_dependency_is_evicted_and_others_untouched() {
    let fx = Fixture::new(json!({}));
    fx.package("app", &["a", "b"], &[]).package("a", &[], &[]).package("b", &[], &[]);
    let platform = RecordingPlatform::default();
    sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();
    assert!(fx.synced("b").is_dir());

    fx.package("app", &["a"], &[]);
    let report = sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();

    assert!(!fx.synced("b").exists());
    assert!(fx.synced("a/index.js").is_file());
    assert_eq!(report.removed, vec!["b".to_string()]);
    assert!(report.copied >= 1, "the rewritten app manifest is recopied");
    assert!(report.unchanged >= 2, "package a is left alone");
}

#[test]
fn missing_module_version_fails_before_touching_destination() {
    let fx = Fixture::new(json!({ "react": "16.5.0" }));
    fx.package("app", &[], &["react", "left-pad"]);
    fs::create_dir_all(fx.synced("stale")).unwrap();
    let platform = RecordingPlatform::default();

    let err = sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap_err();

    match err {
        SyncError::Manifest(ManifestError::MissingModuleVersion { module, .. }) => {
            assert_eq!(module, "left-pad")
        }
        other => panic!("expected missing module version, got {other}"),
    }
    assert!(fx.synced("stale").is_dir(), "no eviction on a failing sync");
    assert!(!fx.synced("app").exists(), "no copy on a failing sync");
    assert!(platform.applied().is_empty());
    assert!(!fx.location.join("package.json").exists());
}

#[test]
fn unreadable_dependency_manifest_is_manifest_error() {
    let fx = Fixture::new(json!({}));
    fx.package("app", &["ghost"], &[]);
    let platform = RecordingPlatform::default();

    let err = sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap_err();
    assert!(
        matches!(err, SyncError::Manifest(ManifestError::NotFound { .. })),
        "got: {err}"
    );
}

#[test]
fn packages_missing_locally_come_from_extends_override() {
    let fx = Fixture::new(json!({}));
    let root = fx.ctx.workspace_root.join("package.json");
    write_json(&root, &json!({ "name": "ws", "globe": { "extendsGlobeModule": "shared-globe" } }));
    fx.package("app", &["auth"], &[]);

    let extends = fx.ctx.home_dir.join("shared");
    write_json(&extends.join("auth/package.json"), &json!({ "name": "auth" }));
    fs::write(extends.join("auth/login.js"), "login").unwrap();
    let ctx = fx.ctx.clone().with_extend_override(Some(extends.clone()));
    let platform = RecordingPlatform::default();

    let report = sync(&ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();

    assert_eq!(fs::read_to_string(fx.synced("auth/login.js")).unwrap(), "login");
    assert!(report.package_dirs.contains(&extends.join("auth")));
}

#[test]
fn resync_without_changes_copies_nothing() {
    let fx = Fixture::new(json!({}));
    fx.package("app", &["a"], &[]).package("a", &[], &[]);
    let platform = RecordingPlatform::default();

    sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();
    let report = sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();

    assert_eq!(report.copied, 0);
    assert_eq!(report.unchanged, 4);
    assert_eq!(report.deleted, 0);
    assert!(report.removed.is_empty());
}

#[cfg(unix)]
#[test]
fn lock_left_by_interrupted_sync_does_not_block_the_next_one() {
    let fx = Fixture::new(json!({}));
    fx.package("app", &[], &[]);
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let dead = child.id();
    child.wait().unwrap();
    fs::write(fx.location.join(".globe.lock"), format!("{dead}\n")).unwrap();
    let platform = RecordingPlatform::default();

    let report = sync(&fx.ctx, &platform, &fx.location, "app", &fx.app_manifest("app")).unwrap();

    assert_eq!(report.packages.len(), 1);
    assert!(!fx.location.join(".globe.lock").exists(), "lock released after sync");
}
