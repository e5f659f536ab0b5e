//! Transitive dependency resolution over package manifests.
//!
//! Depth-first from the app package. Each package's manifest is read at most
//! once per resolution; the visited set is threaded explicitly through the
//! walk. A re-encountered package is a no-op. When the package is still on
//! the current walk stack the edge closes a cycle, which is logged and
//! otherwise ignored.

use std::collections::{BTreeMap, BTreeSet};

use crate::context::Context;
use crate::error::ManifestError;
use crate::manifest::ManifestSource;
use crate::types::{DependencySet, PackageName, RootManifest};

/// Resolve the packages and external modules `app` transitively requires.
pub fn resolve<S: ManifestSource + ?Sized>(
    source: &S,
    app: &PackageName,
) -> Result<DependencySet, ManifestError> {
    let mut set = DependencySet::default();
    let mut visited = BTreeSet::new();
    let mut stack = Vec::new();
    visit(source, app, &mut visited, &mut stack, &mut set)?;
    Ok(set)
}

fn visit<S: ManifestSource + ?Sized>(
    source: &S,
    package: &PackageName,
    visited: &mut BTreeSet<PackageName>,
    stack: &mut Vec<PackageName>,
    set: &mut DependencySet,
) -> Result<(), ManifestError> {
    if !visited.insert(package.clone()) {
        if let Some(parent) = stack.last().filter(|_| stack.contains(package)) {
            tracing::warn!(
                from = %parent,
                to = %package,
                "cyclic globe dependency; ignoring back edge",
            );
        }
        return Ok(());
    }

    let manifest = source.read(package)?;
    set.packages.insert(package.clone());
    set.sources.insert(package.clone(), source.package_dir(package));
    set.packages
        .extend(manifest.globe.globe_dependencies.iter().cloned());
    set.modules
        .extend(manifest.globe.module_dependencies.iter().cloned());

    stack.push(package.clone());
    for dep in &manifest.globe.globe_dependencies {
        visit(source, dep, visited, stack, set)?;
    }
    stack.pop();
    Ok(())
}

/// Pin every module in `set` to the version declared by the workspace root
/// manifest. Fails on the first module the root does not declare.
pub fn module_versions(
    ctx: &Context,
    set: &DependencySet,
    root: &RootManifest,
) -> Result<BTreeMap<String, String>, ManifestError> {
    set.modules
        .iter()
        .map(|module| match root.dependencies.get(module) {
            Some(version) => Ok((module.clone(), version.clone())),
            None => Err(ManifestError::MissingModuleVersion {
                module: module.clone(),
                workspace_root: ctx.workspace_root.clone(),
            }),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    use crate::types::{GlobeSection, PackageManifest};

    /// In-memory manifests that count reads per package.
    #[derive(Default)]
    struct MemorySource {
        manifests: HashMap<String, PackageManifest>,
        reads: RefCell<HashMap<String, usize>>,
    }

    impl MemorySource {
        fn with(mut self, name: &str, deps: &[&str], modules: &[&str]) -> Self {
            let manifest = PackageManifest {
                globe: GlobeSection {
                    globe_dependencies: deps.iter().map(|d| PackageName::from(*d)).collect(),
                    module_dependencies: modules.iter().map(|m| m.to_string()).collect(),
                    ..GlobeSection::default()
                },
                ..PackageManifest::default()
            };
            self.manifests.insert(name.to_string(), manifest);
            self
        }

        fn reads_of(&self, name: &str) -> usize {
            self.reads.borrow().get(name).copied().unwrap_or(0)
        }
    }

    impl ManifestSource for MemorySource {
        fn package_dir(&self, package: &PackageName) -> PathBuf {
            PathBuf::from("/ws").join(package.as_str())
        }

        fn read(&self, package: &PackageName) -> Result<PackageManifest, ManifestError> {
            *self.reads.borrow_mut().entry(package.0.clone()).or_default() += 1;
            self.manifests
                .get(package.as_str())
                .cloned()
                .ok_or_else(|| ManifestError::NotFound {
                    path: self.package_dir(package).join("package.json"),
                })
        }
    }

    fn names(set: &DependencySet) -> Vec<&str> {
        set.packages.iter().map(PackageName::as_str).collect()
    }

    #[test]
    fn leaf_app_resolves_to_itself() {
        let source = MemorySource::default().with("app", &[], &[]);
        let set = resolve(&source, &"app".into()).unwrap();
        assert_eq!(names(&set), vec!["app"]);
        assert!(set.modules.is_empty());
        assert_eq!(set.source_of(&"app".into()), Some(PathBuf::from("/ws/app").as_path()));
    }

    #[test]
    fn diamond_reads_shared_package_once() {
        let source = MemorySource::default()
            .with("a", &["b", "c"], &["react"])
            .with("b", &["d"], &[])
            .with("c", &["d"], &["lodash"])
            .with("d", &[], &["react", "moment"]);
        let set = resolve(&source, &"a".into()).unwrap();
        assert_eq!(names(&set), vec!["a", "b", "c", "d"]);
        assert_eq!(
            set.modules.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["lodash", "moment", "react"]
        );
        assert_eq!(source.reads_of("d"), 1);
    }

    #[test]
    fn cycle_is_deduplicated_not_an_error() {
        let source = MemorySource::default()
            .with("app", &["x"], &[])
            .with("x", &["y"], &[])
            .with("y", &["x", "app"], &[]);
        let set = resolve(&source, &"app".into()).unwrap();
        assert_eq!(names(&set), vec!["app", "x", "y"]);
        for name in ["app", "x", "y"] {
            assert_eq!(source.reads_of(name), 1, "{name} read more than once");
        }
    }

    #[test]
    fn missing_dependency_manifest_fails() {
        let source = MemorySource::default().with("app", &["ghost"], &[]);
        let err = resolve(&source, &"app".into()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn module_versions_fail_fast_on_unpinned_module() {
        let ctx = Context::new("/ws", "/home/u");
        let mut set = DependencySet::default();
        set.modules.insert("react".to_string());
        set.modules.insert("left-pad".to_string());
        let mut root = RootManifest::default();
        root.dependencies.insert("react".to_string(), "16.5.0".to_string());

        let err = module_versions(&ctx, &set, &root).unwrap_err();
        match err {
            ManifestError::MissingModuleVersion { module, .. } => assert_eq!(module, "left-pad"),
            other => panic!("unexpected error: {other}"),
        }

        root.dependencies.insert("left-pad".to_string(), "1.3.0".to_string());
        let pinned = module_versions(&ctx, &set, &root).unwrap();
        assert_eq!(pinned["react"], "16.5.0");
        assert_eq!(pinned["left-pad"], "1.3.0");
    }
}
