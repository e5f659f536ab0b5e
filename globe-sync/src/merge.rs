//! Distribution manifest merge.
//!
//! Precedence, lowest first: template dependencies, the app's own declared
//! dependencies, then versions resolved from the workspace root for every
//! required module. Non-dependency template fields pass through untouched.

use std::collections::BTreeMap;

use globe_core::DistManifest;

pub fn merge_manifest(
    template: &DistManifest,
    app_dependencies: &BTreeMap<String, String>,
    module_versions: &BTreeMap<String, String>,
) -> DistManifest {
    let mut dependencies = template.dependencies.clone();
    for layer in [app_dependencies, module_versions] {
        for (name, version) in layer {
            dependencies.insert(name.clone(), version.clone());
        }
    }
    DistManifest {
        dependencies,
        fields: template.fields.clone(),
    }
}
