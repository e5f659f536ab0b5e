//! Embedded prototype files copied into a fresh location by `init`.

use std::path::Path;

use globe_core::{DistManifest, PlatformError};
use globe_sync::atomic_write;

use crate::error::RenderError;

pub const EXPO: &[(&str, &str)] = &[(
    "package.template.json",
    include_str!("proto/expo/package.template.json"),
)];

pub const WEB: &[(&str, &str)] = &[
    ("package.template.json", include_str!("proto/web/package.template.json")),
    ("ecosystem.config.js", include_str!("proto/web/ecosystem.config.js")),
    ("app.yaml", include_str!("proto/web/app.yaml")),
];

pub const DOM: &[(&str, &str)] = &[(
    "package.template.json",
    include_str!("proto/dom/package.template.json"),
)];

/// Write every prototype file under `location`.
pub fn scaffold(location: &Path, files: &[(&str, &str)]) -> Result<(), PlatformError> {
    for (rel, body) in files {
        write_generated(&location.join(rel), body)?;
    }
    Ok(())
}

/// Hash-gated write of a generated file.
pub fn write_generated(path: &Path, body: &str) -> Result<(), PlatformError> {
    atomic_write(path, body).map_err(RenderError::from)?;
    Ok(())
}

/// Write the merged manifest as `<location>/<file>`.
pub fn write_dist(location: &Path, file: &str, dist: &DistManifest) -> Result<(), PlatformError> {
    let body = serde_json::to_string_pretty(dist)?;
    write_generated(&location.join(file), &body)
}

/// Parse the embedded `package.template.json` of a prototype set.
pub fn template(files: &[(&str, &str)]) -> Result<DistManifest, PlatformError> {
    let body = files
        .iter()
        .find(|(rel, _)| *rel == globe_core::paths::TEMPLATE_MANIFEST_FILE)
        .map(|(_, body)| *body)
        .unwrap_or("{}");
    Ok(serde_json::from_str(body)?)
}
