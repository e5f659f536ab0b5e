use std::path::{Path, PathBuf};

pub const GLOBE_HOME_DIR: &str = ".globe";
pub const STATE_FILE: &str = ".globe.state.json";
pub const MANIFEST_FILE: &str = "package.json";
pub const TEMPLATE_MANIFEST_FILE: &str = "package.template.json";
pub const EXTEND_OVERRIDE_ENV: &str = "GLOBE_LOCAL_EXTEND_OVERRIDE";

/// `<home>/.globe`
pub fn globe_home(home: &Path) -> PathBuf {
    home.join(GLOBE_HOME_DIR)
}

/// `<workspace>/.globe.state.json`
pub fn state_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(STATE_FILE)
}

/// `<dir>/package.json`
pub fn manifest_path(package_dir: &Path) -> PathBuf {
    package_dir.join(MANIFEST_FILE)
}
