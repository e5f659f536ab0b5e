//! Explicit, immutable run context.
//!
//! The workspace root and home directory are resolved once by the caller and
//! passed into every resolver, state, and sync call.

use std::path::PathBuf;

use crate::error::{state_io, StateError};
use crate::paths::{self, EXTEND_OVERRIDE_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub workspace_root: PathBuf,
    pub home_dir: PathBuf,
    /// Where an extends module is read from instead of `node_modules`.
    pub extend_override: Option<PathBuf>,
}

impl Context {
    pub fn new(workspace_root: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            home_dir: home_dir.into(),
            extend_override: None,
        }
    }

    pub fn with_extend_override(mut self, dir: Option<PathBuf>) -> Self {
        self.extend_override = dir;
        self
    }

    /// Workspace = current directory, home = `dirs::home_dir()`, override from
    /// `GLOBE_LOCAL_EXTEND_OVERRIDE`.
    pub fn from_env() -> Result<Self, StateError> {
        let cwd = std::env::current_dir().map_err(|e| state_io(".", e))?;
        let home = dirs::home_dir().ok_or(StateError::HomeNotFound)?;
        let extend_override = std::env::var_os(EXTEND_OVERRIDE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Ok(Self::new(cwd, home).with_extend_override(extend_override))
    }

    /// `<home>/.globe`
    pub fn globe_home(&self) -> PathBuf {
        paths::globe_home(&self.home_dir)
    }

    /// `<workspace>/.globe.state.json`
    pub fn state_path(&self) -> PathBuf {
        paths::state_path(&self.workspace_root)
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.workspace_root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths() {
        let ctx = Context::new("/ws", "/home/u");
        assert_eq!(ctx.globe_home(), PathBuf::from("/home/u/.globe"));
        assert_eq!(ctx.state_path(), PathBuf::from("/ws/.globe.state.json"));
        assert_eq!(ctx.package_dir("ui"), PathBuf::from("/ws/ui"));
    }
}
