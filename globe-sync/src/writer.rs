//! Generated files (entry points, merged manifests, prototypes) are only
//! replaced when their content actually differs from what is on disk.
//!
//! Content is compared by SHA-256 after folding CRLF to LF. A differing file
//! is staged next to its target as `<name>.globe.tmp` and renamed over it, so
//! bundlers watching a location never see a half-written file and never
//! reload on a sync that changed nothing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: content matches what is already on disk.
    Unchanged { path: PathBuf },
}

/// Replace `path` with `content` unless the file already holds it.
pub fn atomic_write(path: &Path, content: &str) -> Result<WriteResult, SyncError> {
    replace_if_changed(path, content, &staging_path(path))
}

/// `<path>.globe.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".globe.tmp");
    PathBuf::from(name)
}

fn replace_if_changed(target: &Path, content: &str, staging: &Path) -> Result<WriteResult, SyncError> {
    let content = content.replace("\r\n", "\n");
    let wanted = Sha256::digest(content.as_bytes());

    let on_disk = match std::fs::read(target) {
        Ok(bytes) => Some(Sha256::digest(&bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(io_err(target, err)),
    };
    if on_disk.as_ref() == Some(&wanted) {
        tracing::debug!("unchanged: {}", target.display());
        return Ok(WriteResult::Unchanged {
            path: target.to_path_buf(),
        });
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    std::fs::write(staging, &content).map_err(|e| io_err(staging, e))?;
    std::fs::rename(staging, target).map_err(|e| {
        let _ = std::fs::remove_file(staging);
        io_err(target, e)
    })?;

    tracing::info!("wrote {} ({})", target.display(), &hex::encode(wanted)[..12]);
    Ok(WriteResult::Written {
        path: target.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn mtime(path: &Path) -> std::time::SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn missing_entry_file_is_created() {
        let tmp = TempDir::new().unwrap();
        let entry = tmp.path().join("App.js");

        let result = atomic_write(&entry, "export default App;").unwrap();

        assert_eq!(result, WriteResult::Written { path: entry.clone() });
        assert_eq!(fs::read_to_string(&entry).unwrap(), "export default App;");
    }

    #[test]
    fn identical_manifest_is_left_alone() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("package.json");
        atomic_write(&manifest, "{\n  \"name\": \"app\"\n}").unwrap();
        let before = mtime(&manifest);

        sleep(Duration::from_millis(20));
        let result = atomic_write(&manifest, "{\n  \"name\": \"app\"\n}").unwrap();

        assert_eq!(result, WriteResult::Unchanged { path: manifest.clone() });
        assert_eq!(mtime(&manifest), before, "a no-op sync must not touch the file");
    }

    #[test]
    fn edited_entry_replaces_previous_content() {
        let tmp = TempDir::new().unwrap();
        let server = tmp.path().join("server.js");
        atomic_write(&server, "import Server from './sync/site/a.js';").unwrap();

        let result = atomic_write(&server, "import Server from './sync/site/b.js';").unwrap();

        assert!(matches!(result, WriteResult::Written { .. }));
        assert!(fs::read_to_string(&server).unwrap().ends_with("b.js';"));
    }

    #[test]
    fn windows_line_endings_do_not_count_as_a_change() {
        let tmp = TempDir::new().unwrap();
        let yaml = tmp.path().join("app.yaml");

        atomic_write(&yaml, "runtime: nodejs\r\nenv: flex\r\n").unwrap();
        let again = atomic_write(&yaml, "runtime: nodejs\nenv: flex\n").unwrap();

        assert!(matches!(again, WriteResult::Unchanged { .. }));
        assert_eq!(fs::read_to_string(&yaml).unwrap(), "runtime: nodejs\nenv: flex\n");
    }

    #[test]
    fn nested_target_gets_its_directory_and_no_staging_file_remains() {
        let tmp = TempDir::new().unwrap();
        let client = tmp.path().join("src").join("client.js");

        atomic_write(&client, "startClient();").unwrap();

        assert!(client.is_file());
        let staged = PathBuf::from(format!("{}.globe.tmp", client.display()));
        assert!(!staged.exists());
    }

    #[test]
    #[cfg(unix)]
    fn unwritable_location_keeps_old_file_and_drops_staging_file() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let location = root.path().join("location");
        fs::create_dir_all(&location).unwrap();
        let entry = location.join("App.js");
        fs::write(&entry, "old entry").unwrap();
        fs::set_permissions(&location, fs::Permissions::from_mode(0o555)).unwrap();

        let staging = TempDir::new().unwrap();
        let staged = staging.path().join("App.js.globe.tmp");
        let result = replace_if_changed(&entry, "new entry", &staged);

        fs::set_permissions(&location, fs::Permissions::from_mode(0o755)).unwrap();

        // Root ignores directory permissions, so only a failed write is checked.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&entry).unwrap(), "old entry");
            assert!(!staged.exists());
        }
    }
}
