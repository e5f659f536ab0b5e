//! External command runner.
//!
//! Commands inherit stdio and are awaited to completion. Only the exit
//! status is inspected.

use std::path::Path;
use std::process::Command;

use globe_core::PlatformError;

/// Run `program args...` in `cwd` with extra environment variables.
pub fn run(program: &str, args: &[&str], cwd: &Path, envs: &[(&str, &str)]) -> Result<(), PlatformError> {
    tracing::info!(program, ?args, cwd = %cwd.display(), "running");
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(envs.iter().copied())
        .status()
        .map_err(|source| PlatformError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(PlatformError::CommandFailed {
            program: program.to_string(),
            status,
        })
    }
}

/// Run an argv list (`["yarn", "start"]`) in `cwd`.
pub fn run_argv(argv: &[String], cwd: &Path) -> Result<(), PlatformError> {
    let Some((program, rest)) = argv.split_first() else {
        return Err(PlatformError::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    run(program, &args, cwd, &[])
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn runs_in_cwd_with_env() {
        let dir = TempDir::new().unwrap();
        run(
            "sh",
            &["-c", "printf %s \"$GREETING\" > out.txt"],
            dir.path(),
            &[("GREETING", "hi")],
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hi");
    }

    #[test]
    fn non_zero_exit_is_command_failed() {
        let dir = TempDir::new().unwrap();
        let err = run("sh", &["-c", "exit 3"], dir.path(), &[]).unwrap_err();
        match err {
            PlatformError::CommandFailed { program, status } => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("expected CommandFailed, got {other}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let err = run("globe-no-such-program", &[], dir.path(), &[]).unwrap_err();
        assert!(matches!(err, PlatformError::Spawn { .. }));
    }

    #[test]
    fn empty_argv_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(run_argv(&[], dir.path()).is_err());
    }
}
