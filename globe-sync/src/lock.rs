//! Per-location advisory lock.
//!
//! A sync creates `<location>/.globe.lock` exclusively and writes its pid
//! into it. Other syncs against the same location poll until the file is
//! gone or the wait window runs out. A lock whose recorded pid is no longer
//! running is left over from an interrupted sync; it is removed and the
//! acquire retried. The guard removes the file on drop.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{io_err, SyncError};

pub const LOCK_FILE: &str = ".globe.lock";
pub const DEFAULT_WAIT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Held for the duration of one sync.
#[derive(Debug)]
pub struct LocationLock {
    path: PathBuf,
}

impl LocationLock {
    pub fn acquire(location: &Path) -> Result<Self, SyncError> {
        Self::acquire_within(location, DEFAULT_WAIT)
    }

    pub fn acquire_within(location: &Path, wait: Duration) -> Result<Self, SyncError> {
        std::fs::create_dir_all(location).map_err(|e| io_err(location, e))?;
        let path = location.join(LOCK_FILE);
        let started = Instant::now();
        let mut announced = false;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    writeln!(file, "{}", std::process::id()).map_err(|e| io_err(&path, e))?;
                    tracing::debug!("acquired {}", path.display());
                    return Ok(Self { path });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    let holder = read_holder(&path);
                    if let Some(pid) = holder.filter(|pid| !is_running(*pid)) {
                        tracing::warn!(
                            "removing stale lock {} left by pid {} which is no longer running",
                            path.display(),
                            pid
                        );
                        // Another waiter may have reclaimed it already.
                        if read_holder(&path) == Some(pid) {
                            remove_stale(&path)?;
                        }
                        continue;
                    }

                    let waited = started.elapsed();
                    if waited >= wait {
                        return Err(SyncError::LocationBusy { lock: path, waited });
                    }
                    if !announced {
                        tracing::info!(
                            "waiting for sync held by pid {} on {}",
                            holder.map(|pid| pid.to_string()).unwrap_or_else(|| "?".into()),
                            path.display()
                        );
                        announced = true;
                    }
                    std::thread::sleep(POLL_INTERVAL.min(wait - waited));
                }
                Err(err) => return Err(io_err(&path, err)),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LocationLock {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!("could not release {}: {}", self.path.display(), err);
        }
    }
}

/// Pid recorded in the lock file. `None` while the holder has not written
/// it yet, or when the file vanished in between.
fn read_holder(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn is_running(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // Signal 0 only checks existence; EPERM means it exists under another user.
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_running(_pid: u32) -> bool {
    true
}

fn remove_stale(path: &Path) -> Result<(), SyncError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(path, err)),
    }
}
