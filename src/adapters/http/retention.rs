//! Periodic removal of stale files.

use std::fs::DirEntry;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub fn days(days: u64) -> Duration {
    Duration::from_secs(days * 24 * 60 * 60)
}

/// Delete regular files in `dir` older than `max_age`. Returns how many went.
///
/// Only failing to list `dir` is an error; a file that cannot be inspected or
/// removed is logged and skipped.
pub fn sweep(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = ?dir, "Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();

        match expired(&entry, now, max_age) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!(path = ?path, "Skipping file: {}", e);
                continue;
            }
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted old file {:?}", path);
                removed += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "Already gone");
            }
            Err(e) => warn!(path = ?path, "Could not delete old file: {}", e),
        }
    }
    Ok(removed)
}

fn expired(entry: &DirEntry, now: SystemTime, max_age: Duration) -> io::Result<bool> {
    let metadata = entry.metadata()?;
    if !metadata.is_file() {
        return Ok(false);
    }
    let born = metadata.created().or_else(|_| metadata.modified())?;
    Ok(now.duration_since(born).unwrap_or_default() > max_age)
}

/// Sweep `dirs` every hour for the lifetime of the runtime.
pub fn spawn(dirs: Vec<PathBuf>, max_age: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;

            let dirs = dirs.clone();
            let swept = tokio::task::spawn_blocking(move || {
                for dir in &dirs {
                    match sweep(dir, max_age) {
                        Ok(removed) => debug!(dir = ?dir, removed, "Retention sweep done"),
                        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                        Err(e) => warn!(dir = ?dir, "Retention sweep failed: {}", e),
                    }
                }
            })
            .await;

            if let Err(e) = swept {
                warn!("Retention sweep aborted: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sweep_keeps_recent_files() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("clip.mp4"), "data").unwrap();

        assert_eq!(sweep(temp_dir.path(), days(2)).unwrap(), 0);
        assert!(temp_dir.path().join("clip.mp4").exists());
    }

    #[test]
    fn test_sweep_removes_expired_files_only() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("clip.mp4"), "data").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(sweep(temp_dir.path(), Duration::from_millis(1)).unwrap(), 1);
        assert!(!temp_dir.path().join("clip.mp4").exists());
        assert!(temp_dir.path().join("nested").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_sweep_continues_past_undeletable_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let locked = temp_dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("stuck.mp4"), "data").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores directory permissions: nothing to observe then.
        let still_writable = std::fs::write(locked.join("canary"), "x").is_ok();
        let result = sweep(&locked, Duration::from_millis(1));
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        if still_writable {
            return;
        }

        assert_eq!(result.unwrap(), 0);
        assert!(locked.join("stuck.mp4").exists());
    }

    #[test]
    fn test_sweep_of_missing_dir_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let result = sweep(&temp_dir.path().join("absent"), days(2));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_days() {
        assert_eq!(days(2), Duration::from_secs(172_800));
    }
}
