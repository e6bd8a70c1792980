use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock serializing read-modify-write cycles on the window state
/// file. Hold it from before the state is read until after it is saved.
///
/// Uses flock on Unix. The lock file stays on disk after release: unlinking
/// it while another process waits would leave two processes each holding a
/// lock on a different file.
pub struct FileLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another cw process may be writing")]
    Timeout { path: PathBuf },
}

impl FileLock {
    /// Lock file guarding `state_path` (same name, `.lock` extension)
    pub fn path_for(state_path: &Path) -> PathBuf {
        state_path.with_extension("lock")
    }

    /// Acquire the lock guarding `state_path`, waiting up to `timeout`.
    pub fn acquire(state_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = Self::path_for(state_path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(FileLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    tracing::warn!(path = %lock_path.display(), "timed out waiting for state lock");
                    return Err(LockError::Timeout { path: lock_path });
                }
            }
        }
    }

    /// Acquire with the default timeout (5 seconds)
    pub fn acquire_default(state_path: &Path) -> Result<Self, LockError> {
        Self::acquire(state_path, Duration::from_secs(5))
    }
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_path_sits_next_to_state() {
        let p = FileLock::path_for(Path::new("/tmp/x/.window-state.json"));
        assert_eq!(p, Path::new("/tmp/x/.window-state.lock"));
    }

    #[test]
    fn acquire_and_release() {
        let tmp = TempDir::new().unwrap();
        let state = tmp.path().join("state.json");

        let lock = FileLock::acquire_default(&state);
        assert!(lock.is_ok());
        drop(lock);

        assert!(FileLock::acquire_default(&state).is_ok());
    }

    #[test]
    fn release_keeps_lock_file_for_the_next_holder() {
        let tmp = TempDir::new().unwrap();
        let state = tmp.path().join("state.json");

        drop(FileLock::acquire_default(&state).unwrap());
        assert!(FileLock::path_for(&state).exists());
        assert!(FileLock::acquire(&state, Duration::from_millis(50)).is_ok());
    }

    #[test]
    fn contention_times_out() {
        let tmp = TempDir::new().unwrap();
        let state = tmp.path().join("state.json");

        let _held = FileLock::acquire_default(&state).unwrap();
        let second = FileLock::acquire(&state, Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Timeout { .. })));
    }
}
