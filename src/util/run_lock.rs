
use log::{debug, warn};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum RunLockError {
    #[error("run is already being processed (lock file {path:?} exists; remove it if no pipeline is running)")]
    Held { path: PathBuf },
    #[error("failed to create lock file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
}

/// Exclusive lease on one sample/run, released when dropped.
/// Held for the whole pipeline invocation so two invocations never race on derived files.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf
}

impl RunLock {
    /// Creates the lock file, failing if it already exists
    /// # Arguments
    /// * `path` - the lock file location; its parent is created if needed
    pub fn acquire(path: &Path) -> Result<Self, RunLockError> {
        let io_error = |source| RunLockError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(RunLockError::Held { path: path.to_path_buf() });
            },
            Err(e) => return Err(io_error(e))
        };
        writeln!(file, "pid={}\nacquired={}", std::process::id(), chrono::Local::now().to_rfc3339())
            .map_err(io_error)?;
        debug!("Acquired run lock {path:?}");

        Ok(Self {
            path: path.to_path_buf()
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Released run lock {:?}", self.path),
            Err(e) => warn!("Failed to remove run lock {:?}: {e}", self.path)
        }
    }
}
