use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::Snapshot;

/// Errors that can occur reading or writing the persisted blobs.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// JSON serialization or deserialization failure.
    SerdeError(PathBuf, serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StoreError::SerdeError(path, e) => {
                write!(f, "Invalid JSON in {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::IoError(_, e) => Some(e),
            StoreError::SerdeError(_, e) => Some(e),
        }
    }
}

/// Synchronous key-value persistence for the application snapshot.
///
/// Reads always succeed: a missing file yields the seeded default and a
/// corrupt one falls back to it with a warning. Writes are best-effort so a
/// storage failure never blocks a UI-driven mutation.
#[derive(Debug, Clone)]
pub struct LocalStore {
    data_dir: PathBuf,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("snapshot.json")
    }

    /// Reads the current snapshot, seeding a default when none exists.
    ///
    /// The seed is persisted immediately so its generated ids survive the
    /// next read.
    pub fn read_snapshot(&self) -> Snapshot {
        match self.try_read() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => self.seed(),
            Err(e) => {
                tracing::warn!("Unreadable snapshot, falling back to seeded default: {}", e);
                self.seed()
            }
        }
    }

    fn seed(&self) -> Snapshot {
        let snapshot = Snapshot::seeded();
        self.write_snapshot(&snapshot);
        snapshot
    }

    /// Persists the snapshot. Failures are logged, never returned, so the
    /// in-memory result stays usable by the caller.
    pub fn write_snapshot(&self, snapshot: &Snapshot) {
        if let Err(e) = self.try_write(snapshot) {
            tracing::warn!("Failed to persist snapshot: {}", e);
        }
    }

    fn try_read(&self) -> Result<Option<Snapshot>, StoreError> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&path).map_err(|e| StoreError::IoError(path.clone(), e))?;
        let snapshot =
            serde_json::from_str(&contents).map_err(|e| StoreError::SerdeError(path, e))?;
        Ok(Some(snapshot))
    }

    fn try_write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let path = self.snapshot_path();
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StoreError::IoError(self.data_dir.clone(), e))?;
        let contents = serde_json::to_string(snapshot)
            .map_err(|e| StoreError::SerdeError(path.clone(), e))?;
        fs::write(&path, contents).map_err(|e| StoreError::IoError(path, e))
    }
}
