//! Exclusive lock over a data directory.
//!
//! Held for the duration of an export run. The lock is process-safe and is
//! released when the [`StoreLock`] is dropped.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Name of the lock file inside the data directory.
const LOCK_FILE_NAME: &str = ".export.lock";

/// An exclusive lock on a data directory.
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Acquire the lock, waiting for other processes to release it.
    ///
    /// The blocking lock call runs inside `spawn_blocking` so the tokio
    /// runtime keeps serving other tasks while waiting.
    pub async fn acquire(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let path = data_dir.join(LOCK_FILE_NAME);
        let lock_path = path.clone();

        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&lock_path)
                .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to lock {}", lock_path.display()))?;
            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        tracing::debug!(target: "registry::lock", "Acquired store lock {}", path.display());

        Ok(Self {
            file,
            path,
        })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lock_is_released_on_drop() {
        let temp = TempDir::new().unwrap();

        let lock = StoreLock::acquire(temp.path()).await.unwrap();
        assert!(temp.path().join(LOCK_FILE_NAME).exists());
        drop(lock);

        let again = tokio::time::timeout(Duration::from_secs(5), StoreLock::acquire(temp.path()))
            .await
            .expect("lock should be free after drop");
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_creates_missing_data_dir() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("nested").join("data");
        let _lock = StoreLock::acquire(&data_dir).await.unwrap();
        assert!(data_dir.is_dir());
    }
}
