//! Persistent state writer seam.
//!
//! ERROR HANDLING
//! ==============
//! Teardown treats store failures according to the configured persistence
//! policy; the store itself only reports them. Keys are board ids in string
//! form, one payload per key.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The key would escape the storage root.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    /// The underlying write failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes serialized board state under a board-id key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Persist `payload` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the key is invalid or the write fails.
    async fn store(&self, key: &str, payload: &str) -> Result<(), StoreError>;
}

/// One file per board id under a fixed directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn store(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(key);
        tokio::fs::write(&path, payload).await?;
        info!(key, bytes = payload.len(), "board state written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
