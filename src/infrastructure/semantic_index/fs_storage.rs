//! Filesystem-backed index persistence

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::semantic::{FlatIndex, IndexStorage};

/// Persists each index as a JSON blob `{name}.index.json` under a directory.
///
/// An unreadable blob is logged and treated the same as an absent one, so a
/// format change across versions costs the acceleration, not the request
/// path.
#[derive(Debug)]
pub struct FsIndexStorage {
    dir: PathBuf,
}

impl FsIndexStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.index.json", name))
    }
}

#[async_trait]
impl IndexStorage for FsIndexStorage {
    async fn save(&self, name: &str, index: &FlatIndex) -> Result<(), DomainError> {
        let blob = serde_json::to_vec(index)
            .map_err(|e| DomainError::storage(format!("Failed to serialize index: {}", e)))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DomainError::storage(format!("Failed to create index dir {:?}: {}", self.dir, e))
        })?;

        let path = self.blob_path(name);
        tokio::fs::write(&path, blob)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to write {:?}: {}", path, e)))?;

        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<FlatIndex>, DomainError> {
        let path = self.blob_path(name);

        let blob = match tokio::fs::read(&path).await {
            Ok(blob) => blob,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {:?}: {}",
                    path, e
                )));
            }
        };

        match serde_json::from_slice(&blob) {
            Ok(index) => Ok(Some(index)),
            Err(e) => {
                warn!(index = name, "Persisted index unreadable, rebuilding: {}", e);
                Ok(None)
            }
        }
    }
}
