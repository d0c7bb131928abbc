//! Durable storage contract for persisted local indices

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::semantic::FlatIndex;

/// Persists a [`FlatIndex`] (vectors plus the parallel text list) under an
/// opaque name, the context's configured collection identifier.
///
/// `load` returns `Ok(None)` when no index has been persisted yet for that
/// name; callers treat this as first use and build a fresh empty index.
/// Implementations also map unreadable blobs (format or version mismatch) to
/// `Ok(None)`: losing acceleration is safe, blocking the request path is not.
#[async_trait]
pub trait IndexStorage: Send + Sync + Debug {
    async fn save(&self, name: &str, index: &FlatIndex) -> Result<(), DomainError>;

    async fn load(&self, name: &str) -> Result<Option<FlatIndex>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory index storage for tests
    #[derive(Debug, Default)]
    pub struct MockIndexStorage {
        blobs: Mutex<HashMap<String, String>>,
        error: Mutex<Option<String>>,
    }

    impl MockIndexStorage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn has_saved(&self, name: &str) -> bool {
            self.blobs.lock().unwrap().contains_key(name)
        }
    }

    #[async_trait]
    impl IndexStorage for MockIndexStorage {
        async fn save(&self, name: &str, index: &FlatIndex) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }

            let blob = serde_json::to_string(index)
                .map_err(|e| DomainError::storage(format!("serialize index: {}", e)))?;
            self.blobs.lock().unwrap().insert(name.to_string(), blob);

            Ok(())
        }

        async fn load(&self, name: &str) -> Result<Option<FlatIndex>, DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::storage(error));
            }

            let blobs = self.blobs.lock().unwrap();

            Ok(blobs
                .get(name)
                .and_then(|blob| serde_json::from_str(blob).ok()))
        }
    }
}
