//! Per-context local semantic index

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::error::DomainError;
use crate::domain::semantic::{FlatIndex, IndexStorage, NearestNeighbor};

/// One context's nearest-neighbor index over query embeddings.
///
/// Keeping the index in-process avoids a network round trip for the common
/// case of a near-duplicate question; it stores only vectors and query texts
/// (not responses), so it stays small and fast to persist. It is a
/// best-effort accelerator, eventually consistent with the remote store.
///
/// Inserts take the write lock for the embed-append-persist sequence, because
/// insertion order determines the position used to recover matched text.
/// Searches take the read lock and therefore never observe a partially
/// appended entry, and never block each other.
#[derive(Debug)]
pub struct LocalSemanticIndex {
    name: String,
    embedder: Arc<dyn EmbeddingProvider>,
    storage: Arc<dyn IndexStorage>,
    index: RwLock<FlatIndex>,
}

impl LocalSemanticIndex {
    /// Load the persisted index for `name`, or start from a fresh empty one
    /// when nothing usable is persisted yet.
    pub async fn open(
        name: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
        storage: Arc<dyn IndexStorage>,
    ) -> Result<Self, DomainError> {
        let name = name.into();

        let index = match storage.load(&name).await? {
            Some(index) => {
                info!(index = %name, entries = index.len(), "Loaded persisted semantic index");
                index
            }
            None => {
                info!(index = %name, "No persisted semantic index, starting empty");
                FlatIndex::new(embedder.dimensions())
            }
        };

        Ok(Self {
            name,
            embedder,
            storage,
            index: RwLock::new(index),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embed the query, append it to the index and persist the result.
    pub async fn insert(&self, query: &str) -> Result<(), DomainError> {
        let vector = self.embedder.embed(query).await?;

        let mut index = self.index.write().await;
        let position = index.insert(vector, query)?;
        self.storage.save(&self.name, &index).await?;

        debug!(index = %self.name, position, "Indexed query");
        Ok(())
    }

    /// The `k` nearest stored queries, ascending by distance. Empty index
    /// yields an empty result.
    pub async fn nearest(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<NearestNeighbor>, DomainError> {
        if self.is_empty().await {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        let index = self.index.read().await;

        Ok(index.nearest(&vector, k))
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::semantic::MockIndexStorage;

    async fn open_index(storage: Arc<MockIndexStorage>) -> LocalSemanticIndex {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", 32));
        LocalSemanticIndex::open("teacher_cache", embedder, storage)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_nearest_on_empty_index_is_empty() {
        let index = open_index(Arc::new(MockIndexStorage::new())).await;

        assert!(index.nearest("anything", 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_identical_search_has_zero_distance() {
        let index = open_index(Arc::new(MockIndexStorage::new())).await;

        index.insert("What is photosynthesis?").await.unwrap();
        index.insert("How do volcanoes erupt?").await.unwrap();

        let neighbors = index.nearest("What is photosynthesis?", 1).await.unwrap();

        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].text, "What is photosynthesis?");
        assert!(neighbors[0].distance < 1e-6);
    }

    #[tokio::test]
    async fn test_insert_persists_after_each_append() {
        let storage = Arc::new(MockIndexStorage::new());
        let index = open_index(storage.clone()).await;

        assert!(!storage.has_saved("teacher_cache"));
        index.insert("q1").await.unwrap();
        assert!(storage.has_saved("teacher_cache"));
    }

    #[tokio::test]
    async fn test_open_restores_persisted_entries() {
        let storage = Arc::new(MockIndexStorage::new());

        {
            let index = open_index(storage.clone()).await;
            index.insert("persisted question").await.unwrap();
        }

        let reopened = open_index(storage).await;

        assert_eq!(reopened.len().await, 1);
        let neighbors = reopened.nearest("persisted question", 1).await.unwrap();
        assert!(neighbors[0].distance < 1e-6);
    }

    #[tokio::test]
    async fn test_insert_surfaces_persistence_failure() {
        let storage = Arc::new(MockIndexStorage::new().with_error("disk full"));
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", 32));

        // Load errors propagate from open; the orchestrator decides whether
        // to fail open.
        let result = LocalSemanticIndex::open("x", embedder, storage).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_reads_during_insert() {
        let index = Arc::new(open_index(Arc::new(MockIndexStorage::new())).await);
        index.insert("seed question").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let index = index.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    index.insert(&format!("question {}", i)).await.unwrap();
                } else {
                    let _ = index.nearest("seed question", 1).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(index.len().await, 5);
    }
}
