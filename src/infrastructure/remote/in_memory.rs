//! In-memory remote store for tests and single-process deployments

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::embedding::{EmbeddingProvider, cosine_similarity};
use crate::domain::error::DomainError;
use crate::domain::remote::{CacheDocument, RemoteSemanticStore, ScoredDocument};

struct StoredDocument {
    document: CacheDocument,
    vector: Vec<f32>,
}

/// A [`RemoteSemanticStore`] that embeds locally and searches with a linear
/// cosine scan. Upserting a document with an existing id replaces it.
pub struct InMemoryRemoteStore {
    embedder: Arc<dyn EmbeddingProvider>,
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl fmt::Debug for InMemoryRemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRemoteStore")
            .field("embedder", &self.embedder)
            .finish_non_exhaustive()
    }
}

impl InMemoryRemoteStore {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub async fn collection_len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl RemoteSemanticStore for InMemoryRemoteStore {
    async fn upsert(
        &self,
        collection: &str,
        documents: Vec<CacheDocument>,
    ) -> Result<(), DomainError> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();

        for (document, vector) in documents.into_iter().zip(vectors) {
            entries.retain(|stored| stored.document.id != document.id);
            entries.push(StoredDocument { document, vector });
        }

        Ok(())
    }

    async fn similarity_search(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;

        let collections = self.collections.read().await;
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut results: Vec<ScoredDocument> = entries
            .iter()
            .map(|stored| ScoredDocument {
                document: stored.document.clone(),
                score: cosine_similarity(&query_vector, &stored.vector),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        Ok(results)
    }
}
