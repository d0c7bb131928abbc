//! Remote semantic lookup tier

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::context::{Context, ContextIndexMap};
use crate::domain::error::DomainError;
use crate::domain::lookup::{LookupTier, MatchedTier, TierHit};
use crate::domain::remote::RemoteSemanticStore;

/// Last tier in the precedence list: a similarity search against the
/// context's remote cache collection. Responses travel with the documents,
/// so a hit needs no second lookup.
#[derive(Debug)]
pub struct RemoteSemanticTier {
    store: Arc<dyn RemoteSemanticStore>,
    contexts: ContextIndexMap,
    min_score: f32,
}

impl RemoteSemanticTier {
    pub fn new(
        store: Arc<dyn RemoteSemanticStore>,
        contexts: ContextIndexMap,
        min_score: f32,
    ) -> Self {
        Self {
            store,
            contexts,
            min_score,
        }
    }
}

#[async_trait]
impl LookupTier for RemoteSemanticTier {
    fn kind(&self) -> MatchedTier {
        MatchedTier::RemoteSemantic
    }

    async fn try_lookup(
        &self,
        context: &Context,
        query: &str,
    ) -> Result<Option<TierHit>, DomainError> {
        let Some(collections) = self.contexts.resolve(context) else {
            return Ok(None);
        };

        let results = self
            .store
            .similarity_search(&collections.cache_collection, query, 1)
            .await?;

        let Some(best) = results.first() else {
            return Ok(None);
        };

        if best.score < self.min_score {
            debug!(
                context = %context,
                score = best.score,
                min_score = self.min_score,
                "Best remote match below score threshold"
            );
            return Ok(None);
        }

        Ok(Some(TierHit::new(
            best.document.response(),
            MatchedTier::RemoteSemantic,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::ContextCollections;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::remote::CacheDocument;
    use crate::infrastructure::remote::InMemoryRemoteStore;

    fn contexts() -> ContextIndexMap {
        [(
            "teacher".to_string(),
            ContextCollections {
                index: "teacher_cache".to_string(),
                cache_collection: "teacher_stm".to_string(),
                longterm_collection: "teacher_ltm".to_string(),
            },
        )]
        .into_iter()
        .collect()
    }

    fn store() -> Arc<InMemoryRemoteStore> {
        Arc::new(InMemoryRemoteStore::new(Arc::new(
            MockEmbeddingProvider::new("mock", 32),
        )))
    }

    #[tokio::test]
    async fn test_hit_above_min_score() {
        let store = store();
        store
            .upsert(
                "teacher_stm",
                vec![CacheDocument::new("What is gravity?", "A force of attraction.")],
            )
            .await
            .unwrap();
        let tier = RemoteSemanticTier::new(store, contexts(), 0.9);

        let hit = tier
            .try_lookup(&Context::new("teacher"), "What is gravity?")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(hit.tier, MatchedTier::RemoteSemantic);
        assert_eq!(hit.response, "A force of attraction.");
    }

    #[tokio::test]
    async fn test_low_score_is_a_miss() {
        let store = store();
        store
            .upsert(
                "teacher_stm",
                vec![CacheDocument::new("Who wrote Hamlet?", "Shakespeare.")],
            )
            .await
            .unwrap();
        let tier = RemoteSemanticTier::new(store, contexts(), 0.9);

        let result = tier
            .try_lookup(&Context::new("teacher"), "How do volcanoes erupt?")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_context_is_a_miss() {
        let tier = RemoteSemanticTier::new(store(), contexts(), 0.9);

        let result = tier
            .try_lookup(&Context::new("parent"), "anything")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_collection_is_a_miss() {
        let tier = RemoteSemanticTier::new(store(), contexts(), 0.9);

        let result = tier
            .try_lookup(&Context::new("teacher"), "anything")
            .await
            .unwrap();

        assert!(result.is_none());
    }
}
