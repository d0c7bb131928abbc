//! Local semantic lookup tier

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::context::Context;
use crate::domain::error::DomainError;
use crate::domain::exact::ExactKeyStore;
use crate::domain::lookup::{LookupTier, MatchedTier, TierHit};
use crate::infrastructure::semantic_index::LocalSemanticIndex;

/// Nearest-neighbor tier over the per-context local indices.
///
/// The index stores query texts only, so a candidate match is resolved back
/// through the exact store to recover the response. An index entry whose
/// exact copy has expired is treated as a miss and falls through.
#[derive(Debug)]
pub struct LocalSemanticTier {
    indices: HashMap<Context, Arc<LocalSemanticIndex>>,
    store: Arc<dyn ExactKeyStore>,
    max_distance: f32,
}

impl LocalSemanticTier {
    pub fn new(
        indices: HashMap<Context, Arc<LocalSemanticIndex>>,
        store: Arc<dyn ExactKeyStore>,
        max_distance: f32,
    ) -> Self {
        Self {
            indices,
            store,
            max_distance,
        }
    }

    pub fn index_for(&self, context: &Context) -> Option<&Arc<LocalSemanticIndex>> {
        self.indices.get(context)
    }
}

#[async_trait]
impl LookupTier for LocalSemanticTier {
    fn kind(&self) -> MatchedTier {
        MatchedTier::LocalSemantic
    }

    async fn try_lookup(
        &self,
        context: &Context,
        query: &str,
    ) -> Result<Option<TierHit>, DomainError> {
        let Some(index) = self.indices.get(context) else {
            return Ok(None);
        };

        let neighbors = index.nearest(query, 1).await?;
        let Some(best) = neighbors.first() else {
            return Ok(None);
        };

        if best.distance > self.max_distance {
            debug!(
                context = %context,
                distance = best.distance,
                max_distance = self.max_distance,
                "Nearest indexed query too far away"
            );
            return Ok(None);
        }

        // The index only knows query texts; the response lives in the exact
        // store and may have expired since indexing.
        let response = self.store.get(context, &best.text).await?;

        Ok(response.map(|response| TierHit::new(response, MatchedTier::LocalSemantic)))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::semantic::MockIndexStorage;
    use crate::infrastructure::exact::{InMemoryExactConfig, InMemoryExactStore};

    async fn tier_with(
        max_distance: f32,
        store: Arc<InMemoryExactStore>,
    ) -> (LocalSemanticTier, Context) {
        let context = Context::new("teacher");
        let index = LocalSemanticIndex::open(
            "teacher_cache",
            Arc::new(MockEmbeddingProvider::new("mock", 32)),
            Arc::new(MockIndexStorage::new()),
        )
        .await
        .unwrap();

        let indices = HashMap::from([(context.clone(), Arc::new(index))]);
        (LocalSemanticTier::new(indices, store, max_distance), context)
    }

    #[tokio::test]
    async fn test_identical_query_hits_and_recovers_response() {
        let store = Arc::new(InMemoryExactStore::default());
        let (tier, context) = tier_with(0.5, store.clone()).await;

        store
            .put(&context, "What is gravity?", "A force of attraction.")
            .await
            .unwrap();
        tier.index_for(&context)
            .unwrap()
            .insert("What is gravity?")
            .await
            .unwrap();

        let hit = tier
            .try_lookup(&context, "What is gravity?")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(hit.tier, MatchedTier::LocalSemantic);
        assert_eq!(hit.response, "A force of attraction.");
    }

    #[tokio::test]
    async fn test_distant_neighbor_is_a_miss() {
        let store = Arc::new(InMemoryExactStore::default());
        let (tier, context) = tier_with(0.5, store.clone()).await;

        store.put(&context, "Who wrote Hamlet?", "Shakespeare.").await.unwrap();
        tier.index_for(&context)
            .unwrap()
            .insert("Who wrote Hamlet?")
            .await
            .unwrap();

        let result = tier
            .try_lookup(&context, "How do volcanoes erupt?")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_expired_exact_copy_falls_through() {
        let store = Arc::new(InMemoryExactStore::new(
            InMemoryExactConfig::default().with_ttl(Duration::from_millis(20)),
        ));
        let (tier, context) = tier_with(0.5, store.clone()).await;

        store.put(&context, "What is gravity?", "A force.").await.unwrap();
        tier.index_for(&context)
            .unwrap()
            .insert("What is gravity?")
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        let result = tier
            .try_lookup(&context, "What is gravity?")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_context_is_a_miss() {
        let store = Arc::new(InMemoryExactStore::default());
        let (tier, _) = tier_with(0.5, store).await;

        let result = tier
            .try_lookup(&Context::new("parent"), "anything")
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_index_is_a_miss() {
        let store = Arc::new(InMemoryExactStore::default());
        let (tier, context) = tier_with(0.5, store).await;

        let result = tier.try_lookup(&context, "anything").await.unwrap();

        assert!(result.is_none());
    }
}
