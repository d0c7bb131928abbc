//! Exact-key lookup tier

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::context::Context;
use crate::domain::error::DomainError;
use crate::domain::exact::ExactKeyStore;
use crate::domain::lookup::{LookupTier, MatchedTier, TierHit};

/// First tier in the precedence list: the normalized composite key either
/// has a live entry or it does not.
#[derive(Debug)]
pub struct ExactLookupTier {
    store: Arc<dyn ExactKeyStore>,
}

impl ExactLookupTier {
    pub fn new(store: Arc<dyn ExactKeyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LookupTier for ExactLookupTier {
    fn kind(&self) -> MatchedTier {
        MatchedTier::Exact
    }

    async fn try_lookup(
        &self,
        context: &Context,
        query: &str,
    ) -> Result<Option<TierHit>, DomainError> {
        let response = self.store.get(context, query).await?;

        Ok(response.map(|response| TierHit::new(response, MatchedTier::Exact)))
    }
}
