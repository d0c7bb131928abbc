//! Exact-key store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::context::Context;
use crate::domain::error::DomainError;

/// A live entry whose access count exceeded the hot threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotEntry {
    pub query: String,
    pub response: String,
    pub access_count: u64,
}

/// Namespaced key/value store with TTL and access-count tracking.
///
/// This is the single source of truth for exact-match state: for a given
/// (context, query) pair there is at most one canonical response here, and no
/// entry is ever returned past its TTL. An unreachable backing store surfaces
/// as a transient error, which callers must treat as "cache unavailable",
/// never as a miss.
#[async_trait]
pub trait ExactKeyStore: Send + Sync + Debug {
    /// Store `{query, response, access_count: 0}` under the composite key
    /// with the store's fixed TTL. Overwrites any prior record for the same
    /// key, resetting the access count.
    async fn put(&self, context: &Context, query: &str, response: &str)
    -> Result<(), DomainError>;

    /// Look up the composite key. On a hit the access count is atomically
    /// incremented; a miss is `Ok(None)`, not an error.
    async fn get(&self, context: &Context, query: &str) -> Result<Option<String>, DomainError>;

    /// Enumerate live entries for the context whose access count exceeds
    /// `min_access_count`. Entries expiring concurrently with the scan may be
    /// missed, but an expired entry is never returned.
    async fn scan_hot(
        &self,
        context: &Context,
        min_access_count: u64,
    ) -> Result<Vec<HotEntry>, DomainError>;
}
