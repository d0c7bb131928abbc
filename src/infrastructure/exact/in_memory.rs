//! In-memory exact-key store built on moka

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::context::Context;
use crate::domain::error::DomainError;
use crate::domain::exact::{ExactKeyStore, HotEntry, composite_key, context_prefix};

/// Configuration for the in-memory exact store
#[derive(Debug, Clone)]
pub struct InMemoryExactConfig {
    /// Maximum number of entries before eviction
    pub max_capacity: u64,
    /// Fixed TTL applied to every entry
    pub ttl: Duration,
}

impl Default for InMemoryExactConfig {
    fn default() -> Self {
        Self {
            max_capacity: 100_000,
            ttl: Duration::from_secs(43_200),
        }
    }
}

impl InMemoryExactConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Stored record for one (context, query) pair.
///
/// The access counter sits behind an `Arc` so that every clone moka hands out
/// shares the same atomic; concurrent gets on one key never lose increments.
#[derive(Debug, Clone)]
struct StoredEntry {
    query: String,
    response: String,
    access_count: Arc<AtomicU64>,
    expires_at_millis: u64,
}

impl StoredEntry {
    fn is_expired(&self) -> bool {
        current_time_millis() > self.expires_at_millis
    }
}

fn current_time_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Process-local exact-key store.
///
/// Suitable for single-instance deployments and tests; multi-instance
/// deployments share state through [`super::RedisExactStore`] instead.
#[derive(Debug)]
pub struct InMemoryExactStore {
    cache: MokaCache<String, StoredEntry>,
    config: InMemoryExactConfig,
}

impl InMemoryExactStore {
    pub fn new(config: InMemoryExactConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        Self { cache, config }
    }
}

impl Default for InMemoryExactStore {
    fn default() -> Self {
        Self::new(InMemoryExactConfig::default())
    }
}

#[async_trait]
impl ExactKeyStore for InMemoryExactStore {
    async fn put(
        &self,
        context: &Context,
        query: &str,
        response: &str,
    ) -> Result<(), DomainError> {
        let key = composite_key(context, query);
        let entry = StoredEntry {
            query: query.to_string(),
            response: response.to_string(),
            access_count: Arc::new(AtomicU64::new(0)),
            expires_at_millis: current_time_millis() + self.config.ttl.as_millis() as u64,
        };

        self.cache.insert(key, entry).await;
        Ok(())
    }

    async fn get(&self, context: &Context, query: &str) -> Result<Option<String>, DomainError> {
        let key = composite_key(context, query);

        match self.cache.get(&key).await {
            Some(entry) => {
                if entry.is_expired() {
                    self.cache.remove(&key).await;
                    return Ok(None);
                }

                entry.access_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(entry.response.clone()))
            }
            None => Ok(None),
        }
    }

    async fn scan_hot(
        &self,
        context: &Context,
        min_access_count: u64,
    ) -> Result<Vec<HotEntry>, DomainError> {
        let prefix = context_prefix(context);

        self.cache.run_pending_tasks().await;

        let hot = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .filter(|(_, entry)| !entry.is_expired())
            .filter_map(|(_, entry)| {
                let access_count = entry.access_count.load(Ordering::Relaxed);

                (access_count > min_access_count).then(|| HotEntry {
                    query: entry.query.clone(),
                    response: entry.response.clone(),
                    access_count,
                })
            })
            .collect();

        Ok(hot)
    }
}
