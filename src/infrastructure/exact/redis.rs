//! Redis exact-key store

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::context::Context;
use crate::domain::error::DomainError;
use crate::domain::exact::{ExactKeyStore, HotEntry, composite_key, context_prefix};

/// Configuration for the Redis exact store
#[derive(Debug, Clone)]
pub struct RedisExactConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Fixed TTL applied to every entry
    pub ttl: Duration,
}

impl Default for RedisExactConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            ttl: Duration::from_secs(43_200),
        }
    }
}

impl RedisExactConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Exact-key store backed by a Redis hash per entry.
///
/// Each composite key maps to a hash `{query, response, access_count}` with a
/// TTL set at write time, so Redis itself guarantees that no entry outlives
/// its TTL. `HINCRBY` gives the per-key atomic access counting the lookup
/// path relies on.
#[derive(Clone)]
pub struct RedisExactStore {
    connection: ConnectionManager,
    config: RedisExactConfig,
}

impl fmt::Debug for RedisExactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisExactStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisExactStore {
    pub async fn new(config: RedisExactConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    pub async fn with_url(url: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(RedisExactConfig::new(url)).await
    }

    fn parse_hot_entry(fields: HashMap<String, String>) -> Option<(HotEntry, u64)> {
        let query = fields.get("query")?.clone();
        let response = fields.get("response")?.clone();
        let access_count = fields.get("access_count")?.parse().ok()?;

        Some((
            HotEntry {
                query,
                response,
                access_count,
            },
            access_count,
        ))
    }
}

#[async_trait]
impl ExactKeyStore for RedisExactStore {
    async fn put(
        &self,
        context: &Context,
        query: &str,
        response: &str,
    ) -> Result<(), DomainError> {
        let key = composite_key(context, query);
        let mut conn = self.connection.clone();

        // DEL + HSET + EXPIRE in one transaction so an overwrite always
        // resets the access count and re-arms the TTL together.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(&key)
            .ignore()
            .hset_multiple(
                &key,
                &[
                    ("query", query),
                    ("response", response),
                    ("access_count", "0"),
                ],
            )
            .ignore()
            .expire(&key, self.config.ttl.as_secs() as i64)
            .ignore();

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to store key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn get(&self, context: &Context, query: &str) -> Result<Option<String>, DomainError> {
        let key = composite_key(context, query);
        let mut conn = self.connection.clone();

        let response: Option<String> = conn
            .hget(&key, "response")
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read key '{}': {}", key, e)))?;

        let Some(response) = response else {
            return Ok(None);
        };

        let _: i64 = conn.hincr(&key, "access_count", 1).await.map_err(|e| {
            DomainError::cache(format!("Failed to increment count for '{}': {}", key, e))
        })?;

        Ok(Some(response))
    }

    async fn scan_hot(
        &self,
        context: &Context,
        min_access_count: u64,
    ) -> Result<Vec<HotEntry>, DomainError> {
        let pattern = format!("{}*", context_prefix(context));
        let mut conn = self.connection.clone();

        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| DomainError::cache(format!("Failed to scan '{}': {}", pattern, e)))?;

            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        let mut hot = Vec::new();
        for key in keys {
            // A key may expire between the scan and this read; Redis then
            // returns an empty hash, which parse_hot_entry skips.
            let fields: HashMap<String, String> = conn
                .hgetall(&key)
                .await
                .map_err(|e| DomainError::cache(format!("Failed to read key '{}': {}", key, e)))?;

            if let Some((entry, access_count)) = Self::parse_hot_entry(fields) {
                if access_count > min_access_count {
                    hot.push(entry);
                }
            }
        }

        Ok(hot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> RedisExactConfig {
        RedisExactConfig::new(
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        )
        .with_ttl(Duration::from_secs(60))
    }

    #[test]
    fn test_parse_hot_entry() {
        let fields: HashMap<String, String> = [
            ("query".to_string(), "What is gravity?".to_string()),
            ("response".to_string(), "A force.".to_string()),
            ("access_count".to_string(), "12".to_string()),
        ]
        .into_iter()
        .collect();

        let (entry, count) = RedisExactStore::parse_hot_entry(fields).unwrap();

        assert_eq!(entry.query, "What is gravity?");
        assert_eq!(count, 12);
    }

    #[test]
    fn test_parse_hot_entry_rejects_partial_hash() {
        let fields: HashMap<String, String> =
            [("response".to_string(), "orphan".to_string())].into_iter().collect();

        assert!(RedisExactStore::parse_hot_entry(fields).is_none());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_put_get_roundtrip() {
        let store = RedisExactStore::new(get_test_config()).await.unwrap();
        let ctx = Context::new("redis-test");

        store.put(&ctx, "q1", "r1").await.unwrap();

        assert_eq!(store.get(&ctx, "q1").await.unwrap(), Some("r1".to_string()));
        assert!(store.get(&ctx, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_scan_hot() {
        let store = RedisExactStore::new(get_test_config()).await.unwrap();
        let ctx = Context::new("redis-hot-test");

        store.put(&ctx, "q1", "r1").await.unwrap();
        for _ in 0..3 {
            store.get(&ctx, "q1").await.unwrap();
        }

        let hot = store.scan_hot(&ctx, 2).await.unwrap();

        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].access_count, 3);
    }
}
