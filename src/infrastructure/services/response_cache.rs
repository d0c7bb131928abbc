//! Multi-tier lookup and write-through orchestration

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{CacheSettings, TierSelection};
use crate::domain::context::{Context, ContextIndexMap};
use crate::domain::error::DomainError;
use crate::domain::exact::ExactKeyStore;
use crate::domain::lookup::{Lookup, LookupTier, MatchedTier, StoreOutcome};
use crate::domain::remote::{CacheDocument, RemoteSemanticStore};
use crate::infrastructure::semantic_index::LocalSemanticIndex;
use crate::infrastructure::tiers::{ExactLookupTier, LocalSemanticTier, RemoteSemanticTier};

/// Running hit/miss counters, cheap enough to keep always-on
#[derive(Debug, Default)]
pub struct CacheStats {
    exact_hits: AtomicU64,
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self, tier: MatchedTier) {
        let counter = match tier {
            MatchedTier::Exact => &self.exact_hits,
            MatchedTier::LocalSemantic => &self.local_hits,
            MatchedTier::RemoteSemantic => &self.remote_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            exact_hits: self.exact_hits.load(Ordering::Relaxed),
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub exact_hits: u64,
    pub local_hits: u64,
    pub remote_hits: u64,
    pub misses: u64,
}

impl CacheStatsSnapshot {
    pub fn total_hits(&self) -> u64 {
        self.exact_hits + self.local_hits + self.remote_hits
    }

    pub fn hit_rate(&self) -> f64 {
        let total = self.total_hits() + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.total_hits() as f64 / total as f64
    }
}

/// Orchestrates lookups across the tier precedence list and write-through
/// across the exact store, local indices and the remote cache collections.
///
/// Lookups stop at the first hit. Transient tier failures and tier timeouts
/// are logged and fall through to the next tier; only an unknown context is
/// an error. Writes treat the exact store as authoritative and the semantic
/// tiers as best-effort accelerators.
#[derive(Debug)]
pub struct ResponseCache {
    contexts: ContextIndexMap,
    tiers: Vec<Arc<dyn LookupTier>>,
    exact: Arc<dyn ExactKeyStore>,
    indices: HashMap<Context, Arc<LocalSemanticIndex>>,
    remote: Option<Arc<dyn RemoteSemanticStore>>,
    tier_timeout: Duration,
    stats: CacheStats,
}

impl ResponseCache {
    /// Assemble the cache with the standard tier list from `settings.tiers`.
    /// A configured remote tier is skipped with a warning when no remote
    /// store is wired in.
    pub fn new(
        settings: &CacheSettings,
        contexts: ContextIndexMap,
        exact: Arc<dyn ExactKeyStore>,
        indices: HashMap<Context, Arc<LocalSemanticIndex>>,
        remote: Option<Arc<dyn RemoteSemanticStore>>,
    ) -> Self {
        let mut tiers: Vec<Arc<dyn LookupTier>> = Vec::with_capacity(settings.tiers.len());

        for selection in &settings.tiers {
            match selection {
                TierSelection::Exact => {
                    tiers.push(Arc::new(ExactLookupTier::new(exact.clone())));
                }
                TierSelection::Local => {
                    tiers.push(Arc::new(LocalSemanticTier::new(
                        indices.clone(),
                        exact.clone(),
                        settings.max_distance,
                    )));
                }
                TierSelection::Remote => match &remote {
                    Some(remote) => {
                        tiers.push(Arc::new(RemoteSemanticTier::new(
                            remote.clone(),
                            contexts.clone(),
                            settings.min_score,
                        )));
                    }
                    None => {
                        warn!("Remote tier configured but no remote store available, skipping");
                    }
                },
            }
        }

        Self {
            contexts,
            tiers,
            exact,
            indices,
            remote,
            tier_timeout: settings.tier_timeout(),
            stats: CacheStats::default(),
        }
    }

    /// Replace the assembled tier list. Intended for non-standard wiring,
    /// such as interposing instrumented tiers.
    pub fn with_tiers(mut self, tiers: Vec<Arc<dyn LookupTier>>) -> Self {
        self.tiers = tiers;
        self
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    /// Walk the tier list and return the first hit, or a miss once every
    /// tier has been consulted. An unknown context is a configuration error,
    /// never a miss.
    pub async fn lookup(&self, context: &Context, query: &str) -> Result<Lookup, DomainError> {
        if self.contexts.resolve(context).is_none() {
            return Err(DomainError::configuration(format!(
                "Unknown context: {}",
                context
            )));
        }

        for tier in &self.tiers {
            let outcome = tokio::time::timeout(self.tier_timeout, tier.try_lookup(context, query));

            match outcome.await {
                Ok(Ok(Some(hit))) => {
                    info!(context = %context, tier = hit.tier.as_str(), "Cache hit");
                    self.stats.record_hit(hit.tier);
                    return Ok(Lookup::Hit(hit));
                }
                Ok(Ok(None)) => {
                    debug!(context = %context, tier = tier.kind().as_str(), "Tier miss");
                }
                Ok(Err(error)) => {
                    warn!(
                        context = %context,
                        tier = tier.kind().as_str(),
                        error = %error,
                        "Tier lookup failed, falling through"
                    );
                }
                Err(_) => {
                    warn!(
                        context = %context,
                        tier = tier.kind().as_str(),
                        timeout_secs = self.tier_timeout.as_secs(),
                        "Tier lookup timed out, falling through"
                    );
                }
            }
        }

        self.stats.record_miss();
        Ok(Lookup::Miss)
    }

    /// Write through every tier. The exact-key write must succeed; the local
    /// index insert and the remote upsert run concurrently, best-effort and
    /// timeout-bounded, and only degrade the outcome on failure.
    pub async fn store(
        &self,
        context: &Context,
        query: &str,
        response: &str,
    ) -> Result<StoreOutcome, DomainError> {
        let Some(collections) = self.contexts.resolve(context) else {
            return Err(DomainError::configuration(format!(
                "Unknown context: {}",
                context
            )));
        };

        self.exact.put(context, query, response).await?;

        let local = async {
            let Some(index) = self.indices.get(context) else {
                return None;
            };

            match tokio::time::timeout(self.tier_timeout, index.insert(query)).await {
                Ok(Ok(())) => None,
                Ok(Err(error)) => {
                    warn!(context = %context, error = %error, "Local index insert failed");
                    Some(MatchedTier::LocalSemantic)
                }
                Err(_) => {
                    warn!(context = %context, "Local index insert timed out");
                    Some(MatchedTier::LocalSemantic)
                }
            }
        };

        let remote = async {
            let store = self.remote.as_ref()?;
            let document = CacheDocument::new(query, response);
            let upsert = store.upsert(&collections.cache_collection, vec![document]);

            match tokio::time::timeout(self.tier_timeout, upsert).await {
                Ok(Ok(())) => None,
                Ok(Err(error)) => {
                    warn!(context = %context, error = %error, "Remote cache upsert failed");
                    Some(MatchedTier::RemoteSemantic)
                }
                Err(_) => {
                    warn!(context = %context, "Remote cache upsert timed out");
                    Some(MatchedTier::RemoteSemantic)
                }
            }
        };

        let (local_degraded, remote_degraded) = tokio::join!(local, remote);
        let degraded: Vec<MatchedTier> =
            [local_degraded, remote_degraded].into_iter().flatten().collect();

        if degraded.is_empty() {
            Ok(StoreOutcome::Full)
        } else {
            Ok(StoreOutcome::Partial { degraded })
        }
    }
}
