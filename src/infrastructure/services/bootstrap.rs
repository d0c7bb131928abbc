//! Wiring from configuration to a running cache

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use crate::config::{AppConfig, ExactBackend};
use crate::domain::context::Context;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::error::DomainError;
use crate::domain::exact::ExactKeyStore;
use crate::domain::remote::RemoteSemanticStore;
use crate::domain::semantic::IndexStorage;
use crate::infrastructure::exact::{
    InMemoryExactConfig, InMemoryExactStore, RedisExactConfig, RedisExactStore,
};
use crate::infrastructure::remote::HttpRemoteStore;
use crate::infrastructure::semantic_index::{FsIndexStorage, LocalSemanticIndex};
use crate::infrastructure::services::{PromotionScheduler, ResponseCache};

/// Fully wired cache plus its optional promotion scheduler.
///
/// The scheduler is only present when a remote store is enabled, since
/// promotion targets the remote long-term collections.
pub struct CacheRuntime {
    pub cache: Arc<ResponseCache>,
    pub scheduler: Option<Arc<PromotionScheduler>>,
}

/// Build the exact store, open one local index per configured context and
/// assemble the orchestrator and scheduler from `config`.
pub async fn bootstrap(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<CacheRuntime, DomainError> {
    let contexts = config.context_map();

    let exact: Arc<dyn ExactKeyStore> = match config.exact.backend {
        ExactBackend::Memory => {
            info!("Using in-memory exact store");
            Arc::new(InMemoryExactStore::new(
                InMemoryExactConfig::default()
                    .with_max_capacity(config.exact.max_capacity)
                    .with_ttl(config.cache.ttl()),
            ))
        }
        ExactBackend::Redis => {
            info!(url = %config.exact.url, "Using Redis exact store");
            Arc::new(
                RedisExactStore::new(
                    RedisExactConfig::new(&config.exact.url).with_ttl(config.cache.ttl()),
                )
                .await?,
            )
        }
    };

    let storage: Arc<dyn IndexStorage> = Arc::new(FsIndexStorage::new(&config.index.dir));

    let opens = contexts.contexts().filter_map(|context| {
        let collections = contexts.resolve(context)?;
        let name = collections.index.clone();
        let embedder = embedder.clone();
        let storage = storage.clone();
        let context = context.clone();

        Some(async move {
            let index = LocalSemanticIndex::open(name, embedder, storage).await?;
            Ok::<_, DomainError>((context, Arc::new(index)))
        })
    });

    let indices: HashMap<Context, Arc<LocalSemanticIndex>> =
        try_join_all(opens).await?.into_iter().collect();

    let remote: Option<Arc<dyn RemoteSemanticStore>> = if config.remote.enabled {
        info!(url = %config.remote.url, "Remote semantic store enabled");
        Some(Arc::new(HttpRemoteStore::new(&config.remote)?))
    } else {
        None
    };

    let cache = Arc::new(ResponseCache::new(
        &config.cache,
        contexts.clone(),
        exact.clone(),
        indices,
        remote.clone(),
    ));

    let scheduler = match remote {
        Some(remote) => Some(Arc::new(PromotionScheduler::new(
            &config.promotion,
            contexts,
            exact,
            remote,
        )?)),
        None => None,
    };

    Ok(CacheRuntime { cache, scheduler })
}
