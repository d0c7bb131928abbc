//! QnA Response Cache
//!
//! A multi-tier cache for natural-language question answering. Before the
//! generation pipeline produces an answer, it asks this crate whether an
//! equivalent or semantically similar query has already been answered:
//!
//! - **Exact tier**: key/value lookup by literal (context, query) identity,
//!   backed by Redis or an in-process store, with TTL and access counting.
//! - **Local semantic tier**: a per-context nearest-neighbor index over query
//!   embeddings, persisted to durable storage, avoiding a network round trip
//!   for near-duplicate questions.
//! - **Remote semantic tier**: a network vector collection per context with
//!   similarity-scored search.
//!
//! [`ResponseCache`] orchestrates the tiers behind one lookup/store API, and
//! [`PromotionScheduler`] periodically copies frequently asked entries into a
//! long-term remote collection.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::context::{Context, ContextCollections, ContextIndexMap};
pub use domain::error::DomainError;
pub use domain::lookup::{Lookup, MatchedTier, StoreOutcome, TierHit};
pub use infrastructure::logging::init_logging;
pub use infrastructure::services::{
    CacheRuntime, PromotionReport, PromotionScheduler, ResponseCache, bootstrap,
};
