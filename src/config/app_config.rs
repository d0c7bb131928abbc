use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::context::{ContextCollections, ContextIndexMap};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub exact: ExactStoreSettings,
    #[serde(default)]
    pub remote: RemoteStoreSettings,
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub promotion: PromotionSettings,
    /// Context name -> collection identifiers. Owned by configuration
    /// management; the cache only reads it.
    #[serde(default)]
    pub contexts: HashMap<String, ContextCollections>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Cache-wide lookup and write-through settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// TTL for exact-key entries, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum squared-L2 distance for a local semantic hit (lower is closer)
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,

    /// Minimum similarity score for a remote semantic hit (higher is closer)
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Lookup tier precedence; first hit wins
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierSelection>,

    /// Bound on any single tier lookup or best-effort write
    #[serde(default = "default_tier_timeout_secs")]
    pub tier_timeout_secs: u64,
}

/// Which lookup tiers are active, in precedence order
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TierSelection {
    Exact,
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExactStoreSettings {
    #[serde(default = "default_exact_backend")]
    pub backend: ExactBackend,
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExactBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteStoreSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_remote_url")]
    pub url: String,
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    /// Directory holding persisted local index blobs
    #[serde(default = "default_index_dir")]
    pub dir: String,
}

/// Schedule and threshold for the long-term promotion job
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionSettings {
    #[serde(default = "default_day_of_week")]
    pub day_of_week: String,
    #[serde(default)]
    pub hour: u32,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_min_access_count")]
    pub min_access_count: u64,
}

fn default_ttl_secs() -> u64 {
    43_200 // 12 hours
}

fn default_max_distance() -> f32 {
    0.5
}

fn default_min_score() -> f32 {
    0.9
}

fn default_tiers() -> Vec<TierSelection> {
    vec![TierSelection::Exact, TierSelection::Local]
}

fn default_tier_timeout_secs() -> u64 {
    5
}

fn default_exact_backend() -> ExactBackend {
    ExactBackend::Memory
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_max_capacity() -> u64 {
    100_000
}

fn default_remote_url() -> String {
    "http://127.0.0.1:8882".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    10
}

fn default_index_dir() -> String {
    "./indices".to_string()
}

fn default_day_of_week() -> String {
    "sun".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_min_access_count() -> u64 {
    10
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_distance: default_max_distance(),
            min_score: default_min_score(),
            tiers: default_tiers(),
            tier_timeout_secs: default_tier_timeout_secs(),
        }
    }
}

impl Default for ExactStoreSettings {
    fn default() -> Self {
        Self {
            backend: default_exact_backend(),
            url: default_redis_url(),
            max_capacity: default_max_capacity(),
        }
    }
}

impl Default for RemoteStoreSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_remote_url(),
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

impl Default for PromotionSettings {
    fn default() -> Self {
        Self {
            day_of_week: default_day_of_week(),
            hour: 0,
            timezone: default_timezone(),
            min_access_count: default_min_access_count(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            cache: CacheSettings::default(),
            exact: ExactStoreSettings::default(),
            remote: RemoteStoreSettings::default(),
            index: IndexSettings::default(),
            promotion: PromotionSettings::default(),
            contexts: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Context name -> collection identifiers, with names normalized the way
    /// every lookup path normalizes them.
    pub fn context_map(&self) -> ContextIndexMap {
        ContextIndexMap::from_iter(self.contexts.clone())
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn tier_timeout(&self) -> Duration {
        Duration::from_secs(self.tier_timeout_secs)
    }
}

impl RemoteStoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
