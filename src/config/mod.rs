//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, ExactBackend, ExactStoreSettings, IndexSettings, LogFormat,
    LoggingConfig, PromotionSettings, RemoteStoreSettings, TierSelection,
};
