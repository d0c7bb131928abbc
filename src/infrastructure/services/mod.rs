//! Application services: lookup/store orchestration and the promotion job

mod bootstrap;
mod promotion;
mod response_cache;

pub use bootstrap::{CacheRuntime, bootstrap};
pub use promotion::{PromotionReport, PromotionSchedule, PromotionScheduler};
pub use response_cache::{CacheStats, CacheStatsSnapshot, ResponseCache};
