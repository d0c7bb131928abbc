//! Exact-key store implementations

mod in_memory;
mod redis;

pub use in_memory::{InMemoryExactConfig, InMemoryExactStore};
pub use redis::{RedisExactConfig, RedisExactStore};
