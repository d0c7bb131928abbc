//! Remote semantic store implementations

mod http;
mod in_memory;

pub use http::HttpRemoteStore;
pub use in_memory::InMemoryRemoteStore;
