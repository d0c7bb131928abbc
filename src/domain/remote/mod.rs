//! Remote semantic tier: network vector collections

mod store;

pub use store::{CacheDocument, DocumentMetadata, RemoteSemanticStore, ScoredDocument};
