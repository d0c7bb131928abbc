//! Domain layer - cache entities, tier contracts and errors

pub mod context;
pub mod embedding;
pub mod error;
pub mod exact;
pub mod lookup;
pub mod remote;
pub mod semantic;

pub use context::{Context, ContextCollections, ContextIndexMap};
pub use error::DomainError;
pub use exact::{ExactKeyStore, HotEntry};
pub use lookup::{Lookup, LookupTier, MatchedTier, StoreOutcome, TierHit};
pub use remote::{CacheDocument, RemoteSemanticStore, ScoredDocument};
pub use semantic::{FlatIndex, IndexStorage, NearestNeighbor};
