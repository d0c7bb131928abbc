//! Lookup tier implementations behind the orchestrator

mod exact;
mod local;
mod remote;

pub use exact::ExactLookupTier;
pub use local::LocalSemanticTier;
pub use remote::RemoteSemanticTier;
