//! Exact-key tier: lookup by literal (context, query) identity

mod key;
mod store;

pub use key::composite_key;
pub(crate) use key::context_prefix;
pub use store::{ExactKeyStore, HotEntry};
