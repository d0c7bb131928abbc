//! Composite key derivation for the exact-key tier

use sha2::{Digest, Sha256};

use crate::domain::context::Context;

/// Deterministic, collision-resistant key for one (context, query) pair.
///
/// The query is trimmed and lower-cased before hashing so that trivially
/// different spellings of the same question share a key; the context prefix
/// keeps namespaces from cross-contaminating and lets hot-entry scans
/// enumerate one context at a time.
pub fn composite_key(context: &Context, query: &str) -> String {
    let normalized = query.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());

    format!("cache:{}:{}", context, hex::encode(digest))
}

/// Key prefix shared by every entry of one context
pub(crate) fn context_prefix(context: &Context) -> String {
    format!("cache:{}:", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let ctx = Context::new("teacher");

        assert_eq!(
            composite_key(&ctx, "What is gravity?"),
            composite_key(&ctx, "What is gravity?")
        );
    }

    #[test]
    fn test_key_normalizes_query() {
        let ctx = Context::new("teacher");

        assert_eq!(
            composite_key(&ctx, "  What is Gravity? "),
            composite_key(&ctx, "what is gravity?")
        );
    }

    #[test]
    fn test_contexts_do_not_collide() {
        let query = "What is gravity?";

        assert_ne!(
            composite_key(&Context::new("teacher"), query),
            composite_key(&Context::new("parent"), query)
        );
    }

    #[test]
    fn test_key_carries_context_prefix() {
        let ctx = Context::new("Teacher");
        let key = composite_key(&ctx, "q");

        assert!(key.starts_with("cache:teacher:"));
        assert!(key.starts_with(&context_prefix(&ctx)));
    }
}
