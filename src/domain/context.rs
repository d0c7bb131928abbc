//! Context namespaces and their collection mapping

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A logical namespace (audience or tenant) whose cached answers must not
/// cross-contaminate. Case-normalized everywhere it is used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(String);

impl Context {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Context {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Collection identifiers configured for one context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextCollections {
    /// Name under which the local semantic index is persisted
    pub index: String,
    /// Short-term remote cache collection
    pub cache_collection: String,
    /// Long-term remote collection targeted by promotion
    pub longterm_collection: String,
}

/// Mapping from normalized context name to its collection identifiers.
///
/// Loaded once at startup from configuration and read-only afterwards.
/// A context absent from this map is a configuration error, signaled
/// distinctly from a cache miss.
#[derive(Debug, Clone, Default)]
pub struct ContextIndexMap {
    entries: HashMap<Context, ContextCollections>,
}

impl ContextIndexMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, context: &Context) -> Option<&ContextCollections> {
        self.entries.get(context)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ContextCollections)> for ContextIndexMap {
    fn from_iter<I: IntoIterator<Item = (String, ContextCollections)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, collections)| (Context::new(name), collections))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collections(prefix: &str) -> ContextCollections {
        ContextCollections {
            index: format!("{}_cache", prefix),
            cache_collection: format!("{}_stm", prefix),
            longterm_collection: format!("{}_ltm", prefix),
        }
    }

    #[test]
    fn test_context_normalizes_case_and_whitespace() {
        assert_eq!(Context::new("  Teacher ").as_str(), "teacher");
        assert_eq!(Context::new("PARENT"), Context::new("parent"));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let map: ContextIndexMap =
            [("Teacher".to_string(), collections("teacher"))].into_iter().collect();

        let resolved = map.resolve(&Context::new("tEaChEr")).unwrap();
        assert_eq!(resolved.longterm_collection, "teacher_ltm");
    }

    #[test]
    fn test_resolve_unknown_context() {
        let map = ContextIndexMap::new();
        assert!(map.resolve(&Context::new("missing")).is_none());
    }
}
