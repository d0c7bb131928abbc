//! Lookup tier contract and terminal outcomes

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::context::Context;
use crate::domain::error::DomainError;

/// Which tier produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedTier {
    Exact,
    LocalSemantic,
    RemoteSemantic,
}

impl MatchedTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::LocalSemantic => "local_semantic",
            Self::RemoteSemantic => "remote_semantic",
        }
    }
}

/// A successful lookup at one tier
#[derive(Debug, Clone, PartialEq)]
pub struct TierHit {
    pub response: String,
    pub tier: MatchedTier,
}

impl TierHit {
    pub fn new(response: impl Into<String>, tier: MatchedTier) -> Self {
        Self {
            response: response.into(),
            tier,
        }
    }
}

/// Terminal state of a full lookup: first hit across the tier precedence
/// list, or a miss at every enabled tier. A miss is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(TierHit),
    Miss,
}

impl Lookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Hit(hit) => Some(&hit.response),
            Self::Miss => None,
        }
    }

    pub fn matched_tier(&self) -> Option<MatchedTier> {
        match self {
            Self::Hit(hit) => Some(hit.tier),
            Self::Miss => None,
        }
    }
}

/// Result of a write-through store
///
/// The exact-key write is authoritative; if it fails the whole call fails.
/// The semantic tiers are accelerators, so their failures only degrade the
/// outcome to `Partial`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOutcome {
    /// All enabled tiers accepted the entry
    Full,
    /// The exact-key write succeeded but one or more accelerator tiers failed
    Partial { degraded: Vec<MatchedTier> },
}

impl StoreOutcome {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// One lookup strategy behind the orchestrator.
///
/// Implementations return `Ok(None)` for a miss and reserve errors for
/// transient failures; the orchestrator logs those and falls through to the
/// next tier in its precedence list.
#[async_trait]
pub trait LookupTier: Send + Sync + Debug {
    fn kind(&self) -> MatchedTier;

    async fn try_lookup(
        &self,
        context: &Context,
        query: &str,
    ) -> Result<Option<TierHit>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_hit_accessors() {
        let lookup = Lookup::Hit(TierHit::new("42", MatchedTier::Exact));

        assert!(lookup.is_hit());
        assert_eq!(lookup.response(), Some("42"));
        assert_eq!(lookup.matched_tier(), Some(MatchedTier::Exact));
    }

    #[test]
    fn test_lookup_miss_accessors() {
        let lookup = Lookup::Miss;

        assert!(!lookup.is_hit());
        assert_eq!(lookup.response(), None);
        assert_eq!(lookup.matched_tier(), None);
    }

    #[test]
    fn test_matched_tier_labels() {
        assert_eq!(MatchedTier::Exact.as_str(), "exact");
        assert_eq!(MatchedTier::LocalSemantic.as_str(), "local_semantic");
        assert_eq!(MatchedTier::RemoteSemantic.as_str(), "remote_semantic");
    }

    #[test]
    fn test_store_outcome() {
        assert!(StoreOutcome::Full.is_full());
        assert!(!StoreOutcome::Partial {
            degraded: vec![MatchedTier::RemoteSemantic]
        }
        .is_full());
    }
}
