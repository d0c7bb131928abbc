//! Remote semantic store trait and document types

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Metadata attached to a cached query document.
///
/// Unlike the local index, the remote collections carry the response text
/// with the document, so a remote hit needs no second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub response: String,
}

/// One query/response pair as stored in a remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
    pub id: String,
    /// The query text; this is what the store embeds and searches over
    pub text: String,
    pub metadata: DocumentMetadata,
}

impl CacheDocument {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            id: format!("qr-{}", Uuid::new_v4()),
            text: query.into(),
            metadata: DocumentMetadata {
                response: response.into(),
            },
        }
    }

    pub fn response(&self) -> &str {
        &self.metadata.response
    }
}

/// A document matched by a similarity search, with its relevance score.
///
/// Score convention across this crate: higher = more similar, results sorted
/// descending. Implementations backed by stores with a different native
/// convention convert at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: CacheDocument,
    pub score: f32,
}

/// A network-accessible vector collection per (context, tier).
///
/// The cache uses one short-term collection per context for write-through and
/// one long-term collection as the promotion target. Network and service
/// errors propagate as transient failures; the orchestrator degrades to the
/// other tiers rather than letting an outage block lookups.
#[async_trait]
pub trait RemoteSemanticStore: Send + Sync + Debug {
    /// Embed and store the documents in the named collection
    async fn upsert(
        &self,
        collection: &str,
        documents: Vec<CacheDocument>,
    ) -> Result<(), DomainError>;

    /// The `k` most similar documents to the query, sorted descending by
    /// score (higher = more similar)
    async fn similarity_search(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_carries_response_metadata() {
        let doc = CacheDocument::new("What is gravity?", "A force of attraction.");

        assert_eq!(doc.text, "What is gravity?");
        assert_eq!(doc.response(), "A force of attraction.");
        assert!(doc.id.starts_with("qr-"));
    }

    #[test]
    fn test_document_ids_are_unique() {
        let a = CacheDocument::new("q", "r");
        let b = CacheDocument::new("q", "r");

        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_document_serialization_shape() {
        let doc = CacheDocument {
            id: "qr-1".to_string(),
            text: "q".to_string(),
            metadata: DocumentMetadata {
                response: "r".to_string(),
            },
        };

        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["text"], "q");
        assert_eq!(json["metadata"]["response"], "r");
    }
}
