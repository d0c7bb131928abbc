//! HTTP-backed remote semantic store

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RemoteStoreSettings;
use crate::domain::error::DomainError;
use crate::domain::remote::{CacheDocument, RemoteSemanticStore, ScoredDocument};

/// Client for a vector-store service exposing per-collection document
/// upsert and similarity search endpoints.
///
/// The service embeds documents itself; this client only ships text and
/// metadata. Connection failures, timeouts and non-success statuses all map
/// to [`DomainError::Storage`] so the orchestrator treats an outage as a
/// degraded tier rather than a hard failure.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(settings: &RemoteStoreSettings) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
        })
    }

    fn documents_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/documents", self.base_url, collection)
    }

    fn search_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/search", self.base_url, collection)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(DomainError::storage(format!(
            "Remote store returned {}: {}",
            status, body
        )))
    }
}

#[async_trait]
impl RemoteSemanticStore for HttpRemoteStore {
    async fn upsert(
        &self,
        collection: &str,
        documents: Vec<CacheDocument>,
    ) -> Result<(), DomainError> {
        if documents.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.documents_url(collection))
            .json(&UpsertRequest { documents })
            .send()
            .await
            .map_err(|e| DomainError::storage(format!("Remote upsert failed: {}", e)))?;

        Self::check_status(response).await?;

        Ok(())
    }

    async fn similarity_search(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredDocument>, DomainError> {
        let response = self
            .client
            .post(self.search_url(collection))
            .json(&SearchRequest { q: query, limit: k })
            .send()
            .await
            .map_err(|e| DomainError::storage(format!("Remote search failed: {}", e)))?;

        let response = Self::check_status(response).await?;

        let body: SearchResponse = response.json().await.map_err(|e| {
            DomainError::storage(format!("Failed to parse search response: {}", e))
        })?;

        let mut results: Vec<ScoredDocument> = body
            .hits
            .into_iter()
            .map(|hit| ScoredDocument {
                document: hit.document,
                score: hit.score,
            })
            .collect();

        // Not all backends guarantee ordering; ours does.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(results)
    }
}

#[derive(Debug, Serialize)]
struct UpsertRequest {
    documents: Vec<CacheDocument>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(flatten)]
    document: CacheDocument,
    #[serde(rename = "_score")]
    score: f32,
}
