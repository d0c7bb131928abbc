//! Embedding provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Turns text into a fixed-dimension float vector.
///
/// Deterministic per model version: embedding the same text twice with the
/// same model yields the same vector, which is what makes vectors usable as
/// semantic cache keys.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Embed a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for text in texts {
            vectors.push(self.embed(text).await?);
        }

        Ok(vectors)
    }

    /// Model identifier producing the vectors
    fn model_id(&self) -> &str;

    /// Fixed output dimension of this model
    fn dimensions(&self) -> usize;
}
