//! Embedding provider contract: text -> fixed-length vector

mod provider;
mod similarity;

pub use provider::EmbeddingProvider;
pub use similarity::{cosine_similarity, squared_l2_distance};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
