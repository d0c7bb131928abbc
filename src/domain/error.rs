use thiserror::Error;

/// Core domain errors
///
/// A cache miss is never an error; lookup and store paths model it as an
/// absent value or a dedicated outcome. `Configuration` is surfaced to
/// callers distinctly from a miss, and `Cache` covers transient backing-store
/// failures that lookup paths recover from by falling through to the next
/// tier.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Transient failures are recovered from locally (fall through to the
    /// next tier); configuration and internal errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Cache { .. } | Self::Storage { .. } | Self::Provider { .. }
        )
    }
}
