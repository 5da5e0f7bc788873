use thiserror::Error;

/// Core domain errors
///
/// `Clone` so a single upstream failure can be handed to every caller
/// waiting on the same batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("No result for key: {key}")]
    MissingKey { key: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Dictionary error: {message}")]
    Dictionary { message: String },

    #[error("Request superseded by a newer query")]
    Superseded,
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn dictionary(message: impl Into<String>) -> Self {
        Self::Dictionary {
            message: message.into(),
        }
    }

    /// Whether the error came from an unreachable backend (remote tier or upstream)
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::Cache { .. } | Self::Upstream { .. })
    }
}
