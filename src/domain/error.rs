use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Caller input that can never name a stored row, e.g. a malformed id
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// More than one row where exactly one was expected. Points at broken
    /// store integrity and is always surfaced to the caller.
    #[error("Multiple found: {message}")]
    MultipleFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn multiple_found(message: impl Into<String>) -> Self {
        Self::MultipleFound {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Connectivity, serialization and cache-tier failures
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Cache { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status an outer handler layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument { .. } => 400,
            Self::NotFound { .. } => 404,
            _ => 500,
        }
    }
}
