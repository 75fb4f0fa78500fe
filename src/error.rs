//! Error types for chunksmith.

/// Errors that can occur during chunking, embedding, or retrieval.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested strategy name is not one of the nine known methods.
    #[error("unsupported chunking method: {0:?}")]
    UnsupportedMethod(String),

    /// An operation that requires a provider credential was given none.
    #[error("missing credential: {0} requires an API key")]
    MissingCredential(&'static str),

    /// The method is network-bound and cannot run through the synchronous entry point.
    #[error("method {0:?} is asynchronous; use `chunk` instead of `chunk_sync`")]
    RequiresAsync(&'static str),

    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Embedding provider error (malformed payload, dimension mismatch, backend failure).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// Transport failure talking to a provider.
    #[cfg(feature = "openai")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An algorithm invariant did not hold.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            Self::MissingCredential(_) => "MISSING_CREDENTIAL",
            Self::RequiresAsync(_) => "REQUIRES_ASYNC",
            Self::InvalidChunkSize(_) => "INVALID_CHUNK_SIZE",
            Self::Embedding(_) => "EMBEDDING_ERROR",
            Self::Provider { .. } => "PROVIDER_ERROR",
            #[cfg(feature = "openai")]
            Self::Http(_) => "HTTP_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error came from an external provider (embedding or chat).
    ///
    /// Provider errors are retryable from the caller's point of view;
    /// configuration errors are not.
    pub fn is_provider_error(&self) -> bool {
        match self {
            Self::Embedding(_) | Self::Provider { .. } => true,
            #[cfg(feature = "openai")]
            Self::Http(_) => true,
            _ => false,
        }
    }
}

/// Result type for chunksmith operations.
pub type Result<T> = std::result::Result<T, Error>;
