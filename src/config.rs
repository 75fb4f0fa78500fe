//! Provider and batching configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the HTTP embedding and chat backends.
///
/// Every field has a default, so a partial JSON document deserializes:
///
/// ```rust
/// use chunksmith::ProviderSettings;
///
/// let settings: ProviderSettings = serde_json::from_str(r#"{"api_key": "sk-test"}"#).unwrap();
/// assert_eq!(settings.embedding_model, "text-embedding-3-small");
/// assert_eq!(settings.batch_size, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Bearer token. Never serialized.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// API root, without the `/v1` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Embedding model name.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Chat model name used for answering.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Expected embedding dimension.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Chunks embedded concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches in milliseconds.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    /// Upper bound on in-flight paragraph embeddings during semantic chunking.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_batch_size() -> usize {
    15
}

fn default_batch_pause_ms() -> u64 {
    200
}

fn default_max_concurrency() -> usize {
    8
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            max_concurrency: default_max_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    /// Defaults overridden by `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `OPENAI_EMBEDDING_MODEL` and `OPENAI_CHAT_MODEL` when set.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();
        settings.api_key = var("OPENAI_API_KEY");
        if let Some(url) = var("OPENAI_BASE_URL") {
            settings.base_url = url;
        }
        if let Some(model) = var("OPENAI_EMBEDDING_MODEL") {
            settings.embedding_model = model;
        }
        if let Some(model) = var("OPENAI_CHAT_MODEL") {
            settings.chat_model = model;
        }
        settings
    }

    /// Use `key` as the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Batch settings for [`embed_chunks`](crate::embed_chunks).
    pub fn batch(&self) -> BatchSettings {
        BatchSettings {
            batch_size: self.batch_size,
            pause: Duration::from_millis(self.batch_pause_ms),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fixed-window batching for bulk embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Requests issued concurrently per batch (minimum 1).
    pub batch_size: usize,
    /// Pause after each batch except the last.
    pub pause: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pause: Duration::from_millis(default_batch_pause_ms()),
        }
    }
}
