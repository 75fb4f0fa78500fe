//! OpenAI-compatible HTTP backends.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::provider::{ChatProvider, Embedder};
use crate::{Error, Result};

fn build_client(settings: &ProviderSettings) -> Result<Client> {
    Ok(Client::builder().timeout(settings.timeout()).build()?)
}

fn require_key(settings: &ProviderSettings, what: &'static str) -> Result<String> {
    settings
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .ok_or(Error::MissingCredential(what))
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Provider {
        status: status.as_u16(),
        body,
    })
}

/// Embedding backend for `POST {base_url}/v1/embeddings`.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Build from settings.
    ///
    /// # Errors
    ///
    /// [`Error::MissingCredential`] when no key is configured, or
    /// [`Error::Http`] if the client cannot be built.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            api_key: require_key(settings, "embedding")?,
            client: build_client(settings)?,
            model: settings.embedding_model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            dimensions: settings.dimensions,
        })
    }

    /// Build with default settings and the given key.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(&ProviderSettings::default().with_api_key(api_key))
    }
}

impl std::fmt::Debug for OpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbedder")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        let response: EmbedResponse = check_status(response).await?.json().await?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| Error::embedding("response contained no embedding"))?;

        if embedding.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "dimension mismatch: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Chat backend for `POST {base_url}/v1/chat/completions`.
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiChat {
    /// Build from settings.
    ///
    /// # Errors
    ///
    /// [`Error::MissingCredential`] when no key is configured.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            api_key: require_key(settings, "chat")?,
            client: build_client(settings)?,
            model: settings.chat_model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl std::fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(&self, system: &str, context: &str, question: &str) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": format!("Context:\n{context}\n\nQuestion: {question}") },
            ],
        });

        debug!(%url, model = %self.model, "chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let resp: serde_json::Value = check_status(response).await?.json().await?;
        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| Error::Provider {
                status: 200,
                body: "missing choices[0].message.content".into(),
            })
    }
}
