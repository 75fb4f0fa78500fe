//! Local embedding model via fastembed.
//!
//! Runs an ONNX model in-process (BGE-small-en, 384 dimensions, by default).
//! Inference is CPU-bound, so each call runs on tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;

use crate::provider::Embedder;
use crate::{Error, Result};

/// In-process embedder backed by `fastembed::TextEmbedding`.
///
/// ```rust,ignore
/// use chunksmith::{LocalEmbedder, SemanticChunker, ChunkingOptions};
///
/// let embedder = LocalEmbedder::new()?;
/// let chunker = SemanticChunker::with_embedder(embedder, &ChunkingOptions::default());
/// ```
pub struct LocalEmbedder {
    model: Arc<fastembed::TextEmbedding>,
    dimensions: usize,
}

impl LocalEmbedder {
    /// Load fastembed's default model.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding model fails to load.
    pub fn new() -> Result<Self> {
        let model = fastembed::TextEmbedding::try_new(Default::default())
            .map_err(|e| Error::embedding(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            dimensions: 384,
        })
    }
}

impl std::fmt::Debug for LocalEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbedder")
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();
        let mut vectors = tokio::task::spawn_blocking(move || model.embed(vec![text], None))
            .await
            .map_err(|e| Error::internal(format!("embedding task failed: {e}")))?
            .map_err(|e| Error::embedding(e.to_string()))?;

        vectors
            .pop()
            .ok_or_else(|| Error::embedding("model returned no embedding"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
