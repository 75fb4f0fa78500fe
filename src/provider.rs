//! Embedding and chat provider seams.
//!
//! The engine talks to external models only through these two traits.
//! Backends live behind features (`openai`, `local`), and tests plug in
//! in-memory fakes.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::{Error, Result};

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector this embedder returns.
    fn dimensions(&self) -> usize;
}

/// Generates an answer from retrieved context.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Answer `question` following `system`, using only `context`.
    async fn complete(&self, system: &str, context: &str, question: &str) -> Result<String>;
}

/// Embed every text with at most `concurrency` requests in flight.
///
/// Results are placed by input index, not completion order. The first
/// failure is returned. Vectors whose length differs from the first are
/// rejected as an embedding error.
pub async fn embed_all(
    embedder: &dyn Embedder,
    texts: &[&str],
    concurrency: usize,
) -> Result<Vec<Vec<f32>>> {
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; texts.len()];

    let mut results = stream::iter(texts.iter().enumerate())
        .map(|(i, text)| async move { (i, embedder.embed(text).await) })
        .buffer_unordered(concurrency.max(1));

    while let Some((i, result)) = results.next().await {
        slots[i] = Some(result?);
    }

    let vectors: Vec<Vec<f32>> = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.ok_or_else(|| Error::internal(format!("no embedding for input {i}"))))
        .collect::<Result<_>>()?;

    if let Some(first) = vectors.first() {
        if let Some(bad) = vectors.iter().find(|v| v.len() != first.len()) {
            return Err(Error::embedding(format!(
                "dimension mismatch: expected {}, got {}",
                first.len(),
                bad.len()
            )));
        }
    }

    Ok(vectors)
}
