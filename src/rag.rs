//! Retrieval over chunked documents.
//!
//! Brute-force ranking: every embedded chunk is scored against the query
//! with cosine similarity, O(n) per query, no index.
//!
//! ```text
//! chunks ──embed_chunks──▶ EmbeddedChunk[] ──rank(query)──▶ top-k ──▶ context ──▶ chat
//!          (batches of 15,                                     (blank-line join)
//!           200ms apart)
//! ```

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BatchSettings;
use crate::provider::{ChatProvider, Embedder};
use crate::similarity::cosine_similarity;
use crate::{Chunk, ChunkingResult, Result};

/// Instruction sent with every question. Answers must come from the context.
pub const ANSWER_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based \
only on the provided context. If the context does not contain enough information to answer the \
question, respond with: \"I don't have enough information in the provided context to answer this \
question.\" Do not use any prior knowledge.";

/// The reply the chat model is told to give when the context falls short.
pub const INSUFFICIENT_INFORMATION: &str =
    "I don't have enough information in the provided context to answer this question.";

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// A chunk with its embedding, if one was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    /// The chunk.
    #[serde(flatten)]
    pub chunk: Chunk,
    /// `None` until embedded, or if embedding failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl EmbeddedChunk {
    /// Wrap a chunk without an embedding.
    pub fn new(chunk: Chunk) -> Self {
        Self {
            chunk,
            embedding: None,
        }
    }

    /// Wrap every chunk of a result.
    pub fn from_result(result: ChunkingResult) -> Vec<Self> {
        result.chunks.into_iter().map(Self::new).collect()
    }
}

/// One ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Id of the matched chunk.
    pub chunk_id: usize,
    /// Chunk text.
    pub text: String,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Outcome of a bulk embedding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingReport {
    /// Chunks that now carry an embedding.
    pub embedded: usize,
    /// `(index, message)` for every chunk whose embedding failed.
    pub errors: Vec<(usize, String)>,
}

impl EmbeddingReport {
    /// Whether every chunk was embedded.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Embed `chunks` in place, in fixed batches.
///
/// Requests within a batch run concurrently and are written back by index.
/// A failed request leaves that chunk's embedding as `None` and is recorded
/// in the report. Its siblings are unaffected. The pause runs between
/// batches, not after the last one.
pub async fn embed_chunks(
    embedder: &dyn Embedder,
    chunks: &mut [EmbeddedChunk],
    batch: &BatchSettings,
) -> EmbeddingReport {
    let size = batch.batch_size.max(1);
    let total_batches = chunks.len().div_ceil(size);
    let mut report = EmbeddingReport::default();

    for (b, group) in chunks.chunks_mut(size).enumerate() {
        let offset = b * size;
        let results = join_all(group.iter().map(|c| embedder.embed(&c.chunk.text))).await;

        for (i, result) in results.into_iter().enumerate() {
            match result {
                Ok(vector) => {
                    group[i].embedding = Some(vector);
                    report.embedded += 1;
                }
                Err(e) => {
                    warn!(index = offset + i, error = %e, "chunk embedding failed");
                    group[i].embedding = None;
                    report.errors.push((offset + i, e.to_string()));
                }
            }
        }

        debug!(batch = b + 1, of = total_batches, "embedding batch done");
        if b + 1 < total_batches && !batch.pause.is_zero() {
            tokio::time::sleep(batch.pause).await;
        }
    }

    report
}

/// Rank embedded chunks against `query` by descending cosine similarity.
///
/// Chunks without an embedding are skipped.
///
/// ```rust
/// use chunksmith::{rank, Chunk, EmbeddedChunk};
///
/// let chunks = vec![
///     EmbeddedChunk { chunk: Chunk::new(0, "cats"), embedding: Some(vec![1.0, 0.0]) },
///     EmbeddedChunk { chunk: Chunk::new(1, "stocks"), embedding: Some(vec![0.0, 1.0]) },
///     EmbeddedChunk { chunk: Chunk::new(2, "pending"), embedding: None },
/// ];
/// let results = rank(&[0.9, 0.1], &chunks, 5);
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].text, "cats");
/// ```
pub fn rank(query: &[f32], chunks: &[EmbeddedChunk], top_k: usize) -> Vec<QueryResult> {
    let mut results: Vec<QueryResult> = chunks
        .iter()
        .filter_map(|c| {
            c.embedding.as_ref().map(|e| QueryResult {
                chunk_id: c.chunk.id,
                text: c.chunk.text.clone(),
                score: cosine_similarity(query, e),
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(top_k);
    results
}

/// Join retrieved texts with blank lines.
pub fn build_context(results: &[QueryResult]) -> String {
    results
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A generated answer and the chunks it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// Model output.
    pub text: String,
    /// Retrieved chunks, best first.
    pub sources: Vec<QueryResult>,
}

/// Answer `question` from the `top_k` chunks closest to it
/// ([`DEFAULT_TOP_K`] when `None`).
///
/// # Errors
///
/// Fails if the question cannot be embedded (there is nothing to rank
/// against) or if the chat provider fails.
pub async fn answer_question(
    embedder: &dyn Embedder,
    chat: &dyn ChatProvider,
    chunks: &[EmbeddedChunk],
    question: &str,
    top_k: Option<usize>,
) -> Result<Answer> {
    let query = embedder.embed(question).await?;
    let sources = rank(&query, chunks, top_k.unwrap_or(DEFAULT_TOP_K));
    debug!(retrieved = sources.len(), "answering from context");

    let context = build_context(&sources);
    let text = chat
        .complete(ANSWER_SYSTEM_PROMPT, &context, question)
        .await?;

    Ok(Answer { text, sources })
}
