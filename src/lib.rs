//! # chunksmith
//!
//! Multi-strategy text segmentation for retrieval-augmented generation (RAG).
//!
//! ## The Problem
//!
//! Documents don't fit in a context window, so they are split into chunks
//! that are embedded and retrieved on demand. Chunks must be small enough to
//! embed and large enough to keep their meaning:
//!
//! - A sentence split mid-word is garbage
//! - A paragraph split mid-argument loses coherence
//! - Overlap helps continuity, but its right unit depends on the strategy
//!
//! No single rule fits every document, so this crate offers nine.
//!
//! ## Strategies
//!
//! | Name | Chunker | Sizes in | Overlap in |
//! |------|---------|----------|------------|
//! | `fixed` | [`FixedChunker`] | tokens or characters | same |
//! | `character` | [`BoundaryChunker`] | characters | characters |
//! | `sentence` | [`SentenceChunker`] | sentences | sentences |
//! | `paragraph` | [`ParagraphChunker`] | paragraphs | paragraphs |
//! | `sliding-window` | [`SlidingWindowChunker`] | tokens or characters | same |
//! | `recursive` | [`RecursiveChunker`] | characters (default) or tokens | same |
//! | `semantic` | [`SemanticChunker`] | clusters of paragraphs | percent |
//! | `hybrid` | [`HybridChunker`] | max tokens | tokens |
//! | `agentic` | [`AgenticChunker`] | picked per document | picked per document |
//!
//! ### Fixed Size (Baseline)
//!
//! ```text
//! size = 5 tokens, overlap = 0
//!
//! "a b c d e f g h i j"  ->  "a b c d e" | "f g h i j"
//! ```
//!
//! **When to use**: Homogeneous content, baseline comparisons.
//! **Weakness**: Ignores linguistic boundaries.
//!
//! ### Sentence and Paragraph
//!
//! Group N sentences or N paragraphs per chunk. Sentence detection skips
//! titles (`Dr.`), Latin abbreviations (`e.g.`) and decimals (`3.50`).
//!
//! ### Recursive (LangChain-style)
//!
//! ```text
//! Separators: ["\n\n", "\n", ". ", ", ", " ", ""]
//!
//! 1. Split on the coarsest separator that actually splits
//! 2. Pieces still over budget? Recurse with the finer separators
//! 3. Merge neighbours back up to the budget
//! ```
//!
//! ### Semantic (Embedding-Based)
//!
//! Embed each paragraph, then merge the most similar *adjacent* groups until
//! about a third remain. Needs an [`Embedder`]; without one it degrades to
//! the structural heuristic, and it never fails the call.
//!
//! ### Hybrid and Agentic
//!
//! Hybrid starts from paragraphs and only splits further where a group is
//! over budget. Agentic measures the document ([`DocumentStats`]) and picks
//! one of the other strategies with a fixed rule list.
//!
//! ## Quick Start
//!
//! ```rust
//! use chunksmith::{chunk_sync, Chunker, ChunkingOptions, RecursiveChunker, SentenceChunker};
//!
//! let text = "The quick brown fox jumps over the lazy dog. \
//!             Pack my box with five dozen liquor jugs.";
//!
//! // Direct use of a chunker
//! let result = SentenceChunker::new(1).chunk(text);
//! assert_eq!(result.len(), 2);
//!
//! // Recursive with custom separators
//! let result = RecursiveChunker::new(50, &["\n\n", ". ", " "]).chunk(text);
//! assert!(result.chunks.iter().all(|c| c.characters <= 50));
//!
//! // Dispatch by name
//! let options = ChunkingOptions::default().with_chunk_size(5);
//! let result = chunk_sync(text, "fixed", &options).unwrap();
//! assert_eq!(result.analysis.total_chunks, result.len());
//! ```
//!
//! ## Retrieval
//!
//! ```rust,ignore
//! use chunksmith::{answer_question, embed_chunks, EmbeddedChunk, OpenAiChat, OpenAiEmbedder, ProviderSettings};
//!
//! let settings = ProviderSettings::from_env();
//! let embedder = OpenAiEmbedder::new(&settings)?;
//! let chat = OpenAiChat::new(&settings)?;
//!
//! let mut chunks = EmbeddedChunk::from_result(result);
//! let report = embed_chunks(&embedder, &mut chunks, &settings.batch()).await;
//! let answer = answer_question(&embedder, &chat, &chunks, "Who jumps?", None).await?;
//! ```
//!
//! ## Performance Considerations
//!
//! | Strategy | Speed | Memory |
//! |----------|-------|--------|
//! | Fixed / Sliding | O(n) | O(n) |
//! | Sentence / Paragraph | O(n) | O(n) |
//! | Recursive | O(n log n) | O(n) |
//! | Semantic | O(p² × d) + p embedding calls | O(p² + p × d) |
//!
//! Where n = document length, p = paragraph count, d = embedding dimension.
//!
//! ## Logging
//!
//! Decisions and fallbacks are reported through `tracing`. The crate never
//! installs a subscriber.

mod agentic;
mod boundary;
mod chunk;
mod config;
mod error;
mod export;
mod fixed;
mod hybrid;
mod metrics;
mod options;
mod paragraph;
mod provider;
mod rag;
mod recursive;
mod semantic;
mod sentence;
mod similarity;
mod sliding;
mod snapping;
mod strategy;
mod structural;

#[cfg(feature = "local")]
mod local;
#[cfg(feature = "openai")]
mod openai;

pub use agentic::{AgenticChunker, DocumentStats, SelectedStrategy, Selection};
pub use boundary::{find_break_point, split_paragraphs, split_sentences, split_text_sentences};
pub use chunk::{Analysis, AverageSize, Chunk, ChunkingResult};
pub use config::{BatchSettings, ProviderSettings};
pub use error::{Error, Result};
pub use export::{export_json, ChunkSize, ExportChunk, ExportDocument, ExportMetadata};
pub use fixed::FixedChunker;
pub use hybrid::HybridChunker;
pub use metrics::{count_characters, count_tokens, tokenize};
pub use options::{ChunkingMode, ChunkingOptions};
pub use paragraph::ParagraphChunker;
pub use provider::{embed_all, ChatProvider, Embedder};
pub use rag::{
    answer_question, build_context, embed_chunks, rank, Answer, EmbeddedChunk, EmbeddingReport,
    QueryResult, ANSWER_SYSTEM_PROMPT, DEFAULT_TOP_K, INSUFFICIENT_INFORMATION,
};
pub use recursive::{RecursiveChunker, DEFAULT_SEPARATORS};
pub use semantic::SemanticChunker;
pub use sentence::SentenceChunker;
pub use similarity::{cosine_similarity, similarity_matrix, weighted_mean};
pub use sliding::{SlidingWindowChunker, DEFAULT_WINDOW_CEILING};
pub use snapping::BoundaryChunker;
pub use strategy::{chunk, chunk_sync, chunk_with_settings, Method, Strategy};
pub use structural::HeuristicChunker;

#[cfg(feature = "local")]
pub use local::LocalEmbedder;
#[cfg(feature = "openai")]
pub use openai::{OpenAiChat, OpenAiEmbedder};

/// A synchronous text chunking strategy.
///
/// Every strategy except semantic chunking implements this trait:
///
/// ```rust
/// use chunksmith::{Chunker, ChunkingResult, FixedChunker, ParagraphChunker};
///
/// fn chunk_document(chunker: &dyn Chunker, text: &str) -> ChunkingResult {
///     chunker.chunk(text)
/// }
///
/// let text = "Hello world. This is a test.";
/// let a = chunk_document(&FixedChunker::new(100, 20), text);
/// let b = chunk_document(&ParagraphChunker::default(), text);
/// assert_eq!(a.len(), b.len());
/// ```
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Ids are sequential from zero and the analysis always matches the
    /// chunk list. Empty or whitespace-only input yields no chunks.
    fn chunk(&self, text: &str) -> ChunkingResult;

    /// Estimate the number of chunks for a text of `text_len` characters.
    ///
    /// Useful for pre-allocation. May be approximate.
    fn estimate_chunks(&self, text_len: usize) -> usize {
        (text_len / 500).max(1)
    }
}
