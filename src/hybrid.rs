//! Hybrid composition: paragraphs first, finer strategies only where needed.
//!
//! ```text
//! budget = 100 tokens
//!
//! paragraph chunk (tokens)   treatment
//! ------------------------   -----------------------------------------
//!        ≤ 100               kept as is
//!      101..=200             sentence chunking, ceil(100/10) = 10 per chunk
//!        > 200               sliding window of 100 tokens
//!
//! then: neighbours merged while the pair stays within 100 tokens
//! ```

use tracing::debug;

use crate::metrics::count_tokens;
use crate::options::{ChunkingMode, ChunkingOptions};
use crate::{Chunker, ChunkingResult, ParagraphChunker, SentenceChunker, SlidingWindowChunker};

const DEFAULT_BUDGET: usize = 100;

/// Paragraph, sentence and sliding-window composition under a token budget.
///
/// ```rust
/// use chunksmith::{Chunker, HybridChunker};
///
/// let text = "Short intro.\n\nAnother short paragraph.";
/// let result = HybridChunker::new(50).chunk(text);
/// assert_eq!(result.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HybridChunker {
    budget: usize,
    overlap: Option<usize>,
}

impl HybridChunker {
    /// Create a chunker with a budget of `max_tokens` per chunk (minimum 1).
    #[must_use]
    pub fn new(max_tokens: usize) -> Self {
        Self {
            budget: max_tokens.max(1),
            overlap: None,
        }
    }

    /// Build from caller options: `chunk_size` is the token budget.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        Self {
            budget: options.chunk_size.filter(|&s| s > 0).unwrap_or(DEFAULT_BUDGET),
            overlap: options.overlap,
        }
    }

    /// Overlap handed to the finer strategies. Sentence re-splitting uses a
    /// tenth of it, in sentences.
    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    fn refine(&self, paragraph_chunk: &str) -> Vec<String> {
        let tokens = count_tokens(paragraph_chunk);
        if tokens <= self.budget {
            return vec![paragraph_chunk.to_string()];
        }
        if tokens <= self.budget.saturating_mul(2) {
            let sentences = self.budget.div_ceil(10);
            let overlap = self.overlap.unwrap_or(0).div_ceil(10);
            return SentenceChunker::new(sentences)
                .with_overlap(overlap)
                .chunk(paragraph_chunk)
                .into_texts();
        }

        let window = match self.overlap {
            Some(overlap) => SlidingWindowChunker::new(self.budget, overlap),
            None => SlidingWindowChunker::from_options(
                &ChunkingOptions::default().with_chunk_size(self.budget),
            ),
        };
        window
            .with_mode(ChunkingMode::Tokens)
            .chunk(paragraph_chunk)
            .into_texts()
    }

    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        pieces.into_iter().fold(Vec::new(), |mut merged, piece| {
            match merged.last_mut() {
                Some(last) if count_tokens(last) + count_tokens(&piece) <= self.budget => {
                    last.push_str("\n\n");
                    last.push_str(&piece);
                }
                _ => merged.push(piece),
            }
            merged
        })
    }
}

impl Default for HybridChunker {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl Chunker for HybridChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let paragraph_chunks = ParagraphChunker::default().chunk(text);
        let refined: Vec<String> = paragraph_chunks
            .texts()
            .flat_map(|chunk| self.refine(chunk))
            .collect();
        let refined_count = refined.len();
        let merged = self.merge(refined);

        debug!(
            paragraph_chunks = paragraph_chunks.len(),
            refined = refined_count,
            merged = merged.len(),
            budget = self.budget,
            "hybrid composition"
        );

        let notes = format!(
            "Hybrid chunking: {} paragraph chunks refined into {refined_count} pieces \
             (sentence split above {} tokens, sliding window above {} tokens), \
             then merged up to {} tokens per chunk.",
            paragraph_chunks.len(),
            self.budget,
            self.budget.saturating_mul(2),
            self.budget
        );
        ChunkingResult::from_texts(merged, notes)
    }
}
