//! Sentence-based chunking.
//!
//! Splits text into paragraphs, paragraphs into sentences, then groups N
//! sentences per chunk with an optional sentence overlap.
//!
//! ## The Hard Part: Finding Sentences
//!
//! Sentence detection seems simple until you encounter:
//!
//! ```text
//! "Dr. Smith paid 3.50 on Tuesday."
//!     ^            ^
//!     Not a sentence end (title, decimal)
//! ```
//!
//! See [`split_sentences`](crate::split_sentences) for how titles, Latin
//! abbreviations, and decimals are protected.
//!
//! ## Why Group Sentences?
//!
//! Single sentences are often too short for effective retrieval. A question
//! like "What did the author conclude?" needs paragraph-level context.
//!
//! | Sentences/Chunk | Pros | Cons |
//! |-----------------|------|------|
//! | 1 | Precise retrieval | No context |
//! | 3-5 | Good balance | May split paragraphs |
//! | 10+ | Full context | May exceed model limits |

use crate::boundary::split_text_sentences;
use crate::fixed::window_ranges;
use crate::options::{clamp_overlap, ChunkingOptions};
use crate::{Chunker, ChunkingResult};

const DEFAULT_SENTENCES: usize = 5;

/// Sentence-based chunker.
///
/// ## Example
///
/// ```rust
/// use chunksmith::{Chunker, SentenceChunker};
///
/// let chunker = SentenceChunker::new(2);
/// let result = chunker.chunk("First sentence. Second sentence. Third sentence.");
///
/// assert_eq!(result.len(), 2);
/// assert_eq!(result.chunks[0].text, "First sentence. Second sentence.");
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    sentences_per_chunk: usize,
    overlap: usize,
    max_chunks: Option<usize>,
}

impl SentenceChunker {
    /// Create a new sentence chunker.
    ///
    /// # Panics
    ///
    /// Panics if `sentences_per_chunk == 0`.
    #[must_use]
    pub fn new(sentences_per_chunk: usize) -> Self {
        assert!(sentences_per_chunk > 0, "sentences_per_chunk must be > 0");
        Self {
            sentences_per_chunk,
            overlap: 0,
            max_chunks: None,
        }
    }

    /// Create a chunker that outputs one sentence per chunk.
    #[must_use]
    pub fn single() -> Self {
        Self::new(1)
    }

    /// Build from caller options: `chunk_size` sentences, `overlap` sentences.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        let size = options
            .chunk_size
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_SENTENCES);
        Self::new(size)
            .with_overlap(options.overlap.unwrap_or(0))
            .with_max_chunks(options.max_chunks().unwrap_or(0))
    }

    /// Repeat the last `overlap` sentences of a chunk at the start of the next.
    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = clamp_overlap(overlap, self.sentences_per_chunk);
        self
    }

    /// Consider at most `max * sentences_per_chunk` sentences and emit at most `max` chunks.
    #[must_use]
    pub fn with_max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = Some(max).filter(|&m| m > 0);
        self
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let size = self.sentences_per_chunk;
        let mut sentences = split_text_sentences(text);
        let detected = sentences.len();

        if let Some(max) = self.max_chunks {
            sentences.truncate(max.saturating_mul(size));
        }

        let step = size - self.overlap;
        let min_tail = (size as f64 / 4.0).max(1.0);
        let texts: Vec<String> =
            window_ranges(sentences.len(), size, step, min_tail, self.max_chunks)
                .into_iter()
                .map(|r| sentences[r].join(" "))
                .collect();

        let mut notes = format!(
            "Sentence-based chunking: {detected} sentences grouped {size} per chunk"
        );
        if self.overlap > 0 {
            notes.push_str(&format!(", {} sentences overlap", self.overlap));
        }
        if sentences.len() < detected {
            notes.push_str(&format!(
                " (first {} sentences considered to respect maxChunks)",
                sentences.len()
            ));
        }
        notes.push('.');

        ChunkingResult::from_texts(texts, notes)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        // Rough estimate: ~100 chars per sentence
        let estimated_sentences = text_len / 100;
        (estimated_sentences / self.sentences_per_chunk).max(1)
    }
}
