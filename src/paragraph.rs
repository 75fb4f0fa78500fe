//! Paragraph-based chunking.
//!
//! Groups whole paragraphs, three per chunk by default. When `max_chunks`
//! would be exceeded, the group size grows to `ceil(paragraphs / max_chunks)`
//! so the whole document still fits the budget.
//!
//! ```text
//! 10 paragraphs, max_chunks = 2
//!
//! natural: 3 per chunk -> 4 chunks (over budget)
//! adjusted: ceil(10 / 2) = 5 per chunk -> 2 chunks
//! ```

use crate::boundary::split_paragraphs;
use crate::fixed::window_ranges;
use crate::options::ChunkingOptions;
use crate::{Chunker, ChunkingResult};

const DEFAULT_PARAGRAPHS: usize = 3;

/// Paragraph-based chunker.
///
/// ## Example
///
/// ```rust
/// use chunksmith::{Chunker, ParagraphChunker};
///
/// let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
/// let result = ParagraphChunker::default().chunk(text);
///
/// assert_eq!(result.len(), 1);
/// assert_eq!(result.chunks[0].text, text);
/// ```
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    paragraphs_per_chunk: usize,
    overlap: usize,
    max_chunks: Option<usize>,
}

impl ParagraphChunker {
    /// Group `paragraphs_per_chunk` paragraphs per chunk; `0` means the default of 3.
    #[must_use]
    pub fn new(paragraphs_per_chunk: usize) -> Self {
        Self {
            paragraphs_per_chunk: if paragraphs_per_chunk == 0 {
                DEFAULT_PARAGRAPHS
            } else {
                paragraphs_per_chunk
            },
            overlap: 0,
            max_chunks: None,
        }
    }

    /// Build from caller options: `chunk_size` paragraphs, `overlap` paragraphs.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        Self::new(options.chunk_size.unwrap_or(0))
            .with_overlap(options.overlap.unwrap_or(0))
            .with_max_chunks(options.max_chunks().unwrap_or(0))
    }

    /// Paragraphs repeated between neighbouring chunks.
    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Fit the document into at most `max` chunks.
    #[must_use]
    pub fn with_max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = Some(max).filter(|&m| m > 0);
        self
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::new(DEFAULT_PARAGRAPHS)
    }
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let paragraphs = split_paragraphs(text);
        let total = paragraphs.len();

        let mut per_chunk = self.paragraphs_per_chunk;
        let mut adjusted = false;
        if let Some(max) = self.max_chunks {
            if total > max.saturating_mul(per_chunk) {
                per_chunk = total.div_ceil(max);
                adjusted = true;
            }
        }

        let step = per_chunk.saturating_sub(self.overlap).max(1);
        let min_tail = (per_chunk as f64 / 3.0).max(1.0);
        let texts: Vec<String> = window_ranges(total, per_chunk, step, min_tail, self.max_chunks)
            .into_iter()
            .map(|r| paragraphs[r].join("\n\n"))
            .collect();

        let mut notes =
            format!("Paragraph-based chunking: {total} paragraphs grouped {per_chunk} per chunk");
        if self.overlap > 0 {
            notes.push_str(&format!(", {} paragraphs overlap", self.overlap));
        }
        if let (true, Some(max)) = (adjusted, self.max_chunks) {
            notes.push_str(&format!(" (group size raised to fit maxChunks = {max})"));
        }
        notes.push('.');

        ChunkingResult::from_texts(texts, notes)
    }
}
