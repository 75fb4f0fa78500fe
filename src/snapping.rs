//! Character chunking that snaps cuts to natural boundaries.
//!
//! Like fixed-size character chunking, but each cut is moved back (at most
//! 20% of the chunk size) to the nearest sentence end, paragraph break, line
//! break, or word break. The next window starts `overlap` characters before
//! the snapped cut, so nothing between windows is skipped.
//!
//! ```text
//! size = 25, overlap = 0, lookback = 5
//!
//! "The cat sat on the mat. The dog ran."
//!                          ^^
//!               snapped cut  naive cut (25)
//!
//! Chunk 0: "The cat sat on the mat."
//! Chunk 1: "The dog ran."
//! ```

use crate::boundary::find_break_point;
use crate::options::{clamp_overlap, ChunkingOptions};
use crate::{Chunker, ChunkingResult};

const DEFAULT_SIZE: usize = 500;
const DEFAULT_OVERLAP: usize = 50;
const MIN_SIZE: usize = 10;

/// Boundary-snapping character chunker.
///
/// ## Example
///
/// ```rust
/// use chunksmith::{BoundaryChunker, Chunker};
///
/// let chunker = BoundaryChunker::new(25, 0);
/// let result = chunker.chunk("The cat sat on the mat. The dog ran.");
///
/// assert_eq!(result.chunks[0].text, "The cat sat on the mat.");
/// ```
#[derive(Debug, Clone)]
pub struct BoundaryChunker {
    size: usize,
    overlap: usize,
    max_chunks: Option<usize>,
    separator: String,
}

impl BoundaryChunker {
    /// Create a chunker. Size is floored at 10 and overlap clamped below it.
    #[must_use]
    pub fn new(size: usize, overlap: usize) -> Self {
        let size = size.max(MIN_SIZE);
        Self {
            size,
            overlap: clamp_overlap(overlap, size),
            max_chunks: None,
            separator: String::new(),
        }
    }

    /// Build from caller options.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        let mut chunker = Self::new(
            options.chunk_size.unwrap_or(DEFAULT_SIZE),
            options.overlap.unwrap_or(DEFAULT_OVERLAP),
        );
        chunker.max_chunks = options.max_chunks();
        chunker.separator = options.separator.clone().unwrap_or_default();
        chunker
    }

    /// Append `separator` to every chunk.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Stop after `max` chunks.
    #[must_use]
    pub fn with_max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = Some(max).filter(|&m| m > 0);
        self
    }

    /// Effective chunk size after flooring.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Effective overlap after clamping; always `< size()`.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for BoundaryChunker {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_OVERLAP)
    }
}

impl Chunker for BoundaryChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let min_tail = self.size as f64 * 0.25;

        let mut pieces: Vec<String> = Vec::with_capacity(self.estimate_chunks(len));
        let mut start = 0;

        while start < len {
            let naive_end = (start + self.size).min(len);
            let mut end = if naive_end < len {
                find_break_point(&chars, naive_end, self.size)
            } else {
                naive_end
            };
            if end <= start {
                end = naive_end;
            }

            if ((end - start) as f64) < min_tail && !pieces.is_empty() {
                break;
            }

            let piece: String = chars[start..end].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                pieces.push(format!("{trimmed}{}", self.separator));
            }

            if end >= len || self.max_chunks.is_some_and(|m| pieces.len() >= m) {
                break;
            }
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        let mut notes = format!(
            "Character chunking with boundary snapping: {} characters per chunk",
            self.size
        );
        if self.overlap > 0 {
            notes.push_str(&format!(", {} characters overlap", self.overlap));
        }
        notes.push_str("; cuts moved back to sentence, paragraph, line, or word breaks.");

        ChunkingResult::from_texts(pieces, notes)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        text_len.div_ceil(self.size - self.overlap)
    }
}
