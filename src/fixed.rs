//! Fixed-length chunking with overlap.
//!
//! The simplest strategy: take N units, step forward, repeat. A unit is a
//! whitespace token or a character.
//!
//! ## How It Works
//!
//! ```text
//! size = 5 tokens, overlap = 2
//!
//! Tokens:  a b c d e f g h i j k
//!
//! Chunk 0: a b c d e        [0..5]
//! Chunk 1:       d e f g h  [3..8]    <- step = 5 - 2 = 3
//! Chunk 2:             g h i j k  [6..11]
//! Chunk 3:                   j k   [9..11]  kept: 2 >= 25% of 5
//! ```
//!
//! A final fragment smaller than a quarter of the chunk size is dropped once at
//! least one chunk exists. The first chunk is always kept.
//!
//! ## Token vs Character Mode
//!
//! An explicit [`ChunkingMode`] always wins. Explicit character mode hands the
//! work to [`BoundaryChunker`], which snaps cuts to sentence and word breaks.
//! Without a mode, sizes above 200 are read as characters and cut naively.
//! That inference is kept for older callers. New code should set the mode.

use std::ops::Range;

use crate::options::{clamp_overlap, ChunkingMode, ChunkingOptions};
use crate::{tokenize, BoundaryChunker, Chunker, ChunkingResult};

const DEFAULT_SIZE: usize = 100;

/// Fixed-length chunker in token or character mode.
///
/// ## Example
///
/// ```rust
/// use chunksmith::{Chunker, ChunkingMode, FixedChunker};
///
/// let chunker = FixedChunker::new(5, 0).with_mode(ChunkingMode::Tokens);
/// let result = chunker.chunk("a b c d e f g h i j");
///
/// assert_eq!(result.len(), 2);
/// assert_eq!(result.chunks[0].text, "a b c d e");
/// assert_eq!(result.chunks[1].text, "f g h i j");
/// ```
#[derive(Debug, Clone)]
pub struct FixedChunker {
    size: Option<usize>,
    overlap: Option<usize>,
    mode: Option<ChunkingMode>,
    max_chunks: Option<usize>,
    separator: Option<String>,
}

impl FixedChunker {
    /// Create a new fixed-length chunker.
    ///
    /// Overlap is clamped below `size` so every step moves forward.
    ///
    /// # Panics
    ///
    /// Panics if `size == 0`.
    #[must_use]
    pub fn new(size: usize, overlap: usize) -> Self {
        assert!(size > 0, "chunk size must be > 0");
        Self {
            size: Some(size),
            overlap: Some(overlap),
            mode: None,
            max_chunks: None,
            separator: None,
        }
    }

    /// Create a chunker with no overlap.
    #[must_use]
    pub fn no_overlap(size: usize) -> Self {
        Self::new(size, 0)
    }

    /// Build from caller options. A zero size reads as unset.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        Self {
            size: options.chunk_size.filter(|&s| s > 0),
            overlap: options.overlap,
            mode: options.chunking_mode,
            max_chunks: options.max_chunks(),
            separator: options.separator.clone(),
        }
    }

    /// Fix the unit instead of inferring it from the size.
    #[must_use]
    pub fn with_mode(mut self, mode: ChunkingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Stop after `max` chunks.
    #[must_use]
    pub fn with_max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = Some(max).filter(|&m| m > 0);
        self
    }

    fn size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_SIZE)
    }

    /// The step size between chunk starts.
    fn step(&self) -> usize {
        let overlap = clamp_overlap(self.overlap.unwrap_or(0), self.size());
        if overlap > 0 {
            self.size() - overlap
        } else {
            self.size()
        }
    }

    /// Options for the boundary-snapping delegate; unset fields keep its defaults.
    fn boundary_delegate(&self) -> BoundaryChunker {
        BoundaryChunker::from_options(&ChunkingOptions {
            chunk_size: self.size,
            overlap: self.overlap,
            separator: self.separator.clone(),
            max_chunks: self.max_chunks,
            ..ChunkingOptions::default()
        })
    }

    fn naive(&self, text: &str, mode: ChunkingMode) -> Vec<String> {
        let size = self.size();
        let step = self.step();
        let min_tail = size as f64 * 0.25;

        match mode {
            ChunkingMode::Tokens => {
                let tokens = tokenize(text);
                window_ranges(tokens.len(), size, step, min_tail, self.max_chunks)
                    .into_iter()
                    .map(|r| tokens[r].join(" "))
                    .collect()
            }
            ChunkingMode::Characters => {
                let chars: Vec<char> = text.chars().collect();
                window_ranges(chars.len(), size, step, min_tail, self.max_chunks)
                    .into_iter()
                    .map(|r| chars[r].iter().collect())
                    .collect()
            }
        }
    }

    fn notes(&self, mode: ChunkingMode, inferred: bool) -> String {
        let size = self.size();
        let overlap = size - self.step();
        let mut notes = format!("Fixed-length chunking: {size} {mode} per chunk");
        if overlap > 0 {
            notes.push_str(&format!(", {overlap} {mode} overlap"));
        }
        if inferred && mode == ChunkingMode::Characters {
            notes.push_str(" (character mode inferred from chunk size > 200)");
        }
        notes.push('.');
        notes
    }
}

impl Default for FixedChunker {
    fn default() -> Self {
        Self::from_options(&ChunkingOptions::default())
    }
}

impl Chunker for FixedChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let (mode, inferred) = match self.mode {
            Some(ChunkingMode::Characters) => return self.boundary_delegate().chunk(text),
            Some(mode) => (mode, false),
            None => (ChunkingMode::infer(self.size()), true),
        };

        ChunkingResult::from_texts(self.naive(text, mode), self.notes(mode, inferred))
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        if text_len == 0 {
            return 0;
        }
        text_len.div_ceil(self.step())
    }
}

/// Window ranges over `len` units.
///
/// Starts advance by `step`. A final window shorter than `min_tail` units is
/// skipped once a window exists. `max` caps the number of windows.
pub(crate) fn window_ranges(
    len: usize,
    size: usize,
    step: usize,
    min_tail: f64,
    max: Option<usize>,
) -> Vec<Range<usize>> {
    let step = step.max(1);
    let mut ranges = Vec::with_capacity(len.div_ceil(step));
    let mut start = 0;

    while start < len {
        let end = (start + size).min(len);
        if ((end - start) as f64) < min_tail && !ranges.is_empty() {
            break;
        }
        ranges.push(start..end);
        if max.is_some_and(|m| ranges.len() >= m) {
            break;
        }
        start += step;
    }

    ranges
}
