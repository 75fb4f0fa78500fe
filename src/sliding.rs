//! Sliding-window chunking.
//!
//! Fixed-size windows that advance by `size - overlap`, with a hard ceiling on
//! output size. If the natural step would produce more windows than the
//! ceiling (100 by default), the step widens to `ceil(len / ceiling)`.
//!
//! ```text
//! size = 4 tokens, overlap = 2, 10 tokens
//!
//! [a b c d]
//!     [c d e f]
//!         [e f g h]
//!             [g h i j]
//!                 [i j]
//! ```
//!
//! A widened step can exceed the window size, leaving gaps. That trade is
//! reported in the analysis notes together with the step actually used.

use crate::options::{clamp_overlap, ChunkingMode, ChunkingOptions};
use crate::{fixed::window_ranges, tokenize, Chunker, ChunkingResult};

const DEFAULT_SIZE: usize = 100;
const DEFAULT_OVERLAP: usize = 50;

/// Default cap on the number of windows.
pub const DEFAULT_WINDOW_CEILING: usize = 100;

/// Sliding-window chunker.
///
/// ## Example
///
/// ```rust
/// use chunksmith::{Chunker, SlidingWindowChunker};
///
/// let result = SlidingWindowChunker::new(4, 2).chunk("a b c d e f g h i j");
/// let texts: Vec<&str> = result.texts().collect();
/// assert_eq!(texts, vec!["a b c d", "c d e f", "e f g h", "g h i j", "i j"]);
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindowChunker {
    size: usize,
    overlap: usize,
    mode: Option<ChunkingMode>,
    max_chunks: Option<usize>,
    ceiling: usize,
}

impl SlidingWindowChunker {
    /// Create a chunker with `size` units per window and `overlap` shared units.
    #[must_use]
    pub fn new(size: usize, overlap: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            overlap: clamp_overlap(overlap, size),
            mode: None,
            max_chunks: None,
            ceiling: DEFAULT_WINDOW_CEILING,
        }
    }

    /// Build from caller options.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        let mut chunker = Self::new(
            options.chunk_size.filter(|&s| s > 0).unwrap_or(DEFAULT_SIZE),
            options.overlap.unwrap_or(DEFAULT_OVERLAP),
        );
        chunker.mode = options.chunking_mode;
        chunker.max_chunks = options.max_chunks();
        chunker
    }

    /// Fix the unit instead of inferring it from the size.
    #[must_use]
    pub fn with_mode(mut self, mode: ChunkingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Change the window ceiling (minimum 1).
    #[must_use]
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling.max(1);
        self
    }

    /// Step used for a text of `len` units.
    pub fn effective_step(&self, len: usize) -> usize {
        let natural = self.size - self.overlap;
        if len.div_ceil(natural) > self.ceiling {
            natural.max(len.div_ceil(self.ceiling))
        } else {
            natural
        }
    }
}

impl Default for SlidingWindowChunker {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_OVERLAP)
    }
}

impl Chunker for SlidingWindowChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let mode = self.mode.unwrap_or_else(|| ChunkingMode::infer(self.size));
        let limit = Some(
            self.max_chunks
                .map_or(self.ceiling, |m| m.min(self.ceiling)),
        );

        let (texts, len): (Vec<String>, usize) = match mode {
            ChunkingMode::Tokens => {
                let tokens = tokenize(text);
                let step = self.effective_step(tokens.len());
                let texts = window_ranges(tokens.len(), self.size, step, 0.0, limit)
                    .into_iter()
                    .map(|r| tokens[r].join(" "))
                    .collect();
                (texts, tokens.len())
            }
            ChunkingMode::Characters => {
                let chars: Vec<char> = text.chars().collect();
                let step = self.effective_step(chars.len());
                let texts = window_ranges(chars.len(), self.size, step, 0.0, limit)
                    .into_iter()
                    .map(|r| chars[r].iter().collect::<String>())
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                (texts, chars.len())
            }
        };

        let natural = self.size - self.overlap;
        let step = self.effective_step(len);
        let mut notes = format!(
            "Sliding window: {} {mode} per window, {} {mode} overlap, step {step}",
            self.size, self.overlap
        );
        if step > natural {
            notes.push_str(&format!(
                " (widened from {natural} to stay within {} windows)",
                self.ceiling
            ));
        }
        notes.push('.');

        ChunkingResult::from_texts(texts, notes)
    }
}
