//! Recursive hierarchical splitting (LangChain-style).
//!
//! Tries progressively finer separators until every piece fits the budget,
//! then greedily merges neighbours back up to the budget.
//!
//! ## The Algorithm
//!
//! Given the default separators and a budget of 20 characters:
//!
//! ```text
//! ["\n\n", "\n", ". ", ", ", " ", ""]
//!
//! "Alpha\n\nBeta\n\nGamma delta epsilon zeta"
//!
//! 1. Split on "\n\n":  "Alpha" | "Beta" | "Gamma delta epsilon zeta" (24, too big)
//! 2. Oversized piece, next separator that actually splits it is " ":
//!                      "Gamma" | "delta" | "epsilon" | "zeta"
//! 3. Merge left to right while the result fits:
//!                      "Alpha. Beta. Gamma" | "delta. epsilon. zeta"
//! ```
//!
//! Whatever separator a fragment was split on, neighbours are merged back
//! with `". "`, or just `" "` when the left side already ends with a period.
//!
//! Text that still does not fit once the separators run out is returned as
//! is. With the default list that only happens in token mode, for a single
//! token longer than the budget.
//!
//! ## Separator Presets
//!
//! For Markdown:
//!
//! ```text
//! ["\n## ", "\n### ", "\n\n", "\n", ". ", " "]
//! ```

use tracing::{debug, warn};

use crate::metrics::{tail_chars, tail_tokens};
use crate::options::{ChunkingMode, ChunkingOptions};
use crate::{Chunker, ChunkingResult, Error, FixedChunker, Result};

const DEFAULT_CHARACTERS: usize = 1000;
const DEFAULT_TOKENS: usize = 200;

/// Default separator cascade, coarsest first.
pub const DEFAULT_SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", ", ", " ", ""];

fn join_sentences(left: &str, right: &str) -> String {
    if left.ends_with('.') {
        format!("{left} {right}")
    } else {
        format!("{left}. {right}")
    }
}

/// Recursive separator-cascade chunker.
///
/// ## Example
///
/// ```rust
/// use chunksmith::{Chunker, RecursiveChunker};
///
/// let chunker = RecursiveChunker::new(20, &["\n\n", "\n", ". ", " "]);
/// let result = chunker.chunk("The quick brown fox jumps over the lazy dog.");
///
/// for chunk in &result.chunks {
///     assert!(chunk.characters <= 20);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    size: usize,
    overlap: usize,
    mode: ChunkingMode,
    max_chunks: Option<usize>,
    separators: Vec<String>,
    origin: Option<ChunkingOptions>,
}

impl RecursiveChunker {
    /// Create a chunker measuring `max_size` in characters.
    ///
    /// # Panics
    ///
    /// Panics if `max_size == 0` or `separators` is empty.
    #[must_use]
    pub fn new(max_size: usize, separators: &[&str]) -> Self {
        assert!(max_size > 0, "max_size must be > 0");
        assert!(!separators.is_empty(), "separators must not be empty");

        Self {
            size: max_size,
            overlap: 0,
            mode: ChunkingMode::Characters,
            max_chunks: None,
            separators: separators.iter().map(|&s| s.to_string()).collect(),
            origin: None,
        }
    }

    /// Create a chunker with the default separator cascade.
    #[must_use]
    pub fn prose(max_size: usize) -> Self {
        Self::new(max_size, &DEFAULT_SEPARATORS)
    }

    /// Create a chunker that splits on Markdown section headers first.
    #[must_use]
    pub fn markdown(max_size: usize) -> Self {
        Self::new(max_size, &["\n## ", "\n### ", "\n\n", "\n", ". ", " "])
    }

    /// Build from caller options.
    ///
    /// The mode defaults to characters, with a budget of 1000 characters or
    /// 200 tokens. An explicit size of `0` is kept and reported by
    /// [`try_chunk`](Self::try_chunk).
    pub fn from_options(options: &ChunkingOptions) -> Self {
        let mode = options.chunking_mode.unwrap_or(ChunkingMode::Characters);
        let default_size = match mode {
            ChunkingMode::Characters => DEFAULT_CHARACTERS,
            ChunkingMode::Tokens => DEFAULT_TOKENS,
        };
        let separators = options
            .custom_separators
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect());

        Self {
            size: options.chunk_size.unwrap_or(default_size),
            overlap: options.overlap.unwrap_or(0),
            mode,
            max_chunks: options.max_chunks(),
            separators,
            origin: Some(options.clone()),
        }
    }

    /// Measure the budget in `mode`.
    #[must_use]
    pub fn with_mode(mut self, mode: ChunkingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Prefix each chunk after the first with the tail of its predecessor.
    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Keep at most `max` chunks.
    #[must_use]
    pub fn with_max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = Some(max).filter(|&m| m > 0);
        self
    }

    /// Chunk without the fixed-length safety net.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkSize`] for a zero budget, and
    /// [`Error::Internal`] if splitting produced an empty fragment.
    pub fn try_chunk(&self, text: &str) -> Result<ChunkingResult> {
        if self.size == 0 {
            return Err(Error::InvalidChunkSize(0));
        }
        if text.trim().is_empty() {
            return Ok(ChunkingResult::empty(self.notes(0)));
        }

        let fragments = self.split(text, &self.separators);
        if fragments.iter().any(String::is_empty) {
            return Err(Error::internal("recursive split produced an empty fragment"));
        }
        let fragment_count = fragments.len();
        debug!(fragments = fragment_count, size = self.size, mode = %self.mode, "recursive split");

        let mut chunks = self.merge(fragments);
        if self.overlap > 0 {
            chunks = self.with_overlap_prefix(chunks);
        }
        if let Some(max) = self.max_chunks {
            chunks.truncate(max);
        }

        Ok(ChunkingResult::from_texts(chunks, self.notes(fragment_count)))
    }

    fn fits(&self, text: &str) -> bool {
        self.mode.measure(text) <= self.size
    }

    fn split(&self, text: &str, separators: &[String]) -> Vec<String> {
        let Some((sep, rest)) = separators.split_first() else {
            return vec![text.to_string()];
        };
        if self.fits(text) {
            return vec![text.to_string()];
        }

        let pieces: Vec<String> = if sep.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(sep.as_str())
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect()
        };
        if pieces.len() <= 1 {
            return self.split(text, rest);
        }

        let mut fragments = Vec::with_capacity(pieces.len());
        for piece in pieces {
            if self.fits(&piece) {
                fragments.push(piece);
            } else {
                fragments.extend(self.split(&piece, rest));
            }
        }
        fragments
    }

    fn merge(&self, fragments: Vec<String>) -> Vec<String> {
        fragments
            .into_iter()
            .fold(Vec::<String>::new(), |mut merged, fragment| {
                let candidate = merged
                    .last()
                    .map(|last| join_sentences(last, &fragment))
                    .filter(|candidate| self.fits(candidate));
                match (candidate, merged.last_mut()) {
                    (Some(candidate), Some(last)) => *last = candidate,
                    _ => merged.push(fragment),
                }
                merged
            })
    }

    fn with_overlap_prefix(&self, chunks: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let tail = match i.checked_sub(1).map(|p| chunks[p].as_str()) {
                Some(prev) => match self.mode {
                    ChunkingMode::Tokens => tail_tokens(prev, self.overlap),
                    ChunkingMode::Characters => tail_chars(prev, self.overlap),
                },
                None => String::new(),
            };
            let tail = tail.trim();
            if tail.is_empty() {
                out.push(chunk.clone());
            } else {
                out.push(join_sentences(tail, chunk));
            }
        }
        out
    }

    fn notes(&self, fragments: usize) -> String {
        let mut notes = format!(
            "Recursive splitting: {fragments} fragments from separators {:?}, merged up to {} {} per chunk",
            self.separators, self.size, self.mode
        );
        if self.overlap > 0 {
            notes.push_str(&format!(", {} {} overlap", self.overlap, self.mode));
        }
        notes.push('.');
        notes
    }

    fn fallback_options(&self) -> ChunkingOptions {
        self.origin.clone().unwrap_or_else(|| ChunkingOptions {
            chunk_size: Some(self.size),
            overlap: Some(self.overlap),
            max_chunks: self.max_chunks,
            chunking_mode: Some(self.mode),
            ..ChunkingOptions::default()
        })
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        match self.try_chunk(text) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "recursive splitting failed, falling back to fixed-length chunking");
                FixedChunker::from_options(&self.fallback_options())
                    .chunk(text)
                    .with_note_prefix(&format!(
                        "Recursive splitting failed ({e}); fell back to fixed-length chunking."
                    ))
            }
        }
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        (text_len / self.size.max(1)).max(1)
    }
}
