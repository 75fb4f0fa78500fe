//! Caller-supplied chunking configuration.
//!
//! All fields are optional. Each strategy applies its own defaults, and the
//! meaning of `overlap` depends on the strategy:
//!
//! | Strategy | `chunk_size` unit | `overlap` unit |
//! |----------|-------------------|----------------|
//! | fixed / sliding-window | tokens or characters | same as size |
//! | character | characters | characters |
//! | sentence | sentences | sentences |
//! | paragraph | paragraphs | paragraphs |
//! | recursive | tokens or characters | same as size |
//! | semantic | (unused) | percent, 0-100 |
//! | hybrid | max tokens | tokens |

use serde::{Deserialize, Serialize};

/// Sizes above this are treated as characters when no mode is given.
pub(crate) const CHARACTER_MODE_THRESHOLD: usize = 200;

/// Unit used to measure chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMode {
    /// Whitespace-delimited tokens.
    Tokens,
    /// Unicode scalar values.
    Characters,
}

impl ChunkingMode {
    /// Plural unit name used in analysis notes.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Characters => "characters",
        }
    }

    /// Legacy inference: sizes above 200 are read as characters.
    ///
    /// This guesses the caller's intent from a number and is kept only for
    /// callers that omit the mode. Prefer setting it explicitly.
    pub fn infer(chunk_size: usize) -> Self {
        if chunk_size > CHARACTER_MODE_THRESHOLD {
            Self::Characters
        } else {
            Self::Tokens
        }
    }

    /// Measure `text` in this unit.
    pub fn measure(self, text: &str) -> usize {
        match self {
            Self::Tokens => crate::count_tokens(text),
            Self::Characters => crate::count_characters(text),
        }
    }
}

impl std::fmt::Display for ChunkingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.unit())
    }
}

/// Options accepted by every strategy.
///
/// ```rust
/// use chunksmith::{ChunkingMode, ChunkingOptions};
///
/// let options = ChunkingOptions::default()
///     .with_chunk_size(50)
///     .with_overlap(10)
///     .with_mode(ChunkingMode::Tokens);
/// assert_eq!(options.chunk_size, Some(50));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingOptions {
    /// Target chunk size, in the strategy's unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    /// Overlap between neighbouring chunks, in the strategy's unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<usize>,
    /// Appended verbatim to each chunk by the character strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Upper bound on the number of chunks; `0` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chunks: Option<usize>,
    /// Credential for the embedding provider used by semantic chunking.
    #[serde(default, skip_serializing)]
    pub embedding_api_key: Option<String>,
    /// Explicit size unit; when absent some strategies infer it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunking_mode: Option<ChunkingMode>,
    /// Separator cascade for the recursive strategy, coarsest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_separators: Option<Vec<String>>,
}

impl ChunkingOptions {
    /// Set the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Set the overlap.
    #[must_use]
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Set the per-chunk separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Set the chunk ceiling.
    #[must_use]
    pub fn with_max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = Some(max);
        self
    }

    /// Set the embedding provider key.
    #[must_use]
    pub fn with_embedding_api_key(mut self, key: impl Into<String>) -> Self {
        self.embedding_api_key = Some(key.into());
        self
    }

    /// Set the size unit.
    #[must_use]
    pub fn with_mode(mut self, mode: ChunkingMode) -> Self {
        self.chunking_mode = Some(mode);
        self
    }

    /// Set the recursive separator cascade.
    #[must_use]
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_separators = Some(separators.into_iter().map(Into::into).collect());
        self
    }

    /// The chunk ceiling, with `0` read as "unset".
    pub fn max_chunks(&self) -> Option<usize> {
        self.max_chunks.filter(|&m| m > 0)
    }

    /// The embedding key, ignoring blank strings.
    pub fn api_key(&self) -> Option<&str> {
        self.embedding_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Clamp `overlap` so that `size - overlap >= 1`.
pub(crate) fn clamp_overlap(overlap: usize, size: usize) -> usize {
    overlap.min(size.saturating_sub(1))
}
