//! The Chunk type and the result every strategy returns.
//!
//! A [`Chunk`] is an immutable value: its text plus the two size measures every
//! strategy agrees on (whitespace tokens and Unicode scalar values). Chunks are
//! only ever built through [`ChunkingResult::from_texts`], which assigns ids in
//! document order and derives the [`Analysis`] summary, so the metadata can't
//! drift from the text.
//!
//! ```text
//! texts:  ["a b c", "d e"]
//!            │        │
//!            ▼        ▼
//! chunks: [{id:0, tokens:3, characters:5}, {id:1, tokens:2, characters:3}]
//! analysis: {totalChunks: 2, averageChunkSize: {tokens: 3, characters: 4}}
//! ```

use serde::{Deserialize, Serialize};

use crate::metrics::{count_characters, count_tokens};

/// A chunk of text with its size metadata.
///
/// ```rust
/// use chunksmith::Chunk;
///
/// let chunk = Chunk::new(0, "The quick brown fox");
/// assert_eq!(chunk.tokens, 4);
/// assert_eq!(chunk.characters, 19);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position of this chunk in its result.
    pub id: usize,
    /// The chunk text.
    pub text: String,
    /// Whitespace-delimited token count.
    pub tokens: usize,
    /// Length of the text in Unicode scalar values.
    pub characters: usize,
}

impl Chunk {
    /// Create a chunk, computing its size metadata from the text.
    #[must_use]
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            tokens: count_tokens(&text),
            characters: count_characters(&text),
            text,
        }
    }

    /// Whether this chunk holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ id: {}, tokens: {}, characters: {} }}",
            self.id, self.tokens, self.characters
        )
    }
}

/// Rounded mean chunk size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AverageSize {
    /// Mean tokens per chunk.
    pub tokens: usize,
    /// Mean characters per chunk.
    pub characters: usize,
}

/// Summary attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Always equal to the number of chunks.
    pub total_chunks: usize,
    /// Rounded mean size, zero when there are no chunks.
    pub average_chunk_size: AverageSize,
    /// Human-readable description of what the strategy did.
    pub notes: String,
}

/// Ordered chunks plus their analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingResult {
    /// Chunks in document order; `chunks[i].id == i`.
    pub chunks: Vec<Chunk>,
    /// Summary of the chunk list.
    pub analysis: Analysis,
}

impl ChunkingResult {
    /// Build a result from chunk texts, numbering them sequentially.
    pub fn from_texts<I, S>(texts: I, notes: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let chunks: Vec<Chunk> = texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Chunk::new(id, text))
            .collect();

        let analysis = Analysis {
            total_chunks: chunks.len(),
            average_chunk_size: average_size(&chunks),
            notes: notes.into(),
        };

        Self { chunks, analysis }
    }

    /// An empty result, used for empty input.
    pub fn empty(notes: impl Into<String>) -> Self {
        Self::from_texts(Vec::<String>::new(), notes)
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunks were produced.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk texts in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|c| c.text.as_str())
    }

    /// Consume the result, returning the chunk texts.
    pub fn into_texts(self) -> Vec<String> {
        self.chunks.into_iter().map(|c| c.text).collect()
    }

    /// Keep the first `max` chunks, refreshing the analysis.
    #[must_use]
    pub fn truncated(self, max: usize) -> Self {
        if self.chunks.len() <= max {
            return self;
        }
        let notes = self.analysis.notes;
        Self::from_texts(self.chunks.into_iter().take(max).map(|c| c.text), notes)
    }

    /// Prefix the notes, e.g. to record that a fallback produced this result.
    #[must_use]
    pub fn with_note_prefix(mut self, prefix: &str) -> Self {
        self.analysis.notes = format!("{prefix} {}", self.analysis.notes);
        self
    }

    /// Append a sentence to the notes.
    #[must_use]
    pub fn with_note_suffix(mut self, suffix: &str) -> Self {
        self.analysis.notes = format!("{} {suffix}", self.analysis.notes);
        self
    }
}

fn average_size(chunks: &[Chunk]) -> AverageSize {
    if chunks.is_empty() {
        return AverageSize::default();
    }
    let n = chunks.len() as f64;
    let tokens: usize = chunks.iter().map(|c| c.tokens).sum();
    let characters: usize = chunks.iter().map(|c| c.characters).sum();
    AverageSize {
        tokens: (tokens as f64 / n).round() as usize,
        characters: (characters as f64 / n).round() as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let result = ChunkingResult::from_texts(["one", "two", "three"], "n");
        for (i, chunk) in result.chunks.iter().enumerate() {
            assert_eq!(chunk.id, i);
        }
        assert_eq!(result.analysis.total_chunks, 3);
    }

    #[test]
    fn test_average_rounds() {
        // tokens: 3 and 2 -> 2.5 rounds to 3
        let result = ChunkingResult::from_texts(["a b c", "d e"], "");
        assert_eq!(result.analysis.average_chunk_size.tokens, 3);
        assert_eq!(result.analysis.average_chunk_size.characters, 4);
    }

    #[test]
    fn test_empty_average_is_zero() {
        let result = ChunkingResult::empty("nothing");
        assert_eq!(result.analysis.total_chunks, 0);
        assert_eq!(result.analysis.average_chunk_size, AverageSize::default());
    }

    #[test]
    fn test_truncated_renumbers() {
        let result = ChunkingResult::from_texts(["a", "b", "c"], "n").truncated(2);
        assert_eq!(result.len(), 2);
        assert_eq!(result.analysis.total_chunks, 2);
        assert_eq!(result.chunks[1].id, 1);
    }

    #[test]
    fn test_characters_count_scalars_not_bytes() {
        let chunk = Chunk::new(0, "日本語");
        assert_eq!(chunk.characters, 3);
        assert_eq!(chunk.tokens, 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = ChunkingResult::from_texts(["x"], "n");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["analysis"]["totalChunks"], 1);
        assert_eq!(json["analysis"]["averageChunkSize"]["tokens"], 1);
    }
}
