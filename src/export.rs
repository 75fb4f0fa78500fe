//! JSON export of a chunking run.
//!
//! ```json
//! {
//!   "metadata": {
//!     "timestamp": "2024-05-01T12:00:00+00:00",
//!     "method": "sentence",
//!     "options": { "chunkSize": 3 },
//!     "analysis": { "totalChunks": 2, "averageChunkSize": { ... }, "notes": "..." },
//!     "originalTextLength": 120,
//!     "totalTokens": 22,
//!     "totalCharacters": 118
//!   },
//!   "chunks": [
//!     { "chunkNumber": 1, "metadata": { "tokens": 12, "characters": 64 }, "content": "..." }
//!   ]
//! }
//! ```
//!
//! The embedding key is never written: [`ChunkingOptions`] skips it when
//! serializing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::count_characters;
use crate::{Analysis, ChunkingOptions, ChunkingResult, Result};

/// Exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Run-level metadata.
    pub metadata: ExportMetadata,
    /// Chunks in order.
    pub chunks: Vec<ExportChunk>,
}

/// Run-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// When the export was produced.
    pub timestamp: DateTime<Utc>,
    /// Strategy name as requested.
    pub method: String,
    /// Options the run used.
    pub options: ChunkingOptions,
    /// The result's analysis.
    pub analysis: Analysis,
    /// Length of the input, in characters.
    pub original_text_length: usize,
    /// Sum of chunk token counts.
    pub total_tokens: usize,
    /// Sum of chunk character counts.
    pub total_characters: usize,
}

/// One exported chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportChunk {
    /// 1-based position.
    pub chunk_number: usize,
    /// Size metadata.
    pub metadata: ChunkSize,
    /// Chunk text.
    pub content: String,
}

/// Token and character counts of an exported chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSize {
    /// Whitespace tokens.
    pub tokens: usize,
    /// Characters.
    pub characters: usize,
}

impl ExportDocument {
    /// Build the document, stamped with the current time.
    pub fn new(text: &str, method: &str, options: &ChunkingOptions, result: &ChunkingResult) -> Self {
        let chunks: Vec<ExportChunk> = result
            .chunks
            .iter()
            .map(|c| ExportChunk {
                chunk_number: c.id + 1,
                metadata: ChunkSize {
                    tokens: c.tokens,
                    characters: c.characters,
                },
                content: c.text.clone(),
            })
            .collect();

        Self {
            metadata: ExportMetadata {
                timestamp: Utc::now(),
                method: method.to_string(),
                options: options.clone(),
                analysis: result.analysis.clone(),
                original_text_length: count_characters(text),
                total_tokens: result.chunks.iter().map(|c| c.tokens).sum(),
                total_characters: result.chunks.iter().map(|c| c.characters).sum(),
            },
            chunks,
        }
    }
}

/// Render a chunking run as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`Error::Serialization`](crate::Error::Serialization) if encoding fails.
pub fn export_json(
    text: &str,
    method: &str,
    options: &ChunkingOptions,
    result: &ChunkingResult,
) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportDocument::new(
        text, method, options, result,
    ))?)
}
