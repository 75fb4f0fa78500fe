//! Strategy names and dispatch.
//!
//! A method name is parsed once into [`Method`], then built into a
//! [`Strategy`] that owns a configured chunker. Dispatch is a single
//! exhaustive match, so an unknown name can only fail at the parsing step.

use std::fmt;
use std::str::FromStr;

use crate::{
    AgenticChunker, BoundaryChunker, Chunker, ChunkingOptions, ChunkingResult, Error, FixedChunker,
    HybridChunker, ParagraphChunker, ProviderSettings, RecursiveChunker, Result, SemanticChunker,
    SentenceChunker, SlidingWindowChunker,
};

/// The nine dispatchable strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Fixed-length token or character windows.
    Fixed,
    /// Character windows snapped to natural breaks.
    Character,
    /// Groups of sentences.
    Sentence,
    /// Groups of paragraphs.
    Paragraph,
    /// Overlapping windows with an output ceiling.
    SlidingWindow,
    /// Separator cascade with merging.
    Recursive,
    /// Embedding-based paragraph clustering.
    Semantic,
    /// Paragraph, sentence and window composition.
    Hybrid,
    /// Rule-based choice among the others.
    Agentic,
}

impl Method {
    /// Every method, in documentation order.
    pub const ALL: [Self; 9] = [
        Self::Fixed,
        Self::Character,
        Self::Sentence,
        Self::Paragraph,
        Self::SlidingWindow,
        Self::Recursive,
        Self::Semantic,
        Self::Hybrid,
        Self::Agentic,
    ];

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Character => "character",
            Self::Sentence => "sentence",
            Self::Paragraph => "paragraph",
            Self::SlidingWindow => "sliding-window",
            Self::Recursive => "recursive",
            Self::Semantic => "semantic",
            Self::Hybrid => "hybrid",
            Self::Agentic => "agentic",
        }
    }

    /// Whether the method needs an async runtime.
    pub fn is_async(self) -> bool {
        matches!(self, Self::Semantic)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Case-insensitive; `_` and `-` are interchangeable.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| Error::UnsupportedMethod(s.to_string()))
    }
}

/// A configured chunker for one method.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// See [`FixedChunker`].
    Fixed(FixedChunker),
    /// See [`BoundaryChunker`].
    Character(BoundaryChunker),
    /// See [`SentenceChunker`].
    Sentence(SentenceChunker),
    /// See [`ParagraphChunker`].
    Paragraph(ParagraphChunker),
    /// See [`SlidingWindowChunker`].
    SlidingWindow(SlidingWindowChunker),
    /// See [`RecursiveChunker`].
    Recursive(RecursiveChunker),
    /// See [`SemanticChunker`].
    Semantic(SemanticChunker),
    /// See [`HybridChunker`].
    Hybrid(HybridChunker),
    /// See [`AgenticChunker`].
    Agentic(AgenticChunker),
}

impl Strategy {
    /// Configure `method` from caller options.
    pub fn new(method: Method, options: &ChunkingOptions) -> Self {
        Self::with_settings(method, options, &ProviderSettings::default())
    }

    /// Configure `method`, building any provider backend from `settings`.
    pub fn with_settings(
        method: Method,
        options: &ChunkingOptions,
        settings: &ProviderSettings,
    ) -> Self {
        match method {
            Method::Fixed => Self::Fixed(FixedChunker::from_options(options)),
            Method::Character => Self::Character(BoundaryChunker::from_options(options)),
            Method::Sentence => Self::Sentence(SentenceChunker::from_options(options)),
            Method::Paragraph => Self::Paragraph(ParagraphChunker::from_options(options)),
            Method::SlidingWindow => Self::SlidingWindow(SlidingWindowChunker::from_options(options)),
            Method::Recursive => Self::Recursive(RecursiveChunker::from_options(options)),
            Method::Semantic => Self::Semantic(SemanticChunker::with_settings(options, settings)),
            Method::Hybrid => Self::Hybrid(HybridChunker::from_options(options)),
            Method::Agentic => Self::Agentic(AgenticChunker::from_options(options)),
        }
    }

    /// The method this strategy runs.
    pub fn method(&self) -> Method {
        match self {
            Self::Fixed(_) => Method::Fixed,
            Self::Character(_) => Method::Character,
            Self::Sentence(_) => Method::Sentence,
            Self::Paragraph(_) => Method::Paragraph,
            Self::SlidingWindow(_) => Method::SlidingWindow,
            Self::Recursive(_) => Method::Recursive,
            Self::Semantic(_) => Method::Semantic,
            Self::Hybrid(_) => Method::Hybrid,
            Self::Agentic(_) => Method::Agentic,
        }
    }

    /// The synchronous chunker, or `None` for semantic chunking.
    pub fn as_chunker(&self) -> Option<&dyn Chunker> {
        let chunker: &dyn Chunker = match self {
            Self::Fixed(c) => c,
            Self::Character(c) => c,
            Self::Sentence(c) => c,
            Self::Paragraph(c) => c,
            Self::SlidingWindow(c) => c,
            Self::Recursive(c) => c,
            Self::Hybrid(c) => c,
            Self::Agentic(c) => c,
            Self::Semantic(_) => return None,
        };
        Some(chunker)
    }

    /// Run the strategy.
    pub async fn run(&self, text: &str) -> ChunkingResult {
        match self {
            Self::Semantic(c) => c.chunk(text).await,
            Self::Fixed(c) => c.chunk(text),
            Self::Character(c) => c.chunk(text),
            Self::Sentence(c) => c.chunk(text),
            Self::Paragraph(c) => c.chunk(text),
            Self::SlidingWindow(c) => c.chunk(text),
            Self::Recursive(c) => c.chunk(text),
            Self::Hybrid(c) => c.chunk(text),
            Self::Agentic(c) => c.chunk(text),
        }
    }

    /// Run a synchronous strategy.
    ///
    /// # Errors
    ///
    /// [`Error::RequiresAsync`] for semantic chunking.
    pub fn run_sync(&self, text: &str) -> Result<ChunkingResult> {
        self.as_chunker()
            .map(|chunker| chunker.chunk(text))
            .ok_or(Error::RequiresAsync(Method::Semantic.as_str()))
    }
}

/// Chunk `text` with the named method.
///
/// # Errors
///
/// [`Error::UnsupportedMethod`] if `method` is not one of the nine names.
/// Chunking itself never fails; fallbacks are reported in the notes.
///
/// ```rust
/// use chunksmith::{chunk, ChunkingOptions};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let result = chunk("a b c", "fixed", &ChunkingOptions::default()).await.unwrap();
/// assert_eq!(result.len(), 1);
/// # }
/// ```
pub async fn chunk(text: &str, method: &str, options: &ChunkingOptions) -> Result<ChunkingResult> {
    let method: Method = method.parse()?;
    Ok(Strategy::new(method, options).run(text).await)
}

/// Like [`chunk`], with provider settings for the semantic backend.
///
/// # Errors
///
/// [`Error::UnsupportedMethod`] if `method` is not one of the nine names.
pub async fn chunk_with_settings(
    text: &str,
    method: &str,
    options: &ChunkingOptions,
    settings: &ProviderSettings,
) -> Result<ChunkingResult> {
    let method: Method = method.parse()?;
    Ok(Strategy::with_settings(method, options, settings).run(text).await)
}

/// Chunk `text` without an async runtime.
///
/// # Errors
///
/// [`Error::UnsupportedMethod`] for unknown names and
/// [`Error::RequiresAsync`] for `semantic`.
///
/// ```rust
/// use chunksmith::{chunk_sync, ChunkingOptions};
///
/// let options = ChunkingOptions::default().with_chunk_size(2);
/// let result = chunk_sync("One. Two. Three.", "sentence", &options).unwrap();
/// assert_eq!(result.len(), 2);
///
/// assert!(chunk_sync("text", "semantic", &options).is_err());
/// assert!(chunk_sync("text", "bogus", &options).is_err());
/// ```
pub fn chunk_sync(text: &str, method: &str, options: &ChunkingOptions) -> Result<ChunkingResult> {
    let method: Method = method.parse()?;
    Strategy::new(method, options).run_sync(text)
}
