//! Rule-based strategy selection.
//!
//! Measures the document, then walks a fixed list of rules. The first rule
//! that matches picks the strategy and adjusts its options:
//!
//! | Rule | Condition | Strategy |
//! |------|-----------|----------|
//! | 1 | contains code | paragraph, `chunk_size = clamp(paragraphs, 3, 5)` |
//! | 2 | ≤ 1 paragraph and > 10 sentences | sentence, `chunk_size = clamp(ceil(sentences / 3), 3, 8)` |
//! | 3 | paragraph length variance > 10000 and longest > 1000 chars | hybrid, `overlap = min(50, ceil(chunk_size / 5) or 20)` |
//! | 4 | mean paragraph < 50 tokens and > 5 paragraphs | paragraph, `chunk_size = clamp(ceil(paragraphs / 3), 3, 10)` |
//! | 5 | mean sentence > 20 tokens | sliding window, `overlap = min(50, ceil(chunk_size / 4) or 25)` |
//! | 6 | > 1000 tokens | hybrid |
//! | 7 | lists or headers | paragraph |
//! | 8 | anything else | structural heuristic |
//!
//! The order matters: a long code-heavy document is chunked by paragraph
//! (rule 1), never by the hybrid composer (rule 6).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::info;

use crate::boundary::{split_paragraphs, SENTENCE_END};
use crate::metrics::{count_characters, count_tokens};
use crate::options::ChunkingOptions;
use crate::{
    Chunker, ChunkingResult, HeuristicChunker, HybridChunker, ParagraphChunker, SentenceChunker,
    SlidingWindowChunker,
};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```|~~~").expect("fence regex"));

static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`\n]+`").expect("inline code regex"));

static CODE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:function|def|class|import|export|const|let|var|fn|pub fn|public|private|#include)\s+[\w{<(]",
    )
    .expect("code keyword regex")
});

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*+•]|\d+[.)])\s+\S").expect("list regex"));

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s").expect("header regex"));

/// Measurements the selector decides on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    /// Paragraphs found by the paragraph detector.
    pub paragraph_count: usize,
    /// Sentence-end matches plus one.
    pub sentence_count: usize,
    /// Whitespace tokens in the whole text.
    pub token_count: usize,
    /// Tokens per sentence.
    pub avg_sentence_length: f64,
    /// Tokens per paragraph.
    pub avg_paragraph_size: f64,
    /// Population variance of paragraph lengths, in characters.
    pub paragraph_length_variance: f64,
    /// Longest paragraph, in characters.
    pub max_paragraph_length: usize,
    /// Fenced or inline code, or a line starting with a code keyword.
    pub has_code: bool,
    /// Bulleted or numbered list items.
    pub has_lists: bool,
    /// Markdown headers.
    pub has_headers: bool,
}

impl DocumentStats {
    /// Measure `text`.
    ///
    /// ```rust
    /// use chunksmith::DocumentStats;
    ///
    /// let stats = DocumentStats::analyze("One. Two.\n\nThree.");
    /// assert_eq!(stats.paragraph_count, 2);
    /// assert_eq!(stats.sentence_count, 3);
    /// assert_eq!(stats.token_count, 3);
    /// ```
    pub fn analyze(text: &str) -> Self {
        let paragraphs = split_paragraphs(text);
        let lengths: Vec<usize> = paragraphs.iter().map(|p| count_characters(p)).collect();
        let paragraph_count = paragraphs.len();
        let sentence_count = SENTENCE_END.find_iter(text).count() + 1;
        let token_count = count_tokens(text);

        let variance = if lengths.is_empty() {
            0.0
        } else {
            let n = lengths.len() as f64;
            let mean = lengths.iter().sum::<usize>() as f64 / n;
            lengths
                .iter()
                .map(|&l| (l as f64 - mean).powi(2))
                .sum::<f64>()
                / n
        };

        Self {
            paragraph_count,
            sentence_count,
            token_count,
            avg_sentence_length: token_count as f64 / sentence_count as f64,
            avg_paragraph_size: if paragraph_count == 0 {
                0.0
            } else {
                token_count as f64 / paragraph_count as f64
            },
            paragraph_length_variance: variance,
            max_paragraph_length: lengths.iter().copied().max().unwrap_or(0),
            has_code: CODE_FENCE.is_match(text)
                || INLINE_CODE.is_match(text)
                || CODE_KEYWORD.is_match(text),
            has_lists: LIST_ITEM.is_match(text),
            has_headers: HEADER.is_match(text),
        }
    }
}

impl std::fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} paragraphs, {} sentences, {} tokens, {:.1} tokens/sentence, \
             {:.1} tokens/paragraph, paragraph length variance {:.0}, longest paragraph {} chars, \
             code: {}, lists: {}, headers: {}",
            self.paragraph_count,
            self.sentence_count,
            self.token_count,
            self.avg_sentence_length,
            self.avg_paragraph_size,
            self.paragraph_length_variance,
            self.max_paragraph_length,
            self.has_code,
            self.has_lists,
            self.has_headers
        )
    }
}

/// Strategy a rule can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedStrategy {
    /// Paragraph grouping.
    Paragraph,
    /// Sentence grouping.
    Sentence,
    /// Hybrid composer.
    Hybrid,
    /// Sliding window.
    SlidingWindow,
    /// Structural heuristic.
    Heuristic,
}

impl SelectedStrategy {
    /// Name used in notes and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::Hybrid => "hybrid",
            Self::SlidingWindow => "sliding-window",
            Self::Heuristic => "structural heuristic",
        }
    }
}

/// The rule that fired and the options it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Rule number, 1 to 8.
    pub rule: u8,
    /// Why the rule fired.
    pub reason: &'static str,
    /// Chosen strategy.
    pub strategy: SelectedStrategy,
    /// Caller options with the rule's adjustments applied.
    pub options: ChunkingOptions,
}

/// Picks a strategy from document statistics, then runs it.
///
/// ```rust
/// use chunksmith::{AgenticChunker, Chunker, SelectedStrategy};
///
/// let text = "Use `cargo build` first.\n\nThen run the binary.";
/// let selection = AgenticChunker::default().select(text);
/// assert_eq!(selection.rule, 1);
/// assert_eq!(selection.strategy, SelectedStrategy::Paragraph);
///
/// let result = AgenticChunker::default().chunk(text);
/// assert!(result.analysis.notes.contains("rule 1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AgenticChunker {
    options: ChunkingOptions,
}

impl AgenticChunker {
    /// Build from caller options; each rule starts from these.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }

    /// Apply the rules to precomputed statistics.
    pub fn select_with(&self, stats: &DocumentStats) -> Selection {
        let base = &self.options;
        let with_size = |size: usize| base.clone().with_chunk_size(size);
        let chunk_size = base.chunk_size.filter(|&s| s > 0);

        let (rule, reason, strategy, options) = if stats.has_code {
            (
                1,
                "document contains code",
                SelectedStrategy::Paragraph,
                with_size(stats.paragraph_count.clamp(3, 5)),
            )
        } else if stats.paragraph_count <= 1 && stats.sentence_count > 10 {
            (
                2,
                "single paragraph with many sentences",
                SelectedStrategy::Sentence,
                with_size(stats.sentence_count.div_ceil(3).clamp(3, 8)),
            )
        } else if stats.paragraph_length_variance > 10_000.0 && stats.max_paragraph_length > 1000 {
            let overlap = chunk_size.map_or(20, |s| s.div_ceil(5)).min(50);
            (
                3,
                "paragraph lengths vary widely",
                SelectedStrategy::Hybrid,
                base.clone().with_overlap(overlap),
            )
        } else if stats.avg_paragraph_size < 50.0 && stats.paragraph_count > 5 {
            (
                4,
                "many short paragraphs",
                SelectedStrategy::Paragraph,
                with_size(stats.paragraph_count.div_ceil(3).clamp(3, 10)),
            )
        } else if stats.avg_sentence_length > 20.0 {
            let overlap = chunk_size.map_or(25, |s| s.div_ceil(4)).min(50);
            (
                5,
                "long sentences",
                SelectedStrategy::SlidingWindow,
                base.clone().with_overlap(overlap),
            )
        } else if stats.token_count > 1000 {
            (6, "long document", SelectedStrategy::Hybrid, base.clone())
        } else if stats.has_lists || stats.has_headers {
            (
                7,
                "lists or headers present",
                SelectedStrategy::Paragraph,
                base.clone(),
            )
        } else {
            (
                8,
                "no dominant structure",
                SelectedStrategy::Heuristic,
                base.clone(),
            )
        };

        Selection {
            rule,
            reason,
            strategy,
            options,
        }
    }

    /// Measure `text` and apply the rules.
    pub fn select(&self, text: &str) -> Selection {
        self.select_with(&DocumentStats::analyze(text))
    }
}

impl Chunker for AgenticChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        let stats = DocumentStats::analyze(text);
        let selection = self.select_with(&stats);
        info!(
            rule = selection.rule,
            strategy = selection.strategy.name(),
            reason = selection.reason,
            "agentic strategy selected"
        );

        let options = &selection.options;
        let result = match selection.strategy {
            SelectedStrategy::Paragraph => ParagraphChunker::from_options(options).chunk(text),
            SelectedStrategy::Sentence => SentenceChunker::from_options(options).chunk(text),
            SelectedStrategy::Hybrid => HybridChunker::from_options(options).chunk(text),
            SelectedStrategy::SlidingWindow => SlidingWindowChunker::from_options(options).chunk(text),
            SelectedStrategy::Heuristic => HeuristicChunker::from_options(options).chunk(text),
        };

        result.with_note_suffix(&format!(
            "Agentic selection: rule {} ({}) chose {}. Stats: {stats}.",
            selection.rule,
            selection.reason,
            selection.strategy.name()
        ))
    }
}
