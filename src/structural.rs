//! Embedding-free structural splitting.
//!
//! Cuts a document at the lines where Markdown-ish structure starts a new
//! section:
//!
//! ```text
//! 0  # Install              <- header
//! 1  Run the installer.
//! 2  Then reboot.
//! 3                         <- blank line between two non-blank lines
//! 4  1. Open settings       <- first line of a numbered list
//! 5  2. Pick a theme
//! 6  ---                    <- horizontal rule
//! 7  Closing words here.
//! ```
//!
//! A span shorter than two lines is not a section of its own. Its text is
//! carried into the next span so nothing is lost. Sections under 20 tokens
//! are then folded into the section before them, or into the next one when
//! they open the document.
//!
//! This is what semantic chunking runs when no embedding provider is
//! available, and what the agentic selector picks for plain documents.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::boundary::split_paragraphs;
use crate::metrics::count_tokens;
use crate::options::ChunkingOptions;
use crate::{Chunker, ChunkingResult, ParagraphChunker};

const MIN_SECTION_LINES: usize = 2;
const MIN_SECTION_TOKENS: usize = 20;

static HEADER_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").expect("header regex"));

static RULE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").expect("rule regex"));

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s").expect("numbered list regex"));

/// Structural heuristic chunker.
///
/// ```rust
/// use chunksmith::{Chunker, HeuristicChunker};
///
/// let section = "This line has enough words to stand on its own as a section.\n\
///                A second line keeps the span at two lines or more.";
/// let text = format!("# One\n{section}\n# Two\n{section}");
/// let result = HeuristicChunker::default().chunk(&text);
///
/// assert_eq!(result.len(), 2);
/// assert!(result.chunks[1].text.starts_with("# Two"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct HeuristicChunker {
    options: ChunkingOptions,
}

impl HeuristicChunker {
    /// Build from caller options. Only `max_chunks` shapes the sections; the
    /// rest is passed on when paragraph chunking takes over.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        Self {
            options: options.clone(),
        }
    }

    fn paragraph_fallback(&self, text: &str) -> ChunkingResult {
        ParagraphChunker::from_options(&self.options).chunk(text)
    }
}

/// Line indices where a new section starts, always including `0` and `lines.len()`.
fn boundaries(lines: &[&str]) -> Vec<usize> {
    let n = lines.len();
    let blank = |i: usize| lines[i].trim().is_empty();
    let numbered = |i: usize| NUMBERED_LINE.is_match(lines[i]);

    let mut cuts = vec![0];
    for i in 0..n {
        let line = lines[i];
        let structural = HEADER_LINE.is_match(line)
            || RULE_LINE.is_match(line)
            || (numbered(i) && (i == 0 || !numbered(i - 1)))
            || (blank(i) && i > 0 && i + 1 < n && !blank(i - 1) && !blank(i + 1));
        if structural {
            cuts.push(i);
        }
    }
    cuts.push(n);
    cuts.dedup();
    cuts
}

/// Sections between cuts. Spans under two lines are carried into the next span.
fn sections(lines: &[&str], cuts: &[usize]) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut carry: Option<String> = None;

    for window in cuts.windows(2) {
        let (start, end) = (window[0], window[1]);
        let text = lines[start..end].join("\n").trim().to_string();
        if text.is_empty() {
            continue;
        }

        let text = match carry.take() {
            Some(prefix) => format!("{prefix}\n{text}"),
            None => text,
        };
        if end - start < MIN_SECTION_LINES {
            carry = Some(text);
        } else {
            sections.push(text);
        }
    }

    if let Some(rest) = carry {
        match sections.last_mut() {
            Some(last) => {
                last.push('\n');
                last.push_str(&rest);
            }
            None => sections.push(rest),
        }
    }
    sections
}

/// Fold sections under the token floor into the one before them. A short
/// first section has nothing before it and joins the one after it.
fn merge_small(sections: Vec<String>) -> Vec<String> {
    let mut merged = sections.into_iter().fold(Vec::new(), |mut merged: Vec<String>, section| {
        match merged.last_mut() {
            Some(last) if count_tokens(&section) < MIN_SECTION_TOKENS => {
                last.push('\n');
                last.push_str(&section);
            }
            _ => merged.push(section),
        }
        merged
    });

    if merged.len() > 1 && count_tokens(&merged[0]) < MIN_SECTION_TOKENS {
        let first = merged.remove(0);
        merged[0] = format!("{first}\n{}", merged[0]);
    }
    merged
}

impl Chunker for HeuristicChunker {
    fn chunk(&self, text: &str) -> ChunkingResult {
        if split_paragraphs(text).len() <= 1 {
            return self.paragraph_fallback(text);
        }

        let lines: Vec<&str> = text.lines().collect();
        let cuts = boundaries(&lines);
        let raw = sections(&lines, &cuts);
        if raw.is_empty() {
            return self
                .paragraph_fallback(text)
                .with_note_prefix("Structural heuristic found no sections; used paragraph chunking.");
        }

        let mut merged = merge_small(raw);
        if let Some(max) = self.options.max_chunks() {
            merged.truncate(max);
        }

        let notes = format!(
            "Structural heuristic chunking (embedding-free): {} candidate boundaries from headers, \
             rules, numbered lists and blank lines; sections under {MIN_SECTION_TOKENS} tokens \
             merged into a neighbouring section.",
            cuts.len()
        );
        ChunkingResult::from_texts(merged, notes)
    }
}
