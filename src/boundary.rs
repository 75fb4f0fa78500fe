//! Sentence, paragraph, and break-point detection.
//!
//! ## Sentences
//!
//! A sentence ends at `.`, `?`, `!` (or their full-width forms) followed by
//! whitespace. The hard part is the periods that don't end anything:
//!
//! ```text
//! "Dr. Smith paid 3.50 for it. Then he left."
//!     ^            ^          ^
//!     title        decimal    real boundary
//! ```
//!
//! The `regex` crate has no look-behind, so the known non-boundaries are
//! masked with a private-use placeholder before splitting and restored after:
//!
//! ```text
//! protect:  "Dr\u{E000} Smith paid 3\u{E000}50 for it. Then he left."
//! split:    ["Dr\u{E000} Smith paid 3\u{E000}50 for it.", "Then he left."]
//! restore:  ["Dr. Smith paid 3.50 for it.", "Then he left."]
//! ```
//!
//! ## Paragraphs
//!
//! One alternation covers blank lines (`\n\n` or `\r\n\r\n`), horizontal
//! rules (`---`, `***`, `___`), and Markdown headers. Blank lines and rules
//! are consumed; a header starts a new paragraph and stays in it.
//!
//! ## Break points
//!
//! Character chunkers cut at a target position, then look back up to 20% of
//! the chunk size for a nicer place: sentence end > paragraph break > line
//! break > word break.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Stand-in for periods that must not end a sentence.
const PLACEHOLDER: char = '\u{E000}';

static ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(Mr|Mrs|Ms|Dr|Prof|Rev|Col|Gen|Lt|Cmdr|Sgt|Capt|Maj|Sen|Rep|Hon|etc|vs|i\.e|e\.g)\.",
    )
    .expect("abbreviation regex")
});

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)\.(\d)").expect("decimal regex"));

/// Terminal punctuation, optional closing quotes/brackets, then whitespace.
pub(crate) static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?。！？]+["'”’)\]]*\s+"#).expect("sentence end regex")
});

static TERMINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?。！？]").expect("terminal regex"));

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?P<blank>\n[ \t\r]*\n)|(?P<rule>^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*\r?$)|(?P<header>^#{1,6}[ \t])",
    )
    .expect("paragraph break regex")
});

/// Split a paragraph into sentences.
///
/// A paragraph without terminal punctuation is one sentence.
///
/// ```rust
/// use chunksmith::split_sentences;
///
/// let sentences = split_sentences("Dr. Smith arrived. He paid 3.50 dollars! Done?");
/// assert_eq!(
///     sentences,
///     vec!["Dr. Smith arrived.", "He paid 3.50 dollars!", "Done?"]
/// );
/// ```
pub fn split_sentences(paragraph: &str) -> Vec<String> {
    let paragraph = paragraph.trim();
    if paragraph.is_empty() {
        return vec![];
    }
    if !TERMINAL.is_match(paragraph) {
        return vec![paragraph.to_string()];
    }

    // Text that already contains the placeholder is split unmasked.
    let masking = !paragraph.contains(PLACEHOLDER);
    let protected: Cow<'_, str> = if masking {
        let masked = format!("${{1}}{PLACEHOLDER}");
        let abbreviations = ABBREVIATION.replace_all(paragraph, masked.as_str());
        let decimals = format!("${{1}}{PLACEHOLDER}${{2}}");
        Cow::Owned(DECIMAL.replace_all(&abbreviations, decimals.as_str()).into_owned())
    } else {
        Cow::Borrowed(paragraph)
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in SENTENCE_END.find_iter(&protected) {
        let end = m.start() + m.as_str().trim_end().len();
        pieces.push(&protected[last..end]);
        last = m.end();
    }
    pieces.push(&protected[last..]);

    let sentences: Vec<String> = pieces
        .into_iter()
        .map(|s| {
            let s = if masking {
                s.replace(PLACEHOLDER, ".")
            } else {
                s.to_string()
            };
            s.trim().to_string()
        })
        .filter(|s| !s.is_empty())
        .collect();

    if sentences.is_empty() {
        vec![paragraph.to_string()]
    } else {
        sentences
    }
}

/// Split text into trimmed, non-empty paragraphs.
///
/// ```rust
/// use chunksmith::split_paragraphs;
///
/// let text = "# Title\nIntro line.\n\nBody text.\n---\nAfter the rule.";
/// assert_eq!(
///     split_paragraphs(text),
///     vec!["# Title\nIntro line.", "Body text.", "After the rule."]
/// );
/// ```
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in PARAGRAPH_BREAK.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        segments.push(&text[last..m.start()]);
        // Headers open a paragraph instead of separating two.
        last = if caps.name("header").is_some() {
            m.start()
        } else {
            m.end()
        };
    }
    segments.push(&text[last..]);

    let paragraphs: Vec<&str> = segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if paragraphs.is_empty() && !text.trim().is_empty() {
        return vec![text.trim()];
    }
    paragraphs
}

/// All sentences of a text, paragraph by paragraph, in document order.
pub fn split_text_sentences(text: &str) -> Vec<String> {
    split_paragraphs(text)
        .into_iter()
        .flat_map(split_sentences)
        .collect()
}

/// Find a natural cut position at or before `target`.
///
/// Looks back at most `chunk_size / 5` characters. Returns the index just
/// past the latest sentence end, else paragraph break, else line break, else
/// whitespace; `target` itself when none is found.
///
/// ```rust
/// use chunksmith::find_break_point;
///
/// let chars: Vec<char> = "One two. Three four five".chars().collect();
/// // Cutting at 14 ("One two. Three| four") backs up to after "One two. ".
/// assert_eq!(find_break_point(&chars, 14, 50), 9);
/// ```
pub fn find_break_point(chars: &[char], target: usize, chunk_size: usize) -> usize {
    let target = target.min(chars.len());
    let floor = target.saturating_sub(chunk_size / 5);

    let sentence_end =
        |w: &[char]| matches!(w[0], '.' | '!' | '?' | '。' | '！' | '？') && w[1].is_whitespace();
    let paragraph = |w: &[char]| w[0] == '\n' && w[1] == '\n';
    let line = |w: &[char]| w[0] == '\n';
    let word = |w: &[char]| w[0].is_whitespace();

    rfind_after(chars, floor, target, 2, sentence_end)
        .or_else(|| rfind_after(chars, floor, target, 2, paragraph))
        .or_else(|| rfind_after(chars, floor, target, 1, line))
        .or_else(|| rfind_after(chars, floor, target, 1, word))
        .unwrap_or(target)
}

/// Position just past the latest `width`-wide window in `floor..target` matching `pred`.
fn rfind_after(
    chars: &[char],
    floor: usize,
    target: usize,
    width: usize,
    pred: impl Fn(&[char]) -> bool,
) -> Option<usize> {
    if target < width || floor > target - width {
        return None;
    }
    (floor..=target - width)
        .rev()
        .find(|&i| pred(&chars[i..i + width]))
        .map(|i| i + width)
        .filter(|&pos| pos > floor)
}
