//! Token and character counting.
//!
//! Every strategy sizes chunks with these two functions and nothing else.
//! A token is a maximal run of non-whitespace; a character is a Unicode
//! scalar value.

/// Split text into non-empty whitespace-delimited tokens.
///
/// ```rust
/// use chunksmith::tokenize;
///
/// assert_eq!(tokenize("  hello \n world "), vec!["hello", "world"]);
/// assert!(tokenize("").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Number of whitespace-delimited tokens.
pub fn count_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of Unicode scalar values.
pub fn count_characters(text: &str) -> usize {
    text.chars().count()
}

/// Last `n` tokens of `text`, space-joined.
pub(crate) fn tail_tokens(text: &str, n: usize) -> String {
    let tokens = tokenize(text);
    let start = tokens.len().saturating_sub(n);
    tokens[start..].join(" ")
}

/// Last `n` characters of `text`.
pub(crate) fn tail_chars(text: &str, n: usize) -> String {
    let len = count_characters(text);
    text.chars().skip(len.saturating_sub(n)).collect()
}
