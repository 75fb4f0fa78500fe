//! Property-based tests for text chunking.
//!
//! These tests verify that chunking strategies maintain key invariants:
//! - Ids: `chunks[i].id == i` and the analysis matches the list
//! - Progress: every windowed step is at least one unit
//! - Overlap clamp: boundary snapping never overlaps a whole window
//! - Ceiling: `max_chunks` bounds the output
//! - Coverage: no content is silently lost

use chunksmith::{
    count_tokens, tokenize, BoundaryChunker, Chunker, ChunkingMode, ChunkingOptions,
    ChunkingResult, FixedChunker, HeuristicChunker, HybridChunker, Method, ParagraphChunker,
    RecursiveChunker, SentenceChunker, SlidingWindowChunker, Strategy as Dispatch,
};
use proptest::prelude::*;

// =============================================================================
// Test Generators
// =============================================================================

/// Arbitrary text, including multibyte characters and odd whitespace.
fn arbitrary_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("(?s).{0,400}").unwrap()
}

/// Words, sentences and paragraphs.
fn prose() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[A-Za-z]{1,12}").unwrap(), 1..120).prop_map(
        |words| {
            let mut text = String::new();
            for (i, word) in words.iter().enumerate() {
                text.push_str(word);
                if i % 23 == 22 {
                    text.push_str(".\n\n");
                } else if i % 7 == 6 {
                    text.push_str(". ");
                } else {
                    text.push(' ');
                }
            }
            text
        },
    )
}

fn sync_methods() -> impl Strategy<Value = Method> {
    prop::sample::select(
        Method::ALL
            .into_iter()
            .filter(|m| !m.is_async())
            .collect::<Vec<_>>(),
    )
}

// =============================================================================
// Invariant Helpers
// =============================================================================

fn ids_are_contiguous(result: &ChunkingResult) -> bool {
    result.chunks.iter().enumerate().all(|(i, c)| c.id == i)
        && result.analysis.total_chunks == result.chunks.len()
}

fn metadata_matches_text(result: &ChunkingResult) -> bool {
    result
        .chunks
        .iter()
        .all(|c| c.tokens == count_tokens(&c.text) && c.characters == c.text.chars().count())
}

fn alphanumerics(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

// =============================================================================
// Ids and metadata
// =============================================================================

proptest! {
    #[test]
    fn every_strategy_numbers_its_chunks(
        text in arbitrary_text(),
        method in sync_methods(),
        size in 0usize..400,
        overlap in 0usize..400,
        max in 0usize..8,
    ) {
        let options = ChunkingOptions::default()
            .with_chunk_size(size)
            .with_overlap(overlap)
            .with_max_chunks(max);
        let result = Dispatch::new(method, &options).run_sync(&text).unwrap();

        prop_assert!(ids_are_contiguous(&result), "{method}: ids out of order");
        prop_assert!(metadata_matches_text(&result), "{method}: stale metadata");
    }

    #[test]
    fn blank_input_yields_nothing(
        blank in "[ \t\n\r]{0,40}",
        method in sync_methods(),
    ) {
        let result = Dispatch::new(method, &ChunkingOptions::default())
            .run_sync(&blank)
            .unwrap();
        prop_assert!(result.is_empty(), "{method} produced chunks from blank input");
    }

    #[test]
    fn prose_produces_nonempty_chunks(text in prose(), method in sync_methods()) {
        let result = Dispatch::new(method, &ChunkingOptions::default())
            .run_sync(&text)
            .unwrap();
        prop_assert!(!result.is_empty());
        prop_assert!(result.chunks.iter().all(|c| !c.text.trim().is_empty()));
    }
}

// =============================================================================
// Progress and overlap clamp
// =============================================================================

proptest! {
    #[test]
    fn sliding_step_is_positive(
        size in 1usize..300,
        overlap in 0usize..600,
        len in 0usize..100_000,
        ceiling in 1usize..200,
    ) {
        let chunker = SlidingWindowChunker::new(size, overlap).with_ceiling(ceiling);
        prop_assert!(chunker.effective_step(len) >= 1);
    }

    #[test]
    fn sliding_respects_ceiling(
        words in 0usize..3000,
        size in 1usize..20,
        overlap in 0usize..20,
        ceiling in 1usize..50,
    ) {
        let text = vec!["w"; words].join(" ");
        let result = SlidingWindowChunker::new(size, overlap)
            .with_mode(ChunkingMode::Tokens)
            .with_ceiling(ceiling)
            .chunk(&text);
        prop_assert!(result.len() <= ceiling);
    }

    #[test]
    fn boundary_overlap_is_clamped(size in 0usize..1000, overlap in 0usize..2000) {
        let options = ChunkingOptions::default()
            .with_chunk_size(size)
            .with_overlap(overlap);
        let chunker = BoundaryChunker::from_options(&options);
        prop_assert!(chunker.size() >= 10);
        prop_assert!(chunker.overlap() < chunker.size());
    }

    #[test]
    fn fixed_terminates_with_huge_overlap(text in arbitrary_text(), size in 1usize..50) {
        let chunker = FixedChunker::new(size, size * 3).with_mode(ChunkingMode::Tokens);
        let result = chunker.chunk(&text);
        prop_assert!(result.len() <= tokenize(&text).len().max(1));
    }
}

// =============================================================================
// max_chunks ceiling
// =============================================================================

proptest! {
    #[test]
    fn max_chunks_bounds_output(text in prose(), max in 1usize..6, size in 1usize..60) {
        let options = ChunkingOptions::default()
            .with_chunk_size(size)
            .with_max_chunks(max);
        let chunkers: Vec<(&str, Box<dyn Chunker>)> = vec![
            ("fixed", Box::new(FixedChunker::from_options(&options))),
            ("character", Box::new(BoundaryChunker::from_options(&options))),
            ("sentence", Box::new(SentenceChunker::from_options(&options))),
            ("paragraph", Box::new(ParagraphChunker::from_options(&options))),
            ("sliding", Box::new(SlidingWindowChunker::from_options(&options))),
            ("recursive", Box::new(RecursiveChunker::from_options(&options))),
            ("heuristic", Box::new(HeuristicChunker::from_options(&options))),
        ];

        for (name, chunker) in chunkers {
            let result = chunker.chunk(&text);
            prop_assert!(result.len() <= max, "{name}: {} chunks > {max}", result.len());
        }
    }
}

// =============================================================================
// Coverage
// =============================================================================

proptest! {
    #[test]
    fn paragraph_groups_keep_every_token(text in prose()) {
        let result = ParagraphChunker::new(1).chunk(&text);
        let joined: Vec<String> = result.texts().flat_map(tokenize).map(String::from).collect();
        let original: Vec<String> = tokenize(&text).into_iter().map(String::from).collect();
        prop_assert_eq!(joined, original);
    }

    #[test]
    fn sentence_groups_keep_every_token(text in prose(), per in 1usize..4) {
        let result = SentenceChunker::new(per).chunk(&text);
        let joined: Vec<&str> = result.texts().flat_map(tokenize).collect();
        // The trailing group may be dropped when it is small; everything before it is kept.
        let original = tokenize(&text);
        prop_assert!(original.starts_with(&joined));
    }

    #[test]
    fn sliding_without_overlap_keeps_every_token(text in prose(), size in 3usize..30) {
        let result = SlidingWindowChunker::new(size, 0)
            .with_mode(ChunkingMode::Tokens)
            .chunk(&text);
        let joined: Vec<&str> = result.texts().flat_map(tokenize).collect();
        prop_assert_eq!(joined, tokenize(&text));
    }

    #[test]
    fn recursive_keeps_content_in_order(text in prose(), size in 5usize..200) {
        let result = RecursiveChunker::prose(size).chunk(&text);
        let joined: String = result.texts().map(alphanumerics).collect();
        prop_assert_eq!(joined, alphanumerics(&text));
    }

    #[test]
    fn recursive_chunks_fit_budget(text in prose(), size in 1usize..200) {
        let result = RecursiveChunker::prose(size).chunk(&text);
        prop_assert!(result.chunks.iter().all(|c| c.characters <= size));
    }

    #[test]
    fn hybrid_chunks_fit_budget_when_merged(text in prose(), budget in 10usize..80) {
        let result = HybridChunker::new(budget).chunk(&text);
        let words: Vec<&str> = result.texts().flat_map(tokenize).collect();
        // Sliding windows may repeat tokens, never invent them.
        let original = tokenize(&text);
        prop_assert!(words.iter().all(|w| original.contains(w)));
    }
}
