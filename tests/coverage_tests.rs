#![allow(clippy::needless_range_loop)]
//! Coverage and overlap tests for text chunking.
//!
//! These tests verify that chunks keep the input's content and that each
//! strategy's overlap unit behaves as documented.

use chunksmith::{
    chunk_sync, tokenize, BoundaryChunker, Chunker, ChunkingMode, ChunkingOptions, FixedChunker,
    Method, ParagraphChunker, RecursiveChunker, SentenceChunker, SlidingWindowChunker,
};

const TEXTS: [&str; 6] = [
    "Hello, world!",
    "The quick brown fox jumps over the lazy dog.",
    "Short",
    " Leading and trailing spaces ",
    "Multiple\n\nParagraphs\n\nHere",
    "Dr. Smith paid 3.50 for coffee. Then he left! Did he return? Nobody knows.",
];

// =============================================================================
// Coverage: chunks keep the input's words
// =============================================================================

/// Every input token appears in some chunk token, in order.
fn tokens_in_order(chunks: &[String], text: &str) -> bool {
    let produced: Vec<&str> = chunks.iter().flat_map(|c| tokenize(c)).collect();
    let mut it = produced.iter();
    tokenize(text).iter().all(|t| it.any(|p| p == t))
}

#[test]
fn fixed_chunker_full_coverage() {
    for text in TEXTS {
        let result = FixedChunker::new(3, 0)
            .with_mode(ChunkingMode::Tokens)
            .chunk(text);
        // A 3-token window never leaves a tail under 25%, so nothing is dropped.
        assert!(
            tokens_in_order(&result.into_texts(), text),
            "Fixed chunker lost tokens for: {text:?}"
        );
    }
}

#[test]
fn sentence_chunker_full_coverage() {
    for text in TEXTS {
        let result = SentenceChunker::single().chunk(text);
        assert!(
            tokens_in_order(&result.into_texts(), text),
            "Sentence chunker lost tokens for: {text:?}"
        );
    }
}

#[test]
fn paragraph_chunker_full_coverage() {
    for text in TEXTS {
        let result = ParagraphChunker::new(1).chunk(text);
        assert!(tokens_in_order(&result.into_texts(), text));
    }
}

#[test]
fn recursive_chunker_full_coverage() {
    for text in TEXTS {
        let result = RecursiveChunker::prose(12).chunk(text);
        let joined: String = result.texts().collect::<String>();
        let letters = |s: &str| s.chars().filter(|c| c.is_alphanumeric()).collect::<String>();
        assert_eq!(letters(&joined), letters(text), "for: {text:?}");
    }
}

// =============================================================================
// Overlap
// =============================================================================

#[test]
fn fixed_chunker_overlap_property() {
    let text = "a b c d e f g h i j k l";
    let result = FixedChunker::new(4, 2)
        .with_mode(ChunkingMode::Tokens)
        .chunk(text);
    let chunks: Vec<Vec<&str>> = result.texts().map(tokenize).collect();

    for i in 0..chunks.len() - 1 {
        let (prev, next) = (&chunks[i], &chunks[i + 1]);
        if next.len() >= 2 && prev.len() == 4 {
            assert_eq!(&prev[2..], &next[..2], "chunks {i} and {} do not overlap", i + 1);
        }
    }
}

#[test]
fn fixed_chunker_no_overlap_means_contiguous() {
    let text = "one two three four five six seven eight nine ten";
    let result = FixedChunker::new(5, 0)
        .with_mode(ChunkingMode::Tokens)
        .chunk(text);
    assert_eq!(result.into_texts().join(" "), text);
}

#[test]
fn sliding_window_overlap_property() {
    let text = (0..30).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
    let result = SlidingWindowChunker::new(6, 3)
        .with_mode(ChunkingMode::Tokens)
        .chunk(&text);
    let chunks: Vec<Vec<&str>> = result.texts().map(tokenize).collect();

    for i in 0..chunks.len() - 1 {
        if chunks[i].len() == 6 && chunks[i + 1].len() >= 3 {
            assert_eq!(&chunks[i][3..], &chunks[i + 1][..3]);
        }
    }
}

#[test]
fn sentence_overlap_repeats_whole_sentences() {
    let result = SentenceChunker::new(2)
        .with_overlap(1)
        .chunk("Alpha one. Beta two. Gamma three. Delta four.");
    let texts: Vec<&str> = result.texts().collect();
    assert_eq!(
        texts,
        vec![
            "Alpha one. Beta two.",
            "Beta two. Gamma three.",
            "Gamma three. Delta four.",
            "Delta four."
        ]
    );
}

#[test]
fn paragraph_overlap_repeats_whole_paragraphs() {
    let text = "P1\n\nP2\n\nP3\n\nP4";
    let result = ParagraphChunker::new(2).with_overlap(1).chunk(text);
    assert_eq!(result.chunks[0].text, "P1\n\nP2");
    assert_eq!(result.chunks[1].text, "P2\n\nP3");
}

// =============================================================================
// Size bounds
// =============================================================================

#[test]
fn fixed_chunker_respects_size() {
    let text = "word ".repeat(300);
    for size in [1, 5, 17, 100] {
        let result = FixedChunker::new(size, 0)
            .with_mode(ChunkingMode::Tokens)
            .chunk(&text);
        assert!(result.chunks.iter().all(|c| c.tokens <= size));
    }
}

#[test]
fn boundary_chunker_respects_size() {
    let text = "The cat sat. The dog ran far away from home. Birds sing at dawn.\n".repeat(20);
    for size in [10, 40, 120] {
        let result = BoundaryChunker::new(size, size / 4).chunk(&text);
        assert!(
            result.chunks.iter().all(|c| c.characters <= size),
            "size {size} exceeded"
        );
    }
}

#[test]
fn recursive_chunker_respects_size() {
    let text = "First paragraph with words.\n\nSecond one, longer, with commas and more words. \
                Another sentence here.\n\nThird.";
    for max in [8, 20, 50, 200] {
        let result = RecursiveChunker::prose(max).chunk(text);
        for chunk in &result.chunks {
            assert!(
                chunk.characters <= max,
                "chunk of {} chars exceeds {max}: {:?}",
                chunk.characters,
                chunk.text
            );
        }
    }
}

// =============================================================================
// Edge cases
// =============================================================================

#[test]
fn chunker_handles_only_whitespace() {
    let options = ChunkingOptions::default();
    for method in Method::ALL.into_iter().filter(|m| !m.is_async()) {
        let result = chunk_sync("   \n\t  \n\n  ", method.as_str(), &options).unwrap();
        assert!(result.is_empty(), "{method} chunked whitespace");
        assert_eq!(result.analysis.average_chunk_size.tokens, 0);
    }
}

#[test]
fn chunker_handles_newlines() {
    let text = "Line1\nLine2\nLine3\n\nParagraph2";
    let result = RecursiveChunker::prose(10).chunk(text);
    assert!(result.len() >= 3);
    assert!(result.chunks.iter().all(|c| !c.text.contains('\n')));
}

#[test]
fn chunker_handles_very_small_max_size() {
    let result = RecursiveChunker::prose(1).chunk("Hello");
    let texts: Vec<&str> = result.texts().collect();
    assert_eq!(texts, vec!["H", "e", "l", "l", "o"]);
}

#[test]
fn chunker_handles_size_equals_text_length() {
    let text = "exactly twenty chars";
    assert_eq!(text.chars().count(), 20);

    let result = RecursiveChunker::prose(20).chunk(text);
    assert_eq!(result.len(), 1);
    assert_eq!(result.chunks[0].text, text);

    let result = BoundaryChunker::new(20, 0).chunk(text);
    assert_eq!(result.len(), 1);
}

#[test]
fn multibyte_text_is_counted_in_characters() {
    let text = "日本語のテキスト。これは二番目の文です。";
    let result = FixedChunker::new(5, 0)
        .with_mode(ChunkingMode::Characters)
        .chunk(text);
    assert!(result.chunks.iter().all(|c| c.characters <= 10));
    assert!(!result.is_empty());
}
