//! End-to-end scenarios through the named entry points.

use chunksmith::{
    chunk, chunk_sync, export_json, Chunker, ChunkingMode, ChunkingOptions, Error,
    HeuristicChunker, Method, ParagraphChunker, SemanticChunker,
};

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_a_fixed_tokens() {
    let options = ChunkingOptions::default()
        .with_chunk_size(5)
        .with_overlap(0)
        .with_mode(ChunkingMode::Tokens);
    let result = chunk_sync("a b c d e f g h i j", "fixed", &options).unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.chunks[0].text, "a b c d e");
    assert_eq!(result.chunks[1].text, "f g h i j");
    assert!(result.chunks.iter().all(|c| c.tokens == 5));
    assert_eq!(result.analysis.average_chunk_size.tokens, 5);
}

#[test]
fn scenario_b_paragraph_defaults() {
    let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
    let result = chunk_sync(text, "paragraph", &ChunkingOptions::default()).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.chunks[0].text, text);
}

#[test]
fn scenario_c_sliding_window() {
    let options = ChunkingOptions::default()
        .with_chunk_size(4)
        .with_overlap(2)
        .with_mode(ChunkingMode::Tokens);
    let result = chunk_sync("a b c d e f g h i j", "sliding-window", &options).unwrap();

    let texts: Vec<&str> = result.texts().collect();
    assert_eq!(texts, vec!["a b c d", "c d e f", "e f g h", "g h i j", "i j"]);
    assert!(result.chunks.iter().all(|c| c.tokens <= 4));
    assert!(result.analysis.notes.contains("step 2"));
}

#[test]
fn scenario_d_recursive_passthrough() {
    let text = "no separators of note in this short line of words";
    let result = chunk_sync(text, "recursive", &ChunkingOptions::default()).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.chunks[0].text, text);
}

#[tokio::test]
async fn scenario_e_semantic_single_paragraph() {
    let text = "One paragraph. It has two sentences.";
    let options = ChunkingOptions::default().with_max_chunks(4);

    let semantic = chunk(text, "semantic", &options).await.unwrap();
    let paragraph = ParagraphChunker::from_options(&options).chunk(text);
    assert_eq!(semantic, paragraph);
}

// =============================================================================
// Fallbacks
// =============================================================================

#[tokio::test]
async fn semantic_without_credential_matches_heuristic() {
    let text = "# Setup\nInstall the tool.\nConfigure it.\n\n# Usage\nRun it daily.\nCheck output.";
    let options = ChunkingOptions::default();

    let semantic = SemanticChunker::from_options(&options);
    assert!(!semantic.has_embedder());

    let first = semantic.chunk(text).await;
    let second = semantic.chunk(text).await;
    assert_eq!(first, second);
    assert_eq!(first, HeuristicChunker::from_options(&options).chunk(text));
}

#[test]
fn recursive_zero_size_falls_back_to_fixed() {
    let options = ChunkingOptions::default().with_chunk_size(0);
    let result = chunk_sync("a b c d e", "recursive", &options).unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.analysis.notes.starts_with("Recursive splitting failed"));
    assert!(result.analysis.notes.contains("Fixed-length chunking"));
}

#[test]
fn agentic_reports_its_choice() {
    let text = "```\nfn main() {}\n```\n\nRun it with cargo.";
    let result = chunk_sync(text, "agentic", &ChunkingOptions::default()).unwrap();

    assert!(result.analysis.notes.contains("Agentic selection: rule 1"));
    assert!(result.analysis.notes.contains("paragraph"));
}

// =============================================================================
// Dispatch errors
// =============================================================================

#[test]
fn unknown_method_is_rejected() {
    let err = chunk_sync("text", "token-bucket", &ChunkingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedMethod(ref name) if name == "token-bucket"));
    assert_eq!(err.error_code(), "UNSUPPORTED_METHOD");
}

#[tokio::test]
async fn unknown_method_is_rejected_async() {
    let err = chunk("text", "", &ChunkingOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedMethod(_)));
}

#[test]
fn semantic_needs_async_entry() {
    let err = chunk_sync("a\n\nb", "semantic", &ChunkingOptions::default()).unwrap_err();
    assert!(matches!(err, Error::RequiresAsync("semantic")));
}

#[tokio::test]
async fn every_method_runs_async() {
    let text = "Alpha beta gamma. Delta epsilon.\n\nZeta eta theta. Iota kappa.";
    for method in Method::ALL {
        let result = chunk(text, method.as_str(), &ChunkingOptions::default())
            .await
            .unwrap();
        assert!(!result.is_empty(), "{method} returned nothing");
        assert_eq!(result.analysis.total_chunks, result.len());
    }
}

#[test]
fn method_names_are_normalized() {
    let options = ChunkingOptions::default().with_chunk_size(3);
    let a = chunk_sync("one two three four", "Sliding_Window", &options).unwrap();
    let b = chunk_sync("one two three four", "sliding-window", &options).unwrap();
    assert_eq!(a, b);
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn export_carries_run_metadata() {
    let text = "One. Two. Three.";
    let options = ChunkingOptions::default()
        .with_chunk_size(1)
        .with_embedding_api_key("sk-do-not-leak");
    let result = chunk_sync(text, "sentence", &options).unwrap();
    let json = export_json(text, "sentence", &options, &result).unwrap();

    assert!(!json.contains("sk-do-not-leak"));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["chunks"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["chunks"][2]["chunkNumber"], 3);
    assert_eq!(value["chunks"][2]["content"], "Three.");
    assert_eq!(value["metadata"]["totalTokens"], 3);
}
