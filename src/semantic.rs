//! Semantic chunking using embedding similarity.
//!
//! Groups paragraphs by meaning rather than by size.
//!
//! ## The Idea
//!
//! Paragraphs about the same topic have similar embeddings. Starting from
//! one cluster per paragraph, the two *adjacent* clusters with the highest
//! average similarity are merged until about a third of the paragraphs
//! remain as clusters (or `max_chunks`, if that is smaller):
//!
//! ```text
//! Paragraphs:     P0    P1    P2    P3    P4    P5
//! Adjacent sim:      0.9   0.85  0.3   0.8   0.9
//!                                 ↑
//!                           topic shift
//!
//! Target: 6 / 3 = 2 clusters
//! Result: [P0 P1 P2] [P3 P4 P5]
//! ```
//!
//! Only adjacent clusters merge, so each chunk is a contiguous run of
//! paragraphs and document order is preserved.
//!
//! ## Dynamic Threshold
//!
//! The mean adjacent similarity times 0.8 gives a per-document threshold.
//! A paragraph whose averaged neighbour similarity is a strict local minimum
//! below it is reported as a candidate boundary. Candidates are diagnostic:
//! they are logged and counted in the notes but do not steer the clustering.
//!
//! ## Overlap
//!
//! Here `overlap` is a percentage (0-100). When two cluster centroids have a
//! similarity above 0.6, the chunk borrows the most similar paragraphs of the
//! other cluster, `round(similarity × overlap/100 × members)` of them and at
//! least one. Borrowed paragraphs go before the chunk if they come from
//! earlier in the document and after it otherwise.
//!
//! ## Degradation
//!
//! | Situation | Result |
//! |-----------|--------|
//! | No embedder | [`HeuristicChunker`] on the same text and options |
//! | One paragraph or fewer | [`ParagraphChunker`] on the same text and options |
//! | Provider or dimension error | [`HeuristicChunker`], with the error in the notes |
//!
//! Errors never reach the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::boundary::split_paragraphs;
use crate::config::ProviderSettings;
use crate::options::ChunkingOptions;
use crate::provider::{embed_all, Embedder};
use crate::similarity::{cosine_similarity, similarity_matrix, weighted_mean};
use crate::{Chunker, ChunkingResult, HeuristicChunker, ParagraphChunker, Result};

const THRESHOLD_FACTOR: f32 = 0.8;
const OVERLAP_SIMILARITY: f32 = 0.6;

/// Embedding-based paragraph clustering.
///
/// ## Example
///
/// ```rust,no_run
/// use chunksmith::{ChunkingOptions, SemanticChunker};
///
/// # async fn run(document: &str) {
/// let options = ChunkingOptions::default().with_embedding_api_key("sk-...");
/// let result = SemanticChunker::from_options(&options).chunk(document).await;
/// # }
/// ```
#[derive(Clone)]
pub struct SemanticChunker {
    embedder: Option<Arc<dyn Embedder>>,
    options: ChunkingOptions,
    max_concurrency: usize,
}

impl SemanticChunker {
    /// Build from caller options with default provider settings.
    ///
    /// With the `openai` feature, a non-blank `embedding_api_key` selects the
    /// OpenAI backend. Without a usable key the chunker runs the structural
    /// heuristic.
    pub fn from_options(options: &ChunkingOptions) -> Self {
        Self::with_settings(options, &ProviderSettings::default())
    }

    /// Build from caller options and provider settings.
    ///
    /// The backend uses the settings' base URL, model and timeout, and at most
    /// `settings.max_concurrency` paragraph embeddings are in flight. A key in
    /// `options` takes precedence over `settings.api_key`.
    pub fn with_settings(options: &ChunkingOptions, settings: &ProviderSettings) -> Self {
        let mut settings = settings.clone();
        if let Some(key) = options.api_key() {
            settings.api_key = Some(key.to_string());
        }
        Self {
            embedder: Self::embedder_for(&settings),
            options: options.clone(),
            max_concurrency: settings.max_concurrency.max(1),
        }
    }

    #[cfg(feature = "openai")]
    fn embedder_for(settings: &ProviderSettings) -> Option<Arc<dyn Embedder>> {
        settings.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        match crate::OpenAiEmbedder::new(settings) {
            Ok(embedder) => Some(Arc::new(embedder)),
            Err(e) => {
                warn!(error = %e, "could not build embedding client; semantic chunking will use the structural heuristic");
                None
            }
        }
    }

    #[cfg(not(feature = "openai"))]
    fn embedder_for(settings: &ProviderSettings) -> Option<Arc<dyn Embedder>> {
        if settings.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            warn!("embedding key supplied but no HTTP provider is compiled in; semantic chunking will use the structural heuristic");
        }
        None
    }

    /// Use `embedder` instead of a key-derived backend.
    pub fn with_embedder(embedder: impl Embedder + 'static, options: &ChunkingOptions) -> Self {
        Self::with_shared_embedder(Arc::new(embedder), options)
    }

    /// Use a shared embedder.
    pub fn with_shared_embedder(embedder: Arc<dyn Embedder>, options: &ChunkingOptions) -> Self {
        Self {
            embedder: Some(embedder),
            options: options.clone(),
            max_concurrency: ProviderSettings::default().max_concurrency,
        }
    }

    /// Bound the number of paragraph embeddings in flight (minimum 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Upper bound on paragraph embeddings in flight.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Whether an embedding backend is configured.
    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Chunk `text`. Never fails; see the module docs for fallbacks.
    pub async fn chunk(&self, text: &str) -> ChunkingResult {
        let Some(embedder) = self.embedder.as_deref() else {
            debug!("no embedder configured, using structural heuristic");
            return HeuristicChunker::from_options(&self.options).chunk(text);
        };

        let paragraphs = split_paragraphs(text);
        if paragraphs.len() <= 1 {
            return ParagraphChunker::from_options(&self.options).chunk(text);
        }

        match self.cluster(embedder, &paragraphs).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "semantic chunking failed, using structural heuristic");
                HeuristicChunker::from_options(&self.options)
                    .chunk(text)
                    .with_note_prefix(&format!(
                        "Semantic chunking failed ({e}); used structural heuristic fallback."
                    ))
            }
        }
    }

    async fn cluster(&self, embedder: &dyn Embedder, paragraphs: &[&str]) -> Result<ChunkingResult> {
        let embeddings = embed_all(embedder, paragraphs, self.max_concurrency).await?;
        let n = paragraphs.len();
        let sim = similarity_matrix(&embeddings);

        let adjacent: Vec<f32> = (0..n - 1).map(|i| sim[i][i + 1]).collect();
        let mean = adjacent.iter().sum::<f32>() / adjacent.len() as f32;
        let threshold = THRESHOLD_FACTOR * mean;
        let candidates = candidate_boundaries(&adjacent, threshold);
        debug!(paragraphs = n, mean, threshold, boundaries = ?candidates, "semantic similarity");

        let target = self
            .options
            .max_chunks()
            .map_or(n / 3, |max| max.min(n / 3))
            .max(1);
        let mut clusters = agglomerate(&sim, target);
        clusters.sort_by_key(|members| members.first().copied().unwrap_or(usize::MAX));

        let centroids: Vec<Vec<f32>> = clusters
            .iter()
            .map(|members| {
                let vectors: Vec<&[f32]> = members.iter().map(|&m| embeddings[m].as_slice()).collect();
                let weights: Vec<f32> = members
                    .iter()
                    .map(|&m| paragraphs[m].chars().count() as f32)
                    .collect();
                weighted_mean(&vectors, &weights)
            })
            .collect();

        let overlap = self.options.overlap.unwrap_or(0).min(100);
        let mut borrowed = 0;
        let texts: Vec<String> = if overlap > 0 && clusters.len() > 1 {
            (0..clusters.len())
                .map(|i| {
                    let mut before = Vec::new();
                    let mut after = Vec::new();
                    for j in (0..clusters.len()).filter(|&j| j != i) {
                        let s = cosine_similarity(&centroids[i], &centroids[j]);
                        if s <= OVERLAP_SIMILARITY {
                            continue;
                        }
                        let picked = most_similar_members(
                            &clusters[j],
                            &embeddings,
                            &centroids[i],
                            s,
                            overlap,
                        );
                        borrowed += picked.len();
                        let text = join_members(&picked, paragraphs);
                        if j < i {
                            before.push(text);
                        } else {
                            after.push(text);
                        }
                    }
                    before
                        .into_iter()
                        .chain(std::iter::once(join_members(&clusters[i], paragraphs)))
                        .chain(after)
                        .collect::<Vec<_>>()
                        .join("\n\n")
                })
                .collect()
        } else {
            clusters.iter().map(|m| join_members(m, paragraphs)).collect()
        };

        let mut notes = format!(
            "Semantic chunking: {n} paragraphs embedded; mean adjacent similarity {mean:.3}, \
             dynamic threshold {threshold:.3}, {} candidate boundaries (diagnostic); \
             agglomerated into {} clusters (target {target})",
            candidates.len(),
            clusters.len()
        );
        if overlap > 0 {
            notes.push_str(&format!(
                "; {overlap}% overlap shared {borrowed} paragraphs between similar clusters"
            ));
        }
        notes.push('.');

        Ok(ChunkingResult::from_texts(texts, notes))
    }
}

impl std::fmt::Debug for SemanticChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticChunker")
            .field("has_embedder", &self.has_embedder())
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}

/// Interior indices whose averaged neighbour similarity is a strict local
/// minimum below `threshold`.
fn candidate_boundaries(adjacent: &[f32], threshold: f32) -> Vec<usize> {
    let n = adjacent.len() + 1;
    if n < 3 {
        return Vec::new();
    }
    let score = |i: usize| -> f32 {
        if i == 0 {
            adjacent[0]
        } else if i == n - 1 {
            adjacent[n - 2]
        } else {
            (adjacent[i - 1] + adjacent[i]) / 2.0
        }
    };
    (1..n - 1)
        .filter(|&i| {
            let s = score(i);
            s < threshold && s < score(i - 1) && s < score(i + 1)
        })
        .collect()
}

/// Merge adjacent clusters by average linkage until `target` remain.
///
/// Ties go to the leftmost pair.
fn agglomerate(sim: &[Vec<f32>], target: usize) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = (0..sim.len()).map(|i| vec![i]).collect();

    while clusters.len() > target {
        let best = clusters
            .windows(2)
            .enumerate()
            .map(|(k, pair)| (k, average_linkage(sim, &pair[0], &pair[1])))
            .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)));
        let Some((k, _)) = best else { break };

        let right = clusters.remove(k + 1);
        clusters[k].extend(right);
        clusters[k].sort_unstable();
    }
    clusters
}

fn average_linkage(sim: &[Vec<f32>], a: &[usize], b: &[usize]) -> f32 {
    let total: f32 = a.iter().flat_map(|&i| b.iter().map(move |&j| sim[i][j])).sum();
    total / (a.len() * b.len()) as f32
}

/// The members of `cluster` most similar to `centroid`, in document order.
fn most_similar_members(
    cluster: &[usize],
    embeddings: &[Vec<f32>],
    centroid: &[f32],
    similarity: f32,
    overlap_percent: usize,
) -> Vec<usize> {
    let count = (similarity * overlap_percent as f32 / 100.0 * cluster.len() as f32).round() as usize;
    let count = count.clamp(1, cluster.len());

    let mut ranked: Vec<(usize, f32)> = cluster
        .iter()
        .map(|&m| (m, cosine_similarity(&embeddings[m], centroid)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut picked: Vec<usize> = ranked.into_iter().take(count).map(|(m, _)| m).collect();
    picked.sort_unstable();
    picked
}

fn join_members(members: &[usize], paragraphs: &[&str]) -> String {
    members
        .iter()
        .map(|&m| paragraphs[m])
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Two fixed directions: paragraphs mentioning cats, and everything else.
    struct TopicEmbedder {
        cat: Vec<f32>,
        other: Vec<f32>,
    }

    impl TopicEmbedder {
        fn orthogonal() -> Self {
            Self {
                cat: vec![1.0, 0.0],
                other: vec![0.0, 1.0],
            }
        }

        fn close() -> Self {
            Self {
                cat: vec![1.0, 0.5],
                other: vec![0.5, 1.0],
            }
        }
    }

    #[async_trait]
    impl Embedder for TopicEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(if text.contains("cat") {
                self.cat.clone()
            } else {
                self.other.clone()
            })
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct Failing;

    #[async_trait]
    impl Embedder for Failing {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Provider {
                status: 503,
                body: "unavailable".into(),
            })
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Records the most embeddings ever in flight at once.
    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for InFlight {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(if text.contains("cat") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            })
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    fn two_topics() -> String {
        [
            "The cat sleeps all day.",
            "A cat chases the red dot.",
            "Every cat likes warm places.",
            "Stocks fell sharply today.",
            "Markets closed lower again.",
            "Bond yields rose overnight.",
        ]
        .join("\n\n")
    }

    #[tokio::test]
    async fn test_no_embedder_matches_heuristic() {
        let options = ChunkingOptions::default();
        let text = two_topics();
        assert_eq!(
            SemanticChunker::from_options(&options).chunk(&text).await,
            HeuristicChunker::from_options(&options).chunk(&text)
        );
    }

    #[tokio::test]
    async fn test_single_paragraph_matches_paragraph_chunking() {
        let options = ChunkingOptions::default();
        let text = "Only one paragraph about a cat.";
        let chunker = SemanticChunker::with_embedder(TopicEmbedder::orthogonal(), &options);
        assert_eq!(
            chunker.chunk(text).await,
            ParagraphChunker::from_options(&options).chunk(text)
        );
    }

    #[tokio::test]
    async fn test_clusters_follow_topics() {
        let chunker =
            SemanticChunker::with_embedder(TopicEmbedder::orthogonal(), &ChunkingOptions::default());
        let result = chunker.chunk(&two_topics()).await;

        assert_eq!(result.len(), 2);
        assert!(result.chunks[0].text.starts_with("The cat sleeps"));
        assert!(result.chunks[0].text.ends_with("warm places."));
        assert!(result.chunks[1].text.starts_with("Stocks fell"));
        assert!(result.analysis.notes.contains("target 2"));
    }

    #[tokio::test]
    async fn test_max_chunks_lowers_target() {
        let options = ChunkingOptions::default().with_max_chunks(1);
        let chunker = SemanticChunker::with_embedder(TopicEmbedder::orthogonal(), &options);
        assert_eq!(chunker.chunk(&two_topics()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_overlap_borrows_from_similar_clusters() {
        let options = ChunkingOptions::default().with_overlap(50);
        let chunker = SemanticChunker::with_embedder(TopicEmbedder::close(), &options);
        let result = chunker.chunk(&two_topics()).await;

        assert_eq!(result.len(), 2);
        // round(0.8 × 0.5 × 3) = 1 paragraph borrowed each way
        assert_eq!(result.chunks[0].text.matches("\n\n").count(), 3);
        assert!(result.chunks[0].text.starts_with("The cat sleeps"));
        assert!(result.chunks[1].text.contains("cat"));
        assert!(result.analysis.notes.contains("shared 2 paragraphs"));
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let options = ChunkingOptions::default();
        let text = two_topics();
        let result = SemanticChunker::with_embedder(Failing, &options).chunk(&text).await;
        assert!(result.analysis.notes.starts_with("Semantic chunking failed"));

        let heuristic = HeuristicChunker::from_options(&options).chunk(&text);
        assert_eq!(result.chunks, heuristic.chunks);
    }

    #[test]
    fn test_candidate_boundaries_at_dip() {
        // neighbour scores: 0.9 0.9 0.55 0.35 0.7 0.9
        let adjacent = [0.9, 0.9, 0.2, 0.5, 0.9];
        let mean: f32 = adjacent.iter().sum::<f32>() / 5.0;
        let found = candidate_boundaries(&adjacent, 0.8 * mean);
        assert_eq!(found, vec![3]);

        // equal neighbours are not a strict minimum
        assert!(candidate_boundaries(&[0.9, 0.2, 0.9], 0.9).is_empty());
    }

    #[tokio::test]
    async fn test_settings_bound_concurrency() {
        let settings = ProviderSettings {
            max_concurrency: 2,
            ..ProviderSettings::default()
        };
        let tracker = Arc::new(InFlight::default());
        let chunker = SemanticChunker {
            embedder: Some(tracker.clone()),
            ..SemanticChunker::with_settings(&ChunkingOptions::default(), &settings)
        };
        assert_eq!(chunker.max_concurrency(), 2);

        let result = chunker.chunk(&two_topics()).await;
        assert_eq!(result.len(), 2);
        assert_eq!(tracker.peak.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_with_settings() {
        let options = ChunkingOptions::default();
        let settings = ProviderSettings {
            max_concurrency: 0,
            ..ProviderSettings::default()
        };
        let chunker = SemanticChunker::with_settings(&options, &settings);
        assert_eq!(chunker.max_concurrency(), 1);
        assert!(!chunker.has_embedder());

        assert_eq!(SemanticChunker::from_options(&options).max_concurrency(), 8);

        let keyed = settings.clone().with_api_key("sk-settings");
        assert_eq!(
            SemanticChunker::with_settings(&options, &keyed).has_embedder(),
            cfg!(feature = "openai")
        );
        let blank = settings.with_api_key("  ");
        let options = ChunkingOptions::default().with_embedding_api_key("sk-options");
        assert_eq!(
            SemanticChunker::with_settings(&options, &blank).has_embedder(),
            cfg!(feature = "openai")
        );
    }

    #[test]
    fn test_agglomerate_ties_merge_leftmost() {
        let sim = vec![
            vec![1.0, 0.5, 0.5],
            vec![0.5, 1.0, 0.5],
            vec![0.5, 0.5, 1.0],
        ];
        assert_eq!(agglomerate(&sim, 2), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_agglomerate_stops_at_target() {
        let sim = vec![
            vec![1.0, 0.9, 0.1],
            vec![0.9, 1.0, 0.2],
            vec![0.1, 0.2, 1.0],
        ];
        assert_eq!(agglomerate(&sim, 2), vec![vec![0, 1], vec![2]]);
        assert_eq!(agglomerate(&sim, 1), vec![vec![0, 1, 2]]);
    }
}
