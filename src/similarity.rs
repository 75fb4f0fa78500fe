//! Vector similarity helpers shared by semantic chunking and retrieval.

/// Cosine similarity between two embeddings.
///
/// Returns `0.0` when either vector has zero magnitude, so callers never see
/// NaN. Otherwise the result lies in `[-1, 1]`. Extra trailing components of
/// the longer vector are ignored.
///
/// ```rust
/// use chunksmith::cosine_similarity;
///
/// assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
/// assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// Full pairwise similarity matrix. Symmetric, with the self-similarity on
/// the diagonal.
pub fn similarity_matrix(embeddings: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let n = embeddings.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let sim = cosine_similarity(&embeddings[i], &embeddings[j]);
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }
    matrix
}

/// Weighted component-wise mean of `vectors`.
///
/// Falls back to equal weights when the weights sum to zero.
pub fn weighted_mean(vectors: &[&[f32]], weights: &[f32]) -> Vec<f32> {
    let Some(dim) = vectors.iter().map(|v| v.len()).max() else {
        return Vec::new();
    };
    let total: f32 = weights.iter().sum();
    let equal = total <= 0.0;

    let mut mean = vec![0.0; dim];
    for (i, vector) in vectors.iter().enumerate() {
        let w = if equal {
            1.0 / vectors.len() as f32
        } else {
            weights.get(i).copied().unwrap_or(0.0) / total
        };
        for (m, x) in mean.iter_mut().zip(vector.iter()) {
            *m += w * x;
        }
    }
    mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0; 4], &[0.0; 4]), 0.0);
        assert!(!cosine_similarity(&[], &[]).is_nan());
    }

    #[test]
    fn test_matrix_symmetric() {
        let m = similarity_matrix(&[vec![1.0, 0.0], vec![0.6, 0.8], vec![0.0, 1.0]]);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert!((m[i][i] - 1.0).abs() < 1e-6);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
        assert!((m[0][1] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_mean() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        let mean = weighted_mean(&[&a, &b], &[3.0, 1.0]);
        assert!((mean[0] - 0.75).abs() < 1e-6);
        assert!((mean[1] - 0.25).abs() < 1e-6);

        let equal = weighted_mean(&[&a, &b], &[0.0, 0.0]);
        assert!((equal[0] - 0.5).abs() < 1e-6);
    }
}
