//! Vector similarity used by candidate selection

use thiserror::Error;

/// Errors that can occur during similarity calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimilarityError {
    /// Vector dimensions do not match
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// One or both vectors are zero vectors (no magnitude)
    #[error("Cannot calculate similarity for zero vector")]
    ZeroVector,

    /// Invalid value encountered (NaN or infinite)
    #[error("Invalid value in similarity calculation: {0}")]
    InvalidValue(String),
}

/// Calculates the cosine similarity between two vectors
///
/// # Errors
///
/// Returns `SimilarityError::DimensionMismatch` if the vectors differ in
/// length or are empty, `SimilarityError::ZeroVector` if either has zero
/// magnitude and `SimilarityError::InvalidValue` for NaN or infinite results.
///
/// # Examples
///
/// ```
/// use kpx_core::embedding::similarity::cosine_similarity;
///
/// let a = vec![1.0, 0.0, 0.0];
/// let b = vec![1.0, 0.0, 0.0];
/// let similarity = cosine_similarity(&a, &b).unwrap();
/// assert!((similarity - 1.0).abs() < 0.0001);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() || a.is_empty() {
        return Err(SimilarityError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroVector);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());

    if similarity.is_nan() {
        return Err(SimilarityError::InvalidValue("NaN".to_string()));
    }
    if similarity.is_infinite() {
        return Err(SimilarityError::InvalidValue("Infinite".to_string()));
    }

    // rounding can push identical vectors slightly past 1
    Ok(similarity.clamp(-1.0, 1.0))
}

/// Cosine distance, `1 - cosine_similarity`
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    cosine_similarity(a, b).map(|s| 1.0 - s)
}

/// Similarity of every candidate to one anchor
///
/// # Examples
///
/// ```
/// use kpx_core::embedding::similarity::similarities_to;
///
/// let anchor = vec![1.0, 0.0];
/// let candidates = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
/// let scores = similarities_to(&anchor, &candidates).unwrap();
/// assert_eq!(scores.len(), 2);
/// assert!(scores[0] > scores[1]);
/// ```
pub fn similarities_to(anchor: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<f32>, SimilarityError> {
    candidates
        .iter()
        .map(|candidate| cosine_similarity(anchor, candidate))
        .collect()
}

/// Symmetric matrix of cosine similarities between all pairs of vectors
pub fn similarity_matrix(vectors: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, SimilarityError> {
    let n = vectors.len();
    let mut matrix = vec![vec![0.0f32; n]; n];

    for i in 0..n {
        for j in i..n {
            let sim = cosine_similarity(&vectors[i], &vectors[j])?;
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }

    Ok(matrix)
}
