//! Choosing the candidates that best represent an anchor embedding
//!
//! Four strategies are supported: plain similarity ranking, ranking with a
//! similarity floor, maximal marginal relevance (MMR) and max-sum diversity.
//! All of them share the same contract: `top_n` is clamped to the number of
//! candidates, ties keep the candidate order, and an optional floor is applied
//! after selection.

use crate::embedding::similarity::{similarities_to, similarity_matrix, SimilarityError};
use crate::types::Keyphrase;
use itertools::Itertools;
use std::cmp::Ordering;
use thiserror::Error;

/// Above this many subsets max-sum switches to a greedy search
const MAX_EXACT_COMBINATIONS: u64 = 20_000;

/// Selection algorithm with its parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionStrategy {
    /// Highest scores first
    Similarity,
    /// Highest scores first, then drop scores below `floor`
    Threshold { floor: f32 },
    /// Maximal marginal relevance; `diversity` weighs relevance against redundancy
    Mmr { diversity: f32, floor: Option<f32> },
    /// Least mutually similar subset of the `nr_candidates` most relevant
    MaxSum {
        nr_candidates: usize,
        floor: Option<f32>,
    },
}

impl SelectionStrategy {
    pub fn floor(&self) -> Option<f32> {
        match *self {
            Self::Similarity => None,
            Self::Threshold { floor } => Some(floor),
            Self::Mmr { floor, .. } | Self::MaxSum { floor, .. } => floor,
        }
    }
}

/// How a candidate is scored against the anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreMetric {
    /// Cosine similarity; larger is closer
    #[default]
    CosineSimilarity,
    /// `1 - cosine similarity` between the anchor and the anchor with the
    /// candidate masked out; larger means the candidate carried more meaning
    MaskedDistance,
}

/// Errors raised on degenerate selection input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("No candidates to select from")]
    EmptyCandidates,

    #[error("Got {embeddings} candidate embeddings for {labels} labels")]
    LengthMismatch { embeddings: usize, labels: usize },

    #[error(transparent)]
    Similarity(#[from] SimilarityError),
}

/// Selects up to `top_n` of `labels`, scored against `anchor`
///
/// # Errors
///
/// Fails on an empty candidate list, when embeddings and labels differ in
/// length, and on vectors that cannot be compared (zero vectors, dimension
/// mismatch).
///
/// # Examples
///
/// ```
/// use kpx_core::ranking::{select, ScoreMetric, SelectionStrategy};
///
/// let anchor = vec![1.0, 0.0];
/// let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.1]];
/// let labels = vec!["遠い".to_string(), "近い".to_string()];
///
/// let picked = select(
///     &anchor,
///     &candidates,
///     &labels,
///     1,
///     SelectionStrategy::Similarity,
///     ScoreMetric::CosineSimilarity,
/// )
/// .unwrap();
/// assert_eq!(picked[0].phrase, "近い");
/// ```
pub fn select(
    anchor: &[f32],
    candidates: &[Vec<f32>],
    labels: &[String],
    top_n: usize,
    strategy: SelectionStrategy,
    metric: ScoreMetric,
) -> Result<Vec<Keyphrase>, SelectionError> {
    if candidates.is_empty() {
        return Err(SelectionError::EmptyCandidates);
    }
    if candidates.len() != labels.len() {
        return Err(SelectionError::LengthMismatch {
            embeddings: candidates.len(),
            labels: labels.len(),
        });
    }

    let top_n = top_n.min(candidates.len());
    let mut scores = similarities_to(anchor, candidates)?;
    if metric == ScoreMetric::MaskedDistance {
        scores.iter_mut().for_each(|s| *s = 1.0 - *s);
    }

    let picked = match strategy {
        SelectionStrategy::Similarity | SelectionStrategy::Threshold { .. } => {
            let mut order = ranked(&scores);
            order.truncate(top_n);
            order
        }
        SelectionStrategy::Mmr { diversity, .. } => {
            maximal_marginal_relevance(&scores, candidates, top_n, diversity)?
        }
        SelectionStrategy::MaxSum { nr_candidates, .. } => {
            max_sum_distance(&scores, candidates, top_n, nr_candidates)?
        }
    };

    let floor = strategy.floor();
    Ok(picked
        .into_iter()
        .filter(|&i| floor.map_or(true, |f| scores[i] >= f))
        .map(|i| Keyphrase::new(labels[i].clone(), scores[i]))
        .collect())
}

/// Indices ordered by descending score; equal scores keep their order
fn ranked(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));
    order
}

fn descending(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn maximal_marginal_relevance(
    scores: &[f32],
    candidates: &[Vec<f32>],
    top_n: usize,
    diversity: f32,
) -> Result<Vec<usize>, SelectionError> {
    if top_n == 0 {
        return Ok(Vec::new());
    }

    let similarity = similarity_matrix(candidates)?;
    let first = ranked(scores)[0];
    let mut picked = vec![first];
    let mut remaining: Vec<usize> = (0..scores.len()).filter(|&i| i != first).collect();

    while picked.len() < top_n && !remaining.is_empty() {
        let mut best: Option<(usize, f32)> = None;
        for (position, &candidate) in remaining.iter().enumerate() {
            let redundancy = picked
                .iter()
                .map(|&p| similarity[candidate][p])
                .fold(f32::NEG_INFINITY, f32::max);
            let value = diversity * scores[candidate] - (1.0 - diversity) * redundancy;
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((position, value));
            }
        }

        match best {
            Some((position, _)) => picked.push(remaining.remove(position)),
            None => break,
        }
    }

    Ok(picked)
}

fn max_sum_distance(
    scores: &[f32],
    candidates: &[Vec<f32>],
    top_n: usize,
    nr_candidates: usize,
) -> Result<Vec<usize>, SelectionError> {
    if top_n == 0 {
        return Ok(Vec::new());
    }

    let pool_size = nr_candidates.max(top_n).min(scores.len());
    let mut pool = ranked(scores);
    pool.truncate(pool_size);

    let pool_vectors: Vec<Vec<f32>> = pool.iter().map(|&i| candidates[i].clone()).collect();
    let similarity = similarity_matrix(&pool_vectors)?;

    let chosen: Vec<usize> = if binomial_within(pool_size, top_n, MAX_EXACT_COMBINATIONS) {
        let mut best: Option<(Vec<usize>, f32)> = None;
        for combination in (0..pool_size).combinations(top_n) {
            let total: f32 = combination
                .iter()
                .tuple_combinations()
                .map(|(&a, &b)| similarity[a][b])
                .sum();
            if best.as_ref().map_or(true, |(_, t)| total < *t) {
                best = Some((combination, total));
            }
        }
        best.map(|(combination, _)| combination).unwrap_or_default()
    } else {
        greedy_min_similarity(&similarity, top_n)
    };

    let mut picked: Vec<usize> = chosen.into_iter().map(|p| pool[p]).collect();
    picked.sort_by(|&a, &b| descending(scores[a], scores[b]));
    Ok(picked)
}

/// Starts from the most relevant pool entry and keeps adding the entry least
/// similar to what is already chosen
fn greedy_min_similarity(similarity: &[Vec<f32>], top_n: usize) -> Vec<usize> {
    let mut chosen = vec![0];
    let mut remaining: Vec<usize> = (1..similarity.len()).collect();

    while chosen.len() < top_n && !remaining.is_empty() {
        let mut best: Option<(usize, f32)> = None;
        for (position, &candidate) in remaining.iter().enumerate() {
            let total: f32 = chosen.iter().map(|&c| similarity[candidate][c]).sum();
            if best.map_or(true, |(_, t)| total < t) {
                best = Some((position, total));
            }
        }
        match best {
            Some((position, _)) => chosen.push(remaining.remove(position)),
            None => break,
        }
    }

    chosen
}

/// Whether `n choose k` is at most `limit`
fn binomial_within(n: usize, k: usize, limit: u64) -> bool {
    let k = k.min(n - k.min(n));
    let mut value: u64 = 1;
    for i in 0..k as u64 {
        value = value * (n as u64 - i) / (i + 1);
        if value > limit {
            return false;
        }
    }
    true
}
