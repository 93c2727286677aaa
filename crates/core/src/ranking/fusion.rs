//! Merging sentence importance with phrase importance inside one chunk

use crate::types::Keyphrase;
use std::cmp::Ordering;

/// RRF smoothing constant used when none is configured
pub const DEFAULT_RRF_K: u32 = 60;

/// Weight of the sentence score in weighted fusion when none is configured
pub const DEFAULT_FUSION_ALPHA: f32 = 0.5;

/// How sentence scores and phrase scores are combined
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionPolicy {
    /// `1/(sentence_rank + k) + 1/(phrase_rank + k)` over 1-based ranks
    Rrf { k: u32 },
    /// `alpha * sentence_score + (1 - alpha) * phrase_score`
    Weighted { alpha: f32 },
}

impl Default for FusionPolicy {
    fn default() -> Self {
        Self::Rrf { k: DEFAULT_RRF_K }
    }
}

/// Fuses the selected sentences of a chunk with the phrases picked from each
///
/// `phrases[i]` holds the phrases selected for `sentences[i]`. The result
/// holds every phrase once per sentence it was picked from, sorted by fused
/// score descending; equal scores keep sentence then phrase order.
///
/// # Examples
///
/// ```
/// use kpx_core::ranking::{fuse, FusionPolicy};
/// use kpx_core::Keyphrase;
///
/// let sentences = vec![Keyphrase::new("文A", 0.9), Keyphrase::new("文B", 0.5)];
/// let phrases = vec![
///     vec![Keyphrase::new("東京", 0.8)],
///     vec![Keyphrase::new("経済", 0.9)],
/// ];
///
/// let fused = fuse(&sentences, &phrases, FusionPolicy::Weighted { alpha: 0.5 });
/// assert_eq!(fused[0].phrase, "東京");
/// assert!((fused[0].score - 0.85).abs() < 1e-6);
/// ```
pub fn fuse(sentences: &[Keyphrase], phrases: &[Vec<Keyphrase>], policy: FusionPolicy) -> Vec<Keyphrase> {
    let sentence_scores: Vec<f32> = sentences.iter().map(|s| s.score).collect();
    let sentence_ranks = ranks(&sentence_scores);

    let mut fused: Vec<Keyphrase> = Vec::new();
    for (i, picked) in phrases.iter().enumerate().take(sentences.len()) {
        let phrase_scores: Vec<f32> = picked.iter().map(|p| p.score).collect();
        let phrase_ranks = ranks(&phrase_scores);

        for (phrase, phrase_rank) in picked.iter().zip(phrase_ranks) {
            let score = match policy {
                FusionPolicy::Rrf { k } => {
                    reciprocal_rank(sentence_ranks[i], k) + reciprocal_rank(phrase_rank, k)
                }
                FusionPolicy::Weighted { alpha } => {
                    alpha * sentence_scores[i] + (1.0 - alpha) * phrase.score
                }
            };
            fused.push(Keyphrase::new(phrase.phrase.clone(), score));
        }
    }

    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    fused
}

/// `1 / (rank + k)` for a 1-based rank
pub fn reciprocal_rank(rank: usize, k: u32) -> f32 {
    1.0 / (rank as f32 + k as f32)
}

/// 1-based rank of each score when ordered descending; ties rank by position
pub fn ranks(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0; scores.len()];
    for (rank, index) in order.into_iter().enumerate() {
        ranks[index] = rank + 1;
    }
    ranks
}
