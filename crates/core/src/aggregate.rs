//! Combining per-chunk keyphrase lists into a single ranking

use crate::ranking::fusion::reciprocal_rank;
use crate::types::{Keyphrase, ScoreOrder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How several keyphrase lists are merged into one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregation {
    /// Keep the best score of every phrase and sort by it
    ScoreSort { order: ScoreOrder },
    /// Reciprocal rank fusion over list position and rank within the list
    Rrf { k: u32 },
}

impl Aggregation {
    pub fn apply(&self, lists: &[Vec<Keyphrase>]) -> Vec<Keyphrase> {
        match *self {
            Self::ScoreSort { order } => flatten_by_score(lists, order),
            Self::Rrf { k } => flatten_by_rrf(lists, k),
        }
    }
}

/// Removes repeated phrases, keeping the first occurrence, then sorts
///
/// # Examples
///
/// ```
/// use kpx_core::aggregate::dedup_and_sort;
/// use kpx_core::{Keyphrase, ScoreOrder};
///
/// let list = vec![
///     Keyphrase::new("東京", 0.4),
///     Keyphrase::new("首都", 0.9),
///     Keyphrase::new("東京", 0.8),
/// ];
/// let sorted = dedup_and_sort(list, ScoreOrder::Descending);
///
/// assert_eq!(sorted.len(), 2);
/// assert_eq!(sorted[0].phrase, "首都");
/// assert_eq!(sorted[1].score, 0.4);
/// ```
pub fn dedup_and_sort(list: Vec<Keyphrase>, order: ScoreOrder) -> Vec<Keyphrase> {
    let mut unique: IndexMap<String, f32> = IndexMap::new();
    for keyphrase in list {
        unique.entry(keyphrase.phrase).or_insert(keyphrase.score);
    }
    sorted(unique, order)
}

/// Flattens lists keeping the max (descending) or min (ascending) score per phrase
pub fn flatten_by_score(lists: &[Vec<Keyphrase>], order: ScoreOrder) -> Vec<Keyphrase> {
    let mut merged: IndexMap<String, f32> = IndexMap::new();
    for keyphrase in lists.iter().flatten() {
        merged
            .entry(keyphrase.phrase.clone())
            .and_modify(|current| {
                *current = if order.is_descending() {
                    current.max(keyphrase.score)
                } else {
                    current.min(keyphrase.score)
                };
            })
            .or_insert(keyphrase.score);
    }
    sorted(merged, order)
}

/// Flattens lists scoring `1/(list_rank + k) + 1/(phrase_rank + k)`
///
/// Both ranks are 1-based positions. A phrase appearing in several lists
/// keeps its best fused score. The result is always descending.
pub fn flatten_by_rrf(lists: &[Vec<Keyphrase>], k: u32) -> Vec<Keyphrase> {
    let mut merged: IndexMap<String, f32> = IndexMap::new();
    for (i, list) in lists.iter().enumerate() {
        for (j, keyphrase) in list.iter().enumerate() {
            let score = reciprocal_rank(i + 1, k) + reciprocal_rank(j + 1, k);
            merged
                .entry(keyphrase.phrase.clone())
                .and_modify(|current| *current = current.max(score))
                .or_insert(score);
        }
    }
    sorted(merged, ScoreOrder::Descending)
}

fn sorted(scores: IndexMap<String, f32>, order: ScoreOrder) -> Vec<Keyphrase> {
    let mut keyphrases: Vec<Keyphrase> = scores
        .into_iter()
        .map(|(phrase, score)| Keyphrase::new(phrase, score))
        .collect();
    keyphrases.sort_by(|a, b| {
        let ord = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
        if order.is_descending() {
            ord.reverse()
        } else {
            ord
        }
    });
    keyphrases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn kp(phrase: &str, score: f32) -> Keyphrase {
        Keyphrase::new(phrase, score)
    }

    fn phrases(list: &[Keyphrase]) -> Vec<&str> {
        list.iter().map(|k| k.phrase.as_str()).collect()
    }

    #[test]
    fn test_dedup_keeps_first_seen_score() {
        let list = vec![kp("A", 0.1), kp("B", 0.5), kp("A", 0.9)];
        let result = dedup_and_sort(list, ScoreOrder::Descending);
        assert_eq!(result, vec![kp("B", 0.5), kp("A", 0.1)]);
    }

    #[test]
    fn test_dedup_is_case_sensitive() {
        let list = vec![kp("Rust", 0.5), kp("rust", 0.4)];
        assert_eq!(dedup_and_sort(list, ScoreOrder::Descending).len(), 2);
    }

    #[test]
    fn test_flatten_by_score_produces_unique_phrases() {
        let lists = vec![
            vec![kp("東京", 0.9), kp("首都", 0.5)],
            vec![kp("首都", 0.7), kp("経済", 0.6), kp("東京", 0.2)],
        ];
        let flat = flatten_by_score(&lists, ScoreOrder::Descending);

        let unique: HashSet<&str> = phrases(&flat).into_iter().collect();
        assert_eq!(unique.len(), flat.len());
        assert_eq!(flat, vec![kp("東京", 0.9), kp("首都", 0.7), kp("経済", 0.6)]);
    }

    #[test]
    fn test_flatten_by_score_ascending_keeps_min() {
        let lists = vec![vec![kp("A", 0.3), kp("B", 0.1)], vec![kp("A", 0.05)]];
        let flat = flatten_by_score(&lists, ScoreOrder::Ascending);
        assert_eq!(flat, vec![kp("A", 0.05), kp("B", 0.1)]);
    }

    #[test]
    fn test_flatten_by_score_ties_keep_first_seen_order() {
        let lists = vec![vec![kp("B", 0.5)], vec![kp("A", 0.5)]];
        let flat = flatten_by_score(&lists, ScoreOrder::Descending);
        assert_eq!(phrases(&flat), vec!["B", "A"]);
    }

    #[test]
    fn test_rrf_earlier_positions_score_higher() {
        let lists = vec![
            vec![kp("a1", 0.0), kp("a2", 0.0)],
            vec![kp("b1", 0.0), kp("b2", 0.0)],
        ];
        let flat = flatten_by_rrf(&lists, 60);

        assert_eq!(phrases(&flat), vec!["a1", "a2", "b1", "b2"]);
        let score = |p: &str| flat.iter().find(|k| k.phrase == p).map(|k| k.score).unwrap();
        assert!(score("a1") > score("a2"));
        assert!(score("a1") > score("b1"));
        assert!((score("a1") - 2.0 / 61.0).abs() < 1e-6);
    }

    #[test]
    fn test_rrf_collision_keeps_best() {
        let lists = vec![vec![kp("x", 0.0), kp("shared", 0.0)], vec![kp("shared", 0.0)]];
        let flat = flatten_by_rrf(&lists, 1);
        let shared = flat.iter().find(|k| k.phrase == "shared").unwrap();
        assert!((shared.score - (0.5 + 1.0 / 3.0)).abs() < 1e-6);
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_aggregation_dispatch() {
        let lists = vec![vec![kp("A", 0.2)], vec![kp("B", 0.9)]];
        let by_score = Aggregation::ScoreSort {
            order: ScoreOrder::Descending,
        }
        .apply(&lists);
        assert_eq!(phrases(&by_score), vec!["B", "A"]);

        let by_rank = Aggregation::Rrf { k: 60 }.apply(&lists);
        assert_eq!(phrases(&by_rank), vec!["A", "B"]);
    }

    #[test]
    fn test_empty_lists() {
        assert!(flatten_by_score(&[], ScoreOrder::Descending).is_empty());
        assert!(flatten_by_rrf(&[vec![], vec![]], 60).is_empty());
    }
}
