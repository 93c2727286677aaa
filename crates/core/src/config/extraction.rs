//! Extraction settings and their validated form

use crate::candidates::{ChunkGrammar, PhrasingMode, PosTag, DEFAULT_GRAMMAR};
use crate::error::{KpxError, Result};
use crate::ranking::{EmbeddingTarget, FusionPolicy, ScoreMetric, SelectionStrategy};
use crate::types::ScoreOrder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Selection family used for sentences and phrases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiversityMode {
    #[default]
    Normal,
    UseMaxsum,
    UseMmr,
}

/// User-facing extraction options
///
/// Every field has a default, so partial YAML or JSON documents load.
/// Call [`ExtractionSettings::validate`] to obtain an [`ExtractionConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default)]
    pub diversity_mode: DiversityMode,
    /// Number of phrases kept per sentence or chunk
    #[serde(default = "default_max_filtered")]
    pub max_filtered_phrases: usize,
    /// Number of sentences kept per chunk
    #[serde(default = "default_max_filtered")]
    pub max_filtered_sentences: usize,
    /// Similarity floor applied after selection
    #[serde(default)]
    pub threshold: Option<f32>,
    /// Max-sum candidate pool size
    #[serde(default = "default_nr_candidates")]
    pub nr_candidates: usize,
    /// MMR relevance weight
    #[serde(default = "default_diversity")]
    pub diversity: f32,
    /// Sentences shorter than this are merged with the next one
    #[serde(default = "default_minimum_characters")]
    pub minimum_characters: usize,
    /// Rank sentences first, then phrases within the selected sentences
    #[serde(default = "default_true")]
    pub filter_sentences: bool,
    #[serde(default = "default_true")]
    pub grammar_phrasing: bool,
    #[serde(default = "default_grammar")]
    pub grammar: String,
    #[serde(default)]
    pub ngram_range: Option<(usize, usize)>,
    /// Tags kept for tokens outside noun phrases; `None` keeps every tag
    #[serde(default = "default_pos_filter")]
    pub pos_filter: Option<Vec<PosTag>>,
    #[serde(default)]
    pub use_masked_distance: bool,
    #[serde(default)]
    pub add_source_text: bool,
    #[serde(default = "default_true")]
    pub use_rrf_sorting: bool,
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
    #[serde(default = "default_fusion_alpha")]
    pub fusion_alpha: f32,
    /// Direction of the score-sort aggregation across chunks
    #[serde(default)]
    pub score_order: ScoreOrder,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            diversity_mode: DiversityMode::default(),
            max_filtered_phrases: default_max_filtered(),
            max_filtered_sentences: default_max_filtered(),
            threshold: None,
            nr_candidates: default_nr_candidates(),
            diversity: default_diversity(),
            minimum_characters: default_minimum_characters(),
            filter_sentences: true,
            grammar_phrasing: true,
            grammar: default_grammar(),
            ngram_range: None,
            pos_filter: default_pos_filter(),
            use_masked_distance: false,
            add_source_text: false,
            use_rrf_sorting: true,
            rrf_k: default_rrf_k(),
            fusion_alpha: default_fusion_alpha(),
            score_order: ScoreOrder::default(),
        }
    }
}

impl ExtractionSettings {
    /// Switches to n-gram phrasing, turning grammar phrasing off
    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = Some((min, max));
        self.grammar_phrasing = false;
        self
    }

    /// Switches to grammar phrasing, clearing any n-gram range
    pub fn with_grammar_phrasing<S: Into<String>>(mut self, grammar: Option<S>) -> Self {
        self.grammar_phrasing = true;
        self.ngram_range = None;
        if let Some(grammar) = grammar {
            self.grammar = grammar.into();
        }
        self
    }

    pub fn with_diversity_mode(mut self, mode: DiversityMode) -> Self {
        self.diversity_mode = mode;
        self
    }

    pub fn with_max_filtered_phrases(mut self, n: usize) -> Self {
        self.max_filtered_phrases = n;
        self
    }

    pub fn with_filter_sentences(mut self, filter_sentences: bool) -> Self {
        self.filter_sentences = filter_sentences;
        self
    }

    /// Checks option combinations and builds the typed configuration
    ///
    /// # Errors
    ///
    /// Returns `KpxError::Validation` naming the offending fields, or the
    /// grammar parse error when `grammar` does not parse.
    pub fn validate(&self) -> Result<ExtractionConfig> {
        if let Some(threshold) = self.threshold {
            check_unit("threshold", threshold)?;
        }
        check_unit("diversity", self.diversity)?;
        check_unit("fusion_alpha", self.fusion_alpha)?;

        if self.max_filtered_phrases == 0 {
            return Err(KpxError::validation("max_filtered_phrases must be greater than 0"));
        }
        if self.max_filtered_sentences == 0 {
            return Err(KpxError::validation(
                "max_filtered_sentences must be greater than 0",
            ));
        }

        if self.diversity_mode == DiversityMode::UseMaxsum
            && (self.nr_candidates < self.max_filtered_phrases
                || self.nr_candidates < self.max_filtered_sentences)
        {
            return Err(KpxError::validation(format!(
                "nr_candidates ({}) must be at least max_filtered_phrases ({}) and max_filtered_sentences ({}) when diversity_mode is use_maxsum",
                self.nr_candidates, self.max_filtered_phrases, self.max_filtered_sentences
            )));
        }

        if self.use_masked_distance && self.add_source_text {
            return Err(KpxError::validation(
                "use_masked_distance and add_source_text cannot both be enabled",
            ));
        }

        let phrasing = self.phrasing()?;

        let mode = if self.use_masked_distance && self.diversity_mode != DiversityMode::Normal {
            warn!(
                "use_masked_distance takes precedence, ignoring diversity_mode {:?}",
                self.diversity_mode
            );
            DiversityMode::Normal
        } else {
            self.diversity_mode
        };

        let strategy = match mode {
            DiversityMode::Normal => match self.threshold {
                Some(floor) => SelectionStrategy::Threshold { floor },
                None => SelectionStrategy::Similarity,
            },
            DiversityMode::UseMmr => SelectionStrategy::Mmr {
                diversity: self.diversity,
                floor: self.threshold,
            },
            DiversityMode::UseMaxsum => SelectionStrategy::MaxSum {
                nr_candidates: self.nr_candidates,
                floor: self.threshold,
            },
        };

        let (metric, target) = if self.use_masked_distance {
            (ScoreMetric::MaskedDistance, EmbeddingTarget::Masked)
        } else if self.add_source_text {
            (ScoreMetric::CosineSimilarity, EmbeddingTarget::WithSourceText)
        } else {
            (ScoreMetric::CosineSimilarity, EmbeddingTarget::Plain)
        };

        let fusion = if self.use_rrf_sorting {
            FusionPolicy::Rrf { k: self.rrf_k }
        } else {
            FusionPolicy::Weighted {
                alpha: self.fusion_alpha,
            }
        };

        let pos_filter = match &self.pos_filter {
            Some(tags) => tags.iter().copied().collect(),
            None => PosTag::ALL.into_iter().collect(),
        };

        Ok(ExtractionConfig {
            strategy,
            metric,
            target,
            fusion,
            phrasing,
            pos_filter,
            max_filtered_phrases: self.max_filtered_phrases,
            max_filtered_sentences: self.max_filtered_sentences,
            minimum_characters: self.minimum_characters,
            filter_sentences: self.filter_sentences,
            score_order: self.score_order,
        })
    }

    fn phrasing(&self) -> Result<PhrasingMode> {
        match (self.grammar_phrasing, self.ngram_range) {
            (true, Some(_)) => Err(KpxError::validation(
                "grammar_phrasing and ngram_range are mutually exclusive",
            )),
            (true, None) => Ok(PhrasingMode::Grammar(self.grammar.parse::<ChunkGrammar>()?)),
            (false, range) => {
                let (min, max) = range.unwrap_or((1, 1));
                if min < 1 {
                    return Err(KpxError::validation("ngram_range minimum must be at least 1"));
                }
                if min > max {
                    return Err(KpxError::validation(format!(
                        "ngram_range minimum ({}) exceeds maximum ({})",
                        min, max
                    )));
                }
                Ok(PhrasingMode::NGram { min, max })
            }
        }
    }
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(KpxError::validation(format!(
            "{} must be within [0, 1], got {}",
            field, value
        )))
    }
}

/// Validated extraction options, consumed by the ranking engine
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    strategy: SelectionStrategy,
    metric: ScoreMetric,
    target: EmbeddingTarget,
    fusion: FusionPolicy,
    phrasing: PhrasingMode,
    pos_filter: BTreeSet<PosTag>,
    max_filtered_phrases: usize,
    max_filtered_sentences: usize,
    minimum_characters: usize,
    filter_sentences: bool,
    score_order: ScoreOrder,
}

impl ExtractionConfig {
    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    pub fn metric(&self) -> ScoreMetric {
        self.metric
    }

    pub fn target(&self) -> EmbeddingTarget {
        self.target
    }

    pub fn fusion(&self) -> FusionPolicy {
        self.fusion
    }

    pub fn phrasing(&self) -> &PhrasingMode {
        &self.phrasing
    }

    pub fn pos_filter(&self) -> &BTreeSet<PosTag> {
        &self.pos_filter
    }

    pub fn max_filtered_phrases(&self) -> usize {
        self.max_filtered_phrases
    }

    pub fn max_filtered_sentences(&self) -> usize {
        self.max_filtered_sentences
    }

    pub fn minimum_characters(&self) -> usize {
        self.minimum_characters
    }

    pub fn filter_sentences(&self) -> bool {
        self.filter_sentences
    }

    pub fn score_order(&self) -> ScoreOrder {
        self.score_order
    }
}

fn default_true() -> bool {
    true
}
fn default_max_filtered() -> usize {
    10
}
fn default_nr_candidates() -> usize {
    20
}
fn default_diversity() -> f32 {
    0.7
}
fn default_minimum_characters() -> usize {
    10
}
fn default_grammar() -> String {
    DEFAULT_GRAMMAR.to_string()
}
fn default_pos_filter() -> Option<Vec<PosTag>> {
    Some(vec![PosTag::Noun, PosTag::Propn, PosTag::Adj, PosTag::Num])
}
fn default_rrf_k() -> u32 {
    60
}
fn default_fusion_alpha() -> f32 {
    0.5
}
