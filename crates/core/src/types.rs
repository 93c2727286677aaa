//! Core type definitions for kpx

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ranked phrase with the score it received in one ranking pass
///
/// Scores are only comparable within a single pass; cosine similarity,
/// masked distance and fused rank scores live on different scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyphrase {
    pub phrase: String,
    pub score: f32,
}

impl Keyphrase {
    pub fn new<S: Into<String>>(phrase: S, score: f32) -> Self {
        Self {
            phrase: phrase.into(),
            score,
        }
    }
}

impl fmt::Display for Keyphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.4})", self.phrase, self.score)
    }
}

impl From<(String, f32)> for Keyphrase {
    fn from((phrase, score): (String, f32)) -> Self {
        Self { phrase, score }
    }
}

/// Input accepted by the extractor
///
/// A single text may be split into chunks before ranking; a list of
/// documents is ranked one list per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Inputs {
    Text(String),
    Documents(Vec<String>),
}

impl Inputs {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Documents(docs) => docs.iter().all(|d| d.trim().is_empty()),
        }
    }
}

impl From<String> for Inputs {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Inputs {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<String>> for Inputs {
    fn from(docs: Vec<String>) -> Self {
        Self::Documents(docs)
    }
}

impl From<Vec<&str>> for Inputs {
    fn from(docs: Vec<&str>) -> Self {
        Self::Documents(docs.into_iter().map(str::to_string).collect())
    }
}

/// Extraction result: one ranked list per document, or a single merged list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub keyphrases: Vec<Vec<Keyphrase>>,
}

impl Outputs {
    pub fn new(keyphrases: Vec<Vec<Keyphrase>>) -> Self {
        Self { keyphrases }
    }

    /// Phrases of every list, in order, without scores
    pub fn phrases(&self) -> Vec<Vec<String>> {
        self.keyphrases
            .iter()
            .map(|list| list.iter().map(|k| k.phrase.clone()).collect())
            .collect()
    }

    /// Every keyphrase of every list, in list order
    pub fn flat(&self) -> impl Iterator<Item = &Keyphrase> {
        self.keyphrases.iter().flatten()
    }

    /// The first list, which is the merged list when output is flattened
    pub fn first(&self) -> &[Keyphrase] {
        self.keyphrases.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.keyphrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyphrases.is_empty()
    }
}

/// Direction in which aggregated scores are ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreOrder {
    #[default]
    Descending,
    Ascending,
}

impl ScoreOrder {
    pub fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}
