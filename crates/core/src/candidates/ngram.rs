//! Word n-gram vocabulary fit over the sentences of one extraction call

use super::stopwords::StopWords;
use std::collections::BTreeSet;

/// Count-vectorizer style n-gram vocabulary
///
/// Documents are whitespace-tokenized, stop words are removed and every
/// n-gram with `min <= n <= max` is collected, case sensitive. The vocabulary
/// is kept sorted.
///
/// # Examples
///
/// ```
/// use kpx_core::candidates::{NgramVectorizer, StopWords};
///
/// let docs = ["機械 学習 の 基礎", "深層 学習"];
/// let vectorizer = NgramVectorizer::fit(1, 2, docs, &StopWords::new(["の"]));
///
/// assert!(vectorizer.vocabulary().contains("機械 学習"));
/// assert_eq!(vectorizer.transform("深層 学習"), vec!["学習", "深層", "深層 学習"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramVectorizer {
    min: usize,
    max: usize,
    stop_words: StopWords,
    vocabulary: BTreeSet<String>,
}

impl NgramVectorizer {
    /// Builds the vocabulary from `docs`
    pub fn fit<'a, I>(min: usize, max: usize, docs: I, stop_words: &StopWords) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vectorizer = Self {
            min: min.max(1),
            max: max.max(min).max(1),
            stop_words: stop_words.clone(),
            vocabulary: BTreeSet::new(),
        };
        let vocabulary: BTreeSet<String> = docs
            .into_iter()
            .flat_map(|doc| vectorizer.analyze(doc))
            .collect();
        vectorizer.vocabulary = vocabulary;
        vectorizer
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }

    pub fn range(&self) -> (usize, usize) {
        (self.min, self.max)
    }

    /// Vocabulary entries occurring in `doc`, in vocabulary order
    pub fn transform(&self, doc: &str) -> Vec<String> {
        let present: BTreeSet<String> = self
            .analyze(doc)
            .into_iter()
            .filter(|gram| self.vocabulary.contains(gram))
            .collect();
        present.into_iter().collect()
    }

    fn analyze(&self, doc: &str) -> Vec<String> {
        let tokens: Vec<&str> = doc
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .collect();

        let mut grams = Vec::new();
        for n in self.min..=self.max {
            if n > tokens.len() {
                break;
            }
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        grams
    }
}
