//! Candidate phrase generation
//!
//! Candidates come either from a chunk grammar over part-of-speech tags or
//! from an n-gram vocabulary fit over the sentences of the current call.
//! Both modes re-align candidates with the source text so that the surface
//! form of a keyphrase is the one the user wrote.

pub mod grammar;
pub mod ngram;
pub mod stopwords;
pub mod tokenizer;

pub use grammar::{ChunkGrammar, ParseNode, DEFAULT_GRAMMAR, PHRASE_LABEL};
pub use ngram::NgramVectorizer;
pub use stopwords::StopWords;
pub use tokenizer::{PosTag, ScriptTokenizer, Token, Tokenizer};

use crate::error::{KpxError, Result};
use crate::text::to_original_expression;
use indexmap::IndexSet;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// How candidate phrases are formed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhrasingMode {
    /// Noun-phrase chunking with a tag grammar
    Grammar(ChunkGrammar),
    /// Word n-grams with `min <= n <= max`
    NGram { min: usize, max: usize },
}

impl PhrasingMode {
    pub fn is_grammar(&self) -> bool {
        matches!(self, Self::Grammar(_))
    }
}

/// Produces candidate sets for sentences of a single extraction call
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    phrasing: PhrasingMode,
    pos_filter: BTreeSet<PosTag>,
    stop_words: Arc<StopWords>,
    vectorizer: Option<NgramVectorizer>,
}

impl CandidateGenerator {
    pub fn new(
        phrasing: PhrasingMode,
        pos_filter: BTreeSet<PosTag>,
        stop_words: Arc<StopWords>,
    ) -> Self {
        Self {
            phrasing,
            pos_filter,
            stop_words,
            vectorizer: None,
        }
    }

    pub fn phrasing(&self) -> &PhrasingMode {
        &self.phrasing
    }

    /// Fits the n-gram vocabulary over every tokenized sentence of the call
    ///
    /// Does nothing in grammar mode.
    pub fn fit(&mut self, sentences: &[Vec<Token>]) {
        if let PhrasingMode::NGram { min, max } = self.phrasing {
            let joined: Vec<String> = sentences.iter().map(|tokens| join_tokens(tokens)).collect();
            let vectorizer =
                NgramVectorizer::fit(min, max, joined.iter().map(String::as_str), &self.stop_words);
            debug!(
                "Fitted n-gram vocabulary of {} entries over {} sentences",
                vectorizer.vocabulary().len(),
                sentences.len()
            );
            self.vectorizer = Some(vectorizer);
        }
    }

    /// Candidates for one sentence, aligned with `source`
    pub fn generate(&self, source: &str, tokens: &[Token]) -> Result<IndexSet<String>> {
        match &self.phrasing {
            PhrasingMode::Grammar(grammar) => Ok(self.grammar_candidates(grammar, source, tokens)),
            PhrasingMode::NGram { .. } => self.ngram_candidates(source, tokens),
        }
    }

    /// Noun-phrase spans plus uncovered tokens that pass the filters
    pub fn grammar_candidates(
        &self,
        grammar: &ChunkGrammar,
        source: &str,
        tokens: &[Token],
    ) -> IndexSet<String> {
        let tags: Vec<&str> = tokens.iter().map(|t| t.pos.as_str()).collect();
        let mut raw: IndexSet<String> = IndexSet::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for span in grammar.spans(&tags, PHRASE_LABEL) {
            let phrase = tokens[span.clone()]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let phrase = phrase.trim();
            if !phrase.is_empty() {
                raw.insert(phrase.to_string());
            }
            covered.extend(span);
        }

        for (i, token) in tokens.iter().enumerate() {
            let word = token.text.trim();
            if !covered.contains(&i)
                && self.pos_filter.contains(&token.pos)
                && !self.stop_words.contains(word)
                && !word.is_empty()
            {
                raw.insert(word.to_string());
            }
        }

        align_all(source, raw)
    }

    /// Fitted vocabulary n-grams present in the sentence
    pub fn ngram_candidates(&self, source: &str, tokens: &[Token]) -> Result<IndexSet<String>> {
        let vectorizer = self
            .vectorizer
            .as_ref()
            .ok_or_else(|| KpxError::configuration("n-gram vectorizer is not initialized"))?;
        let grams = vectorizer.transform(&join_tokens(tokens));
        Ok(align_all(source, grams))
    }
}

fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn align_all<I: IntoIterator<Item = String>>(source: &str, raw: I) -> IndexSet<String> {
    raw.into_iter()
        .map(|candidate| to_original_expression(source, &candidate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn default_filter() -> BTreeSet<PosTag> {
        [PosTag::Noun, PosTag::Propn, PosTag::Adj, PosTag::Num]
            .into_iter()
            .collect()
    }

    fn tokens(pairs: &[(&str, PosTag)]) -> Vec<Token> {
        pairs.iter().map(|(t, p)| Token::new(*t, *p)).collect()
    }

    #[test]
    fn test_grammar_candidates_from_noun_phrases() {
        let generator = CandidateGenerator::new(
            PhrasingMode::Grammar(ChunkGrammar::default()),
            default_filter(),
            Arc::new(StopWords::empty()),
        );
        let source = "東京タワーは日本の名所";
        let toks = tokens(&[
            ("東京", PosTag::Noun),
            ("タワー", PosTag::Noun),
            ("は", PosTag::Adp),
            ("日本", PosTag::Propn),
            ("の", PosTag::Adp),
            ("名所", PosTag::Noun),
        ]);
        let candidates = generator.generate(source, &toks).unwrap();
        let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
        assert_eq!(candidates, vec!["東京タワー", "日本", "名所"]);
    }

    #[test]
    fn test_uncovered_tokens_respect_filter_and_stop_words() {
        let generator = CandidateGenerator::new(
            PhrasingMode::Grammar(ChunkGrammar::default()),
            default_filter(),
            Arc::new(StopWords::new(["3"])),
        );
        let toks = tokens(&[
            ("2024", PosTag::Num),
            ("年", PosTag::Noun),
            ("3", PosTag::Num),
            ("走る", PosTag::Verb),
            (" ", PosTag::Num),
        ]);
        let candidates = generator.generate("2024年3走る", &toks).unwrap();
        let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
        assert_eq!(candidates, vec!["年", "2024"]);
    }

    #[test]
    fn test_sentence_without_candidates_is_empty() {
        let generator = CandidateGenerator::new(
            PhrasingMode::Grammar(ChunkGrammar::default()),
            default_filter(),
            Arc::new(StopWords::empty()),
        );
        let toks = tokens(&[("ある", PosTag::Verb), ("。", PosTag::Punct)]);
        assert!(generator.generate("ある。", &toks).unwrap().is_empty());
    }

    #[test]
    fn test_ngram_candidates_after_fit() {
        let mut generator = CandidateGenerator::new(
            PhrasingMode::NGram { min: 1, max: 2 },
            default_filter(),
            Arc::new(StopWords::new(["の"])),
        );
        let first = tokens(&[("日本", PosTag::Propn), ("の", PosTag::Adp), ("首都", PosTag::Noun)]);
        let second = tokens(&[("経済", PosTag::Noun)]);
        generator.fit(&[first.clone(), second]);

        let candidates = generator.generate("日本の首都", &first).unwrap();
        let candidates: Vec<&str> = candidates.iter().map(String::as_str).collect();
        assert_eq!(candidates, vec!["日本", "日本 首都", "首都"]);
    }

    #[test]
    fn test_ngram_without_fit_is_configuration_error() {
        let generator = CandidateGenerator::new(
            PhrasingMode::NGram { min: 1, max: 1 },
            default_filter(),
            Arc::new(StopWords::empty()),
        );
        let result = generator.generate("本文", &tokens(&[("本文", PosTag::Noun)]));
        assert_matches!(result, Err(KpxError::Configuration { .. }));
    }

    #[test]
    fn test_ngram_candidates_in_grammar_mode_fail() {
        let mut generator = CandidateGenerator::new(
            PhrasingMode::Grammar(ChunkGrammar::default()),
            default_filter(),
            Arc::new(StopWords::empty()),
        );
        let toks = tokens(&[("本文", PosTag::Noun)]);
        generator.fit(&[toks.clone()]);
        assert_matches!(
            generator.ngram_candidates("本文", &toks),
            Err(KpxError::Configuration { .. })
        );
    }
}
