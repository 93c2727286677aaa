//! High-level keyphrase extraction over raw inputs
//!
//! [`KeyphraseExtractor`] normalizes and chunks inputs, runs the
//! [`RankingEngine`] and shapes the ranked lists into [`Outputs`].

use crate::aggregate::Aggregation;
use crate::candidates::{StopWords, Tokenizer};
use crate::config::{ExtractorSettings, KpxConfig};
use crate::embedding::{EmbeddingSession, Encoder};
use crate::error::Result;
use crate::ranking::RankingEngine;
use crate::text::{chunk, TextPreprocessor};
use crate::types::{Inputs, Outputs};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Extracts keyphrases from texts or document lists
///
/// # Examples
///
/// ```no_run
/// use kpx_core::{Inputs, KeyphraseExtractor, KpxConfig, ScriptTokenizer};
/// # use kpx_core::Encoder;
/// # use std::sync::Arc;
///
/// # async fn example(encoder: Arc<dyn Encoder>) -> kpx_core::Result<()> {
/// let extractor = KeyphraseExtractor::from_config(
///     &KpxConfig::default(),
///     encoder,
///     Arc::new(ScriptTokenizer::new()),
/// )?;
///
/// let outputs = extractor
///     .extract(Inputs::from("東京は日本の首都である。経済の中心でもある。"))
///     .await?;
/// for keyphrase in outputs.first() {
///     println!("{}", keyphrase);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct KeyphraseExtractor {
    engine: RankingEngine,
    preprocessor: TextPreprocessor,
    settings: ExtractorSettings,
}

impl KeyphraseExtractor {
    /// Creates an extractor around a configured engine
    pub fn new(engine: RankingEngine, settings: ExtractorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            engine,
            preprocessor: TextPreprocessor::new(false),
            settings,
        })
    }

    /// Builds the engine and extractor described by `config`
    ///
    /// Stop words come from `stop_words_path` when set, otherwise from the
    /// bundled Japanese list.
    pub fn from_config(
        config: &KpxConfig,
        encoder: Arc<dyn Encoder>,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Self> {
        let extraction = config.extraction_config()?;
        let stop_words = match &config.stop_words_path {
            Some(path) => StopWords::from_file(path)?,
            None => StopWords::japanese(),
        };
        let session = EmbeddingSession::new(encoder)
            .with_prompts(config.embedding.prompts.clone())
            .with_batch_size(config.embedding.batch_size);

        let engine = RankingEngine::new(session, tokenizer, Arc::new(stop_words), extraction);
        Self::new(engine, config.extractor.clone())
    }

    /// Replaces the default (non-strict) preprocessor
    pub fn with_preprocessor(mut self, preprocessor: TextPreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    /// Normalized documents the engine will see for `inputs`
    pub fn prepare(&self, inputs: &Inputs) -> Vec<String> {
        match inputs {
            Inputs::Text(text) => {
                let text = self.preprocessor.run(text);
                match self.settings.max_characters {
                    Some(max_characters) => chunk(&text, max_characters),
                    None => vec![text],
                }
            }
            Inputs::Documents(docs) => docs.iter().map(|d| self.preprocessor.run(d)).collect(),
        }
    }

    /// How several ranked lists are merged when output is flattened
    pub fn aggregation(&self) -> Aggregation {
        if self.settings.use_order {
            Aggregation::Rrf {
                k: self.settings.rrf_k,
            }
        } else {
            Aggregation::ScoreSort {
                order: self.engine.config().score_order(),
            }
        }
    }

    /// Extracts keyphrases
    ///
    /// Each ranked list is truncated to `top_n_phrases`. With `flat_output`
    /// and more than one list, the lists are merged into a single one.
    ///
    /// # Errors
    ///
    /// Propagates tokenizer and encoder errors from the engine.
    #[instrument(skip(self, inputs))]
    pub async fn extract(&self, inputs: Inputs) -> Result<Outputs> {
        let docs = self.prepare(&inputs);
        debug!("Prepared {} documents", docs.len());

        let mut lists = self.engine.extract_keyphrases(&docs).await?;
        if let Some(top_n) = self.settings.top_n_phrases {
            lists.iter_mut().for_each(|list| list.truncate(top_n));
        }

        if self.settings.flat_output && lists.len() > 1 {
            let aggregation = self.aggregation();
            info!("Flattening {} keyphrase lists with {:?}", lists.len(), aggregation);
            lists = vec![aggregation.apply(&lists)];
        }

        Ok(Outputs::new(lists))
    }
}
