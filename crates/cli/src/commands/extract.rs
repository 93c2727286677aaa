//! Extract command implementation
//!
//! # Examples
//!
//! ```bash
//! # Rank keyphrases of a file
//! kpx extract article.txt
//!
//! # Inline text, top five, diversified with MMR
//! kpx extract --text "東京は日本の首都である。" -n 5 --diversity mmr
//!
//! # One document per line from standard input
//! cat titles.txt | kpx extract --lines --format json
//! ```

use crate::commands::{CliCommand, InputArgs};
use crate::config::CliConfig;
use crate::output::OutputFormatter;
use clap::{Args, ValueEnum};
use kpx_core::{
    DiversityMode, Encoder, KeyphraseExtractor, KpxConfig, KpxError, Outputs, Result,
    ScriptTokenizer,
};
use std::sync::Arc;
use tracing::info;

/// Diversification applied when picking keyphrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiversityArg {
    /// Plain similarity ranking
    Normal,
    /// Max-sum distance over the nearest candidates
    Maxsum,
    /// Maximal marginal relevance
    Mmr,
}

impl From<DiversityArg> for DiversityMode {
    fn from(arg: DiversityArg) -> Self {
        match arg {
            DiversityArg::Normal => DiversityMode::Normal,
            DiversityArg::Maxsum => DiversityMode::UseMaxsum,
            DiversityArg::Mmr => DiversityMode::UseMmr,
        }
    }
}

/// Extract keyphrases from text
#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Keep at most this many keyphrases per list
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Split a single input text into chunks of at most this many characters
    #[arg(long)]
    pub max_characters: Option<usize>,

    /// Diversification strategy
    #[arg(long, value_enum)]
    pub diversity: Option<DiversityArg>,

    /// Number of keyphrases selected per ranking unit
    #[arg(long)]
    pub max_phrases: Option<usize>,

    /// Rank candidates against whole chunks instead of filtered sentences
    #[arg(long)]
    pub no_sentence_filter: bool,

    /// Keep one list per document or chunk
    #[arg(long)]
    pub no_flatten: bool,

    /// Merge lists by rank position instead of by score
    #[arg(long)]
    pub use_order: bool,

    #[arg(skip)]
    pub cli: CliConfig,
}

impl CliCommand for ExtractCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.resolve_config(self.cli.load_kpx_config()?)?;
        let inputs = self.input.read().await?;

        let encoder = kpx_infra::build_encoder(&config.embedding)?;
        let outputs = self.extract_with(&config, encoder, inputs).await?;

        OutputFormatter::new(&self.cli).output_keyphrases(&outputs)
    }

    fn name(&self) -> &'static str {
        "extract"
    }

    fn validate(&self) -> Result<()> {
        if self.top_n == Some(0) {
            return Err(KpxError::validation("--top-n must be greater than 0"));
        }
        if self.input.text.is_some() && !self.input.files.is_empty() {
            return Err(KpxError::validation(
                "--text cannot be combined with input files",
            ));
        }
        Ok(())
    }
}

impl ExtractCommand {
    /// Applies command-line overrides on top of the loaded configuration
    pub fn resolve_config(&self, mut config: KpxConfig) -> Result<KpxConfig> {
        if let Some(top_n) = self.top_n {
            config.extractor.top_n_phrases = Some(top_n);
        }
        if let Some(max_characters) = self.max_characters {
            config.extractor.max_characters = Some(max_characters);
        }
        if self.no_flatten {
            config.extractor.flat_output = false;
        }
        if self.use_order {
            config.extractor.use_order = true;
        }
        if let Some(diversity) = self.diversity {
            config.extraction = config.extraction.with_diversity_mode(diversity.into());
        }
        if let Some(max_phrases) = self.max_phrases {
            config.extraction = config.extraction.with_max_filtered_phrases(max_phrases);
        }
        if self.no_sentence_filter {
            config.extraction = config.extraction.with_filter_sentences(false);
        }

        config.validate()?;
        Ok(config)
    }

    /// Runs extraction with an explicit encoder
    pub async fn extract_with(
        &self,
        config: &KpxConfig,
        encoder: Arc<dyn Encoder>,
        inputs: kpx_core::Inputs,
    ) -> Result<Outputs> {
        if inputs.is_empty() {
            return Err(KpxError::validation("No input text to extract from"));
        }

        let extractor =
            KeyphraseExtractor::from_config(config, encoder, Arc::new(ScriptTokenizer::new()))?;
        let outputs = extractor.extract(inputs).await?;

        info!(
            "Extracted {} keyphrases in {} lists",
            outputs.flat().count(),
            outputs.len()
        );
        Ok(outputs)
    }
}
