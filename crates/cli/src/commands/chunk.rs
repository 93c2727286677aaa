//! Chunk command implementation
//!
//! Shows how input text is normalized, chunked and split into sentences
//! before any embedding happens.
//!
//! # Examples
//!
//! ```bash
//! kpx chunk article.txt --max-characters 400
//! kpx chunk --text "はい。そうです。東京は日本の首都である。" --format json
//! ```

use crate::commands::{CliCommand, InputArgs};
use crate::config::CliConfig;
use crate::output::OutputFormatter;
use clap::Args;
use kpx_core::{chunk, Inputs, KpxError, Result, SentenceSplitter, TextPreprocessor};
use serde::Serialize;
use tracing::debug;

/// Preview text preparation
#[derive(Debug, Args)]
pub struct ChunkCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Chunk size in characters; falls back to the configured value
    #[arg(long)]
    pub max_characters: Option<usize>,

    /// Minimum sentence length; falls back to the configured value
    #[arg(long)]
    pub minimum_characters: Option<usize>,

    /// Lowercase and strip all whitespace as well
    #[arg(long)]
    pub strong: bool,

    #[arg(skip)]
    pub cli: CliConfig,
}

/// One prepared chunk and its sentences
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    pub characters: usize,
    pub text: String,
    pub sentences: Vec<String>,
}

impl CliCommand for ChunkCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.cli.load_kpx_config()?;
        let max_characters = self.max_characters.or(config.extractor.max_characters);
        let minimum_characters = self
            .minimum_characters
            .unwrap_or(config.extraction.minimum_characters);

        let inputs = self.input.read().await?;
        let reports = self.preview(&inputs, max_characters, minimum_characters);
        debug!("Prepared {} chunks", reports.len());

        OutputFormatter::new(&self.cli).output(&reports)
    }

    fn name(&self) -> &'static str {
        "chunk"
    }

    fn validate(&self) -> Result<()> {
        if self.max_characters == Some(0) {
            return Err(KpxError::validation(
                "--max-characters must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl ChunkCommand {
    /// Prepares `inputs` the way the extractor does and splits every chunk
    pub fn preview(
        &self,
        inputs: &Inputs,
        max_characters: Option<usize>,
        minimum_characters: usize,
    ) -> Vec<ChunkReport> {
        let preprocessor = TextPreprocessor::new(self.strong);
        let splitter = SentenceSplitter::new(minimum_characters);

        let chunks = match inputs {
            Inputs::Text(text) => {
                let text = preprocessor.run(text);
                match max_characters {
                    Some(max_characters) => chunk(&text, max_characters),
                    None => vec![text],
                }
            }
            Inputs::Documents(docs) => docs.iter().map(|d| preprocessor.run(d)).collect(),
        };

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, text)| ChunkReport {
                index,
                characters: text.chars().count(),
                sentences: splitter.split(&text),
                text,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(strong: bool) -> ChunkCommand {
        ChunkCommand {
            input: InputArgs::default(),
            max_characters: None,
            minimum_characters: None,
            strong,
            cli: CliConfig::default(),
        }
    }

    #[test]
    fn test_preview_chunks_and_splits() {
        let reports = command(false).preview(&Inputs::from("今日は晴れ。明日は雨。"), Some(7), 1);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].text, "今日は晴れ。");
        assert_eq!(reports[0].characters, 6);
        assert_eq!(reports[1].index, 1);
        assert_eq!(reports[1].sentences, vec!["明日は雨。".to_string()]);
    }

    #[test]
    fn test_preview_merges_short_sentences() {
        let reports = command(false).preview(
            &Inputs::from("はい。そうです。東京は日本の首都である。"),
            None,
            10,
        );

        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].sentences,
            vec!["はい。\nそうです。\n東京は日本の首都である。".to_string()]
        );
    }

    #[test]
    fn test_preview_documents_are_normalized_not_chunked() {
        let reports = command(true).preview(
            &Inputs::from(vec!["Tokyo Tower", "ＡＢＣ"]),
            Some(2),
            1,
        );

        let texts: Vec<&str> = reports.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["tokyotower", "abc"]);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let cmd = ChunkCommand {
            max_characters: Some(0),
            ..command(false)
        };
        assert!(cmd.validate().is_err());
    }
}
