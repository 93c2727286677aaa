//! kpx Core Library
//!
//! Embedding-based keyphrase extraction for Japanese text. Inputs are
//! normalized and chunked, chunks are split into sentences, candidate phrases
//! are formed with a part-of-speech chunk grammar or word n-grams, and
//! candidates are ranked by the similarity of their embeddings to the
//! embedding of their sentence or chunk.
//!
//! The embedding model and the morphological analyzer are collaborators
//! plugged in through the [`Encoder`] and [`Tokenizer`] traits.

pub mod aggregate;
pub mod candidates;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod ranking;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use aggregate::{dedup_and_sort, flatten_by_rrf, flatten_by_score, Aggregation};
pub use candidates::{
    CandidateGenerator, ChunkGrammar, PhrasingMode, PosTag, ScriptTokenizer, StopWords, Token,
    Tokenizer,
};
pub use config::{
    DiversityMode, EmbeddingModelConfig, ExtractionConfig, ExtractionSettings, ExtractorSettings,
    KpxConfig, LoggingConfig,
};
pub use embedding::{EmbeddingPrompts, EmbeddingSession, Encoder, PromptRole};
pub use error::{ErrorCategory, KpxError, Result};
pub use extractor::KeyphraseExtractor;
pub use ranking::{
    select, EmbeddingTarget, FusionPolicy, RankingEngine, ScoreMetric, SelectionError,
    SelectionStrategy,
};
pub use text::{chunk, to_original_expression, SentenceSplitter, TextPreprocessor};
pub use types::{Inputs, Keyphrase, Outputs, ScoreOrder};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _: Result<()> = Ok(());
        let _ = Keyphrase::new("東京", 0.5);
        let _ = ExtractionSettings::default();
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.contains("kpx-core"));
        assert!(info.contains("v"));
    }
}
