//! Configuration types for kpx

pub mod extraction;

pub use extraction::{DiversityMode, ExtractionConfig, ExtractionSettings};

use crate::embedding::{EmbeddingPrompts, DEFAULT_BATCH_SIZE};
use crate::error::{KpxError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Prefix of environment variables overriding file settings, e.g.
/// `KPX__EXTRACTION__MAX_FILTERED_PHRASES=5`
pub const ENV_PREFIX: &str = "KPX";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpxConfig {
    /// Embedding model and encoder endpoint
    #[serde(default)]
    pub embedding: EmbeddingModelConfig,
    /// Ranking options
    #[serde(default)]
    pub extraction: ExtractionSettings,
    /// Input handling and output shaping
    #[serde(default)]
    pub extractor: ExtractorSettings,
    /// Line-delimited stop-word file; the bundled Japanese list when unset
    #[serde(default)]
    pub stop_words_path: Option<PathBuf>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Embedding model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingModelConfig {
    /// Model name as known to the encoder server
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Prompt prefixes the model expects, if any
    #[serde(default)]
    pub prompts: Option<EmbeddingPrompts>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Ollama server URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for EmbeddingModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            prompts: None,
            batch_size: default_batch_size(),
            ollama_url: default_ollama_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl EmbeddingModelConfig {
    /// Parsed encoder endpoint
    pub fn url(&self) -> Result<Url> {
        Ok(Url::parse(&self.ollama_url)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KpxError::validation("Embedding model name cannot be empty"));
        }
        if self.batch_size == 0 {
            return Err(KpxError::validation("batch_size must be greater than 0"));
        }
        let url = self.url()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(KpxError::validation(
                "Ollama URL must use http or https scheme",
            ));
        }
        Ok(())
    }
}

/// How inputs are prepared and outputs shaped around the ranking engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorSettings {
    /// Split a single input text into chunks of at most this many characters
    #[serde(default)]
    pub max_characters: Option<usize>,
    /// Truncate every ranked list to this length
    #[serde(default)]
    pub top_n_phrases: Option<usize>,
    /// Merge several ranked lists into one
    #[serde(default = "default_true")]
    pub flat_output: bool,
    /// Merge by list position and rank instead of by score
    #[serde(default)]
    pub use_order: bool,
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            max_characters: None,
            top_n_phrases: None,
            flat_output: true,
            use_order: false,
            rrf_k: default_rrf_k(),
        }
    }
}

impl ExtractorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_characters == Some(0) {
            return Err(KpxError::validation("max_characters must be greater than 0"));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (json, text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl KpxConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Try YAML first, then JSON
        match serde_yaml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(_) => {
                let config = serde_json::from_str(&content)?;
                Ok(config)
            }
        }
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Layers an optional file with `KPX__`-prefixed environment variables
    ///
    /// Nested keys are separated by a double underscore, for example
    /// `KPX__EMBEDDING__NAME`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.embedding.validate()?;
        self.extractor.validate()?;
        self.extraction.validate()?;

        if let Some(path) = &self.stop_words_path {
            if !path.exists() {
                return Err(KpxError::not_found(format!(
                    "stop word file {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }

    /// Validated extraction options
    pub fn extraction_config(&self) -> Result<ExtractionConfig> {
        self.extraction.validate()
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_model_name() -> String {
    "bge-m3".to_string()
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_timeout() -> u64 {
    60
}
fn default_rrf_k() -> u32 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
