//! CLI configuration module

use kpx_core::{KpxConfig, KpxError, Result};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// CLI-specific configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default output format
    pub default_output_format: OutputFormat,
    /// Default log level
    pub default_log_level: LogLevel,
    /// Whether to use colors in output
    pub use_colors: bool,
    /// Configuration file passed with `--config`
    pub config_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_output_format: OutputFormat::Pretty,
            default_log_level: LogLevel::Info,
            use_colors: true,
            config_path: None,
        }
    }
}

impl CliConfig {
    /// Merge CLI arguments with configuration
    pub fn merge_with_args(&mut self, args: &CliArgs) -> Result<()> {
        if let Some(output_format) = &args.output_format {
            self.default_output_format = output_format.parse()?;
        }

        if let Some(log_level) = &args.log_level {
            self.default_log_level = log_level.parse()?;
        }

        if let Some(use_colors) = args.use_colors {
            self.use_colors = use_colors;
        }

        if let Some(config_file) = &args.config_file {
            self.config_path = Some(config_file.clone());
        }

        Ok(())
    }

    /// Loads the extraction configuration
    ///
    /// The `--config` file, when given, is layered under `KPX__` environment
    /// variables; without one only the environment overrides the defaults.
    pub fn load_kpx_config(&self) -> Result<KpxConfig> {
        let config = KpxConfig::load(self.config_path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    Pretty,
    Compact,
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
            Self::Table => write!(f, "table"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = KpxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "table" => Ok(Self::Table),
            _ => Err(KpxError::validation(format!(
                "Invalid output format: {}",
                s
            ))),
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = KpxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(KpxError::validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// CLI arguments that can override configuration
#[derive(Debug, Default)]
pub struct CliArgs {
    pub output_format: Option<String>,
    pub log_level: Option<String>,
    pub use_colors: Option<bool>,
    pub config_file: Option<PathBuf>,
}

/// Check if output supports colors
pub fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    std::io::stdout().is_terminal()
}
