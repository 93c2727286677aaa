//! Validate command implementation

use crate::commands::CliCommand;
use crate::config::CliConfig;
use crate::output::OutputFormatter;
use clap::Args;
use kpx_core::{KpxConfig, KpxError, Result};
use kpx_infra::HealthStatus;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Validate a kpx configuration file
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Configuration file; defaults to the global --config
    pub config: Option<PathBuf>,

    /// Also check that the embedding server and model are reachable
    #[arg(long)]
    pub check_server: bool,

    #[arg(skip)]
    pub cli: CliConfig,
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<HealthStatus>,
}

impl CliCommand for ValidateCommand {
    async fn execute(&self) -> Result<()> {
        let path = self.target()?;
        if !path.exists() {
            return Err(KpxError::not_found(format!(
                "configuration file {}",
                path.display()
            )));
        }

        let (mut report, outcome) = match self.check_file(path) {
            Ok((report, config)) => (report, Ok(config)),
            Err(e) => (
                ValidationReport {
                    path: path.display().to_string(),
                    error: Some(e.to_string()),
                    ..Default::default()
                },
                Err(e),
            ),
        };

        let mut server_error = None;
        if let (true, Ok(config)) = (self.check_server, &outcome) {
            let status = kpx_infra::health_check(&config.embedding).await?;
            if !status.ollama_accessible {
                report.valid = false;
                let message = format!("Ollama is not reachable at {}", config.embedding.ollama_url);
                report.error = Some(message.clone());
                server_error = Some(KpxError::network(message));
            } else if !status.model_available {
                report.warnings.push(format!(
                    "Model {} is not pulled on the server",
                    config.embedding.name
                ));
            }
            report.server = Some(status);
        }

        let mut formatter = OutputFormatter::new(&self.cli);
        if formatter.format() == crate::config::OutputFormat::Pretty {
            for warning in &report.warnings {
                formatter.warning(warning)?;
            }
            match &report.error {
                Some(error) => formatter.error(&format!("Configuration is invalid: {}", error))?,
                None => formatter.success(&format!("Configuration {} is valid", report.path))?,
            }
        } else {
            formatter.output(&report)?;
        }

        outcome?;
        match server_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "validate"
    }

    fn validate(&self) -> Result<()> {
        self.target().map(|_| ())
    }
}

impl ValidateCommand {
    fn target(&self) -> Result<&Path> {
        self.config
            .as_deref()
            .or_else(|| self.cli.config_path())
            .ok_or_else(|| KpxError::validation("No configuration file given"))
    }

    /// Loads and validates `path`, collecting non-fatal findings
    pub fn check_file(&self, path: &Path) -> Result<(ValidationReport, KpxConfig)> {
        let config = KpxConfig::from_file(path)?;
        config.validate()?;

        let mut warnings = Vec::new();
        if !kpx_infra::LogLevel::is_valid(&config.logging.level) {
            warnings.push(format!(
                "Unknown log level '{}', expected one of {}",
                config.logging.level,
                kpx_infra::LogLevel::all_levels().join(", ")
            ));
        }
        if !["json", "text"].contains(&config.logging.format.to_lowercase().as_str()) {
            warnings.push(format!(
                "Unknown log format '{}', falling back to text",
                config.logging.format
            ));
        }

        let report = ValidationReport {
            valid: true,
            path: path.display().to_string(),
            model: Some(config.embedding.name.clone()),
            ollama_url: Some(config.embedding.ollama_url.clone()),
            warnings,
            ..Default::default()
        };
        Ok((report, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command(config: Option<PathBuf>) -> ValidateCommand {
        ValidateCommand {
            config,
            check_server: false,
            cli: CliConfig::default(),
        }
    }

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("kpx.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_valid_config_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "embedding:\n  name: bge-m3\n");

        let (report, config) = command(None).check_file(&path).unwrap();
        assert!(report.valid);
        assert_eq!(report.model.as_deref(), Some("bge-m3"));
        assert!(report.warnings.is_empty());
        assert_eq!(config.embedding.name, "bge-m3");
    }

    #[test]
    fn test_logging_warnings() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "logging:\n  level: loud\n  format: xml\n");

        let (report, _) = command(None).check_file(&path).unwrap();
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(
            &temp_dir,
            "extraction:\n  use_masked_distance: true\n  add_source_text: true\n",
        );
        assert!(matches!(
            command(None).check_file(&path),
            Err(KpxError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_execute_reports_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "embedding:\n  batch_size: 0\n");

        let result = command(Some(path)).execute().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = command(Some(PathBuf::from("/nonexistent/kpx.yaml")))
            .execute()
            .await;
        assert!(matches!(result, Err(KpxError::NotFound { .. })));
    }

    #[test]
    fn test_target_falls_back_to_global_config() {
        assert!(command(None).validate().is_err());

        let cmd = ValidateCommand {
            cli: CliConfig {
                config_path: Some(PathBuf::from("global.yaml")),
                ..Default::default()
            },
            ..command(None)
        };
        assert!(cmd.validate().is_ok());
    }
}
