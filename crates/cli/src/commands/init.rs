//! Init command implementation

use crate::commands::CliCommand;
use crate::config::CliConfig;
use crate::output::OutputFormatter;
use clap::Args;
use kpx_core::{KpxConfig, KpxError, Result};
use std::path::PathBuf;

/// Write a default kpx configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Configuration file to create
    #[arg(default_value = "kpx.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,

    #[arg(skip)]
    pub cli: CliConfig,
}

impl CliCommand for InitCommand {
    async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            return Err(KpxError::validation(format!(
                "Configuration already exists at {}. Use --force to overwrite.",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(KpxError::not_found(format!(
                    "directory {}",
                    parent.display()
                )));
            }
        }

        KpxConfig::default().to_file(&self.path)?;
        tracing::info!("Wrote default configuration to {}", self.path.display());

        let mut formatter = OutputFormatter::new(&self.cli);
        formatter.success(&format!(
            "Configuration written to {}",
            self.path.display()
        ))?;
        formatter.message(&format!(
            "Run 'kpx validate {}' after editing it",
            self.path.display()
        ))
    }

    fn name(&self) -> &'static str {
        "init"
    }

    fn validate(&self) -> Result<()> {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(()),
            _ => Err(KpxError::validation(format!(
                "Configuration file must have a .yaml or .yml extension: {}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn command(path: PathBuf, force: bool) -> InitCommand {
        InitCommand {
            path,
            force,
            cli: CliConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_init_writes_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kpx.yaml");

        command(path.clone(), false).execute().await.unwrap();

        let written = KpxConfig::from_file(&path).unwrap();
        assert_eq!(written, KpxConfig::default());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kpx.yaml");
        std::fs::write(&path, "embedding:\n  name: custom\n").unwrap();

        let result = command(path.clone(), false).execute().await;
        assert!(matches!(result, Err(KpxError::Validation { .. })));

        command(path.clone(), true).execute().await.unwrap();
        assert_eq!(KpxConfig::from_file(&path).unwrap(), KpxConfig::default());
    }

    #[tokio::test]
    async fn test_init_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("kpx.yaml");

        let result = command(path, false).execute().await;
        assert!(matches!(result, Err(KpxError::NotFound { .. })));
    }

    #[test]
    fn test_extension_validation() {
        assert!(command(PathBuf::from("kpx.yml"), false).validate().is_ok());
        assert!(command(PathBuf::from("kpx.toml"), false).validate().is_err());
    }
}
