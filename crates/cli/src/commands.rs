//! CLI commands module

use anyhow::Context;
use clap::Args;
use kpx_core::{Inputs, KpxError, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

pub mod chunk;
pub mod extract;
pub mod init;
pub mod validate;

pub use chunk::*;
pub use extract::*;
pub use init::*;
pub use validate::*;

/// Base trait for CLI commands
#[allow(async_fn_in_trait)]
pub trait CliCommand {
    /// Execute the command
    async fn execute(&self) -> Result<()>;

    /// Get command name for logging
    fn name(&self) -> &'static str;

    /// Validate command arguments
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Common command execution wrapper
pub async fn execute_command<T: CliCommand>(command: T) -> Result<()> {
    tracing::info!("Executing command: {}", command.name());

    command.validate()?;
    command.execute().await?;

    tracing::info!("Command {} completed successfully", command.name());
    Ok(())
}

/// Where a command reads its text from
///
/// `--text` wins over files; with neither, standard input is read.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Input files; several files are ranked as separate documents
    pub files: Vec<PathBuf>,

    /// Inline text to process
    #[arg(short, long)]
    pub text: Option<String>,

    /// Treat every non-empty line as a separate document
    #[arg(long)]
    pub lines: bool,
}

impl InputArgs {
    /// Reads the inputs
    pub async fn read(&self) -> Result<Inputs> {
        let texts = if let Some(text) = &self.text {
            vec![text.clone()]
        } else if !self.files.is_empty() {
            let mut texts = Vec::with_capacity(self.files.len());
            for path in &self.files {
                if !path.exists() {
                    return Err(KpxError::not_found(format!(
                        "input file {}",
                        path.display()
                    )));
                }
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read input file {}", path.display()))?;
                texts.push(text);
            }
            texts
        } else {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read standard input")?;
            vec![text]
        };

        Ok(self.shape(texts))
    }

    fn shape(&self, mut texts: Vec<String>) -> Inputs {
        if self.lines {
            let lines = texts
                .iter()
                .flat_map(|text| text.lines())
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect();
            return Inputs::Documents(lines);
        }

        match texts.len() {
            1 => Inputs::Text(texts.remove(0)),
            _ => Inputs::Documents(texts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct TestCommand;

    impl CliCommand for TestCommand {
        async fn execute(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "test"
        }
    }

    struct InvalidCommand;

    impl CliCommand for InvalidCommand {
        async fn execute(&self) -> Result<()> {
            panic!("execute must not run after failed validation");
        }

        fn name(&self) -> &'static str {
            "invalid"
        }

        fn validate(&self) -> Result<()> {
            Err(KpxError::validation("bad arguments"))
        }
    }

    #[tokio::test]
    async fn test_execute_command() {
        assert!(execute_command(TestCommand).await.is_ok());
        assert!(execute_command(InvalidCommand).await.is_err());
    }

    #[tokio::test]
    async fn test_inline_text_is_single_text() {
        let args = InputArgs {
            text: Some("東京は日本の首都である。".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.read().await.unwrap(),
            Inputs::Text("東京は日本の首都である。".to_string())
        );
    }

    #[tokio::test]
    async fn test_several_files_are_documents() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.txt");
        let second = temp_dir.path().join("b.txt");
        std::fs::write(&first, "東京").unwrap();
        std::fs::write(&second, "大阪").unwrap();

        let args = InputArgs {
            files: vec![first, second],
            ..Default::default()
        };
        assert_eq!(
            args.read().await.unwrap(),
            Inputs::Documents(vec!["東京".to_string(), "大阪".to_string()])
        );
    }

    #[tokio::test]
    async fn test_lines_become_documents() {
        let args = InputArgs {
            text: Some("東京\n\n大阪\n".to_string()),
            lines: true,
            ..Default::default()
        };
        assert_eq!(
            args.read().await.unwrap(),
            Inputs::Documents(vec!["東京".to_string(), "大阪".to_string()])
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let args = InputArgs {
            files: vec![PathBuf::from("/nonexistent/kpx-input.txt")],
            ..Default::default()
        };
        assert!(matches!(
            args.read().await,
            Err(KpxError::NotFound { .. })
        ));
    }
}
