//! kpx CLI Library
//!
//! Command-line interface components for kpx keyphrase extraction.

use kpx_core::{KpxError, Result};

pub mod commands;
pub mod config;
pub mod output;

pub use commands::*;
pub use config::*;
pub use output::*;

/// CLI version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the CLI environment
pub fn init() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("kpx encountered an error: {}", info);
    }));

    Ok(())
}

/// Check if running in CI environment
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Get the appropriate exit code for an error
pub fn exit_code_for_error(error: &KpxError) -> u8 {
    match error {
        KpxError::Validation { .. } | KpxError::Config(_) => 2,
        KpxError::NotFound { .. } => 3,
        KpxError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => 3,
        KpxError::Network { .. } | KpxError::Timeout { .. } => 5,
        KpxError::Embedding { .. } | KpxError::ModelNotAvailable { .. } => 6,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for_error(&KpxError::validation("test")), 2);
        assert_eq!(exit_code_for_error(&KpxError::not_found("test")), 3);
        assert_eq!(exit_code_for_error(&KpxError::timeout("embed")), 5);
        assert_eq!(
            exit_code_for_error(&KpxError::model_not_available("bge-m3")),
            6
        );
        assert_eq!(exit_code_for_error(&KpxError::tokenizer("bad")), 1);
    }

    #[test]
    fn test_missing_file_exit_code() {
        let err = KpxError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(exit_code_for_error(&err), 3);
    }
}
