//! Logging infrastructure for kpx
//!
//! This module provides centralized logging configuration and utilities
//! using the tracing ecosystem.

use kpx_core::{KpxError, LoggingConfig, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Dependencies whose logs are capped at `warn`
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "reqwest=warn", "h2=warn"];

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to use JSON format
    pub json_format: bool,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include file/line information
    pub with_file_info: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamps: true,
            with_file_info: false,
        }
    }
}

impl From<&LoggingConfig> for LoggerConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            json_format: config.format.eq_ignore_ascii_case("json"),
            ..Default::default()
        }
    }
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> Result<()> {
    let level = LogLevel::parse(&config.level)?;

    let mut env_filter = EnvFilter::from_default_env().add_directive(level.into());
    for target in QUIET_TARGETS {
        let directive = target
            .parse::<Directive>()
            .map_err(|e| KpxError::validation(format!("Invalid log directive '{}': {}", target, e)))?;
        env_filter = env_filter.add_directive(directive);
    }

    let fmt_layer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        let layer = fmt::layer()
            .with_target(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .with_writer(std::io::stderr);

        if config.with_timestamps {
            layer.boxed()
        } else {
            layer.without_time().boxed()
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| KpxError::configuration(format!("Failed to initialize logger: {}", e)))?;

    tracing::debug!("Logger initialized with level: {}", config.level);
    Ok(())
}

/// Initialize logger with default configuration
pub fn init_default_logger() -> Result<()> {
    init_logger(LoggerConfig::default())
}

/// Initialize logger for testing (reduces noise)
pub fn init_test_logger() -> Result<()> {
    let config = LoggerConfig {
        level: "warn".to_string(),
        json_format: false,
        with_timestamps: false,
        with_file_info: false,
    };

    // Ignore errors if already initialized
    let _ = init_logger(config);
    Ok(())
}

/// Create a logger configuration from environment variables
///
/// Reads `KPX_LOG_LEVEL`, `KPX_LOG_JSON`, `KPX_LOG_TIMESTAMPS` and
/// `KPX_LOG_FILE_INFO`; unset or unparsable values keep the defaults.
pub fn logger_config_from_env() -> LoggerConfig {
    let defaults = LoggerConfig::default();
    LoggerConfig {
        level: std::env::var("KPX_LOG_LEVEL").unwrap_or(defaults.level),
        json_format: env_flag("KPX_LOG_JSON", defaults.json_format),
        with_timestamps: env_flag("KPX_LOG_TIMESTAMPS", defaults.with_timestamps),
        with_file_info: env_flag("KPX_LOG_FILE_INFO", defaults.with_file_info),
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v.parse().unwrap_or(default))
        .unwrap_or(default)
}

/// Log level utilities
pub struct LogLevel;

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level: &str) -> Result<Level> {
        Level::from_str(level)
            .map_err(|e| KpxError::validation(format!("Invalid log level '{}': {}", level, e)))
    }

    /// Get all available log levels
    pub fn all_levels() -> Vec<&'static str> {
        vec!["trace", "debug", "info", "warn", "error"]
    }

    /// Check if a log level string is valid
    pub fn is_valid(level: &str) -> bool {
        Self::all_levels().contains(&level.to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_config_default() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
        assert!(config.with_timestamps);
        assert!(!config.with_file_info);
    }

    #[test]
    fn test_logger_config_from_logging_section() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "JSON".to_string(),
        };
        let config = LoggerConfig::from(&logging);
        assert_eq!(config.level, "debug");
        assert!(config.json_format);
        assert!(config.with_timestamps);
    }

    #[test]
    fn test_log_level_parse() {
        assert!(LogLevel::parse("info").is_ok());
        assert!(LogLevel::parse("debug").is_ok());
        assert!(LogLevel::parse("invalid").is_err());
    }

    #[test]
    fn test_log_level_validation() {
        assert!(LogLevel::is_valid("info"));
        assert!(LogLevel::is_valid("ERROR"));
        assert!(!LogLevel::is_valid("invalid"));
    }

    #[test]
    fn test_logger_config_from_env() {
        std::env::set_var("KPX_LOG_LEVEL", "debug");
        std::env::set_var("KPX_LOG_JSON", "true");
        std::env::set_var("KPX_LOG_TIMESTAMPS", "not-a-bool");

        let config = logger_config_from_env();
        assert_eq!(config.level, "debug");
        assert!(config.json_format);
        assert!(config.with_timestamps);

        // Clean up
        std::env::remove_var("KPX_LOG_LEVEL");
        std::env::remove_var("KPX_LOG_JSON");
        std::env::remove_var("KPX_LOG_TIMESTAMPS");
    }

    #[tokio::test]
    async fn test_init_test_logger() {
        // Should not panic even if called multiple times
        assert!(init_test_logger().is_ok());
        assert!(init_test_logger().is_ok());
    }
}
