//! Error handling for the kpx core library

use std::fmt;
use thiserror::Error;

/// Result type alias for kpx operations
pub type Result<T> = std::result::Result<T, KpxError>;

/// Main error type for kpx operations
#[derive(Error, Debug)]
pub enum KpxError {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Layered configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),

    /// Invalid combination of extraction settings
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A pipeline stage was used in a mode it was not set up for
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Encoder backend errors
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Tokenizer backend errors
    #[error("Tokenizer error: {message}")]
    Tokenizer { message: String },

    /// Network connectivity errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Model not available error
    #[error("Model '{model}' is not available")]
    ModelNotAvailable { model: String },

    /// Timeout errors
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Resource not found errors
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },
}

impl KpxError {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a tokenizer error
    pub fn tokenizer<S: Into<String>>(message: S) -> Self {
        Self::Tokenizer {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a model not available error
    pub fn model_not_available<S: Into<String>>(model: S) -> Self {
        Self::ModelNotAvailable {
            model: model.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::FileSystem,
            Self::Json(_) | Self::Yaml(_) => ErrorCategory::Serialization,
            Self::Config(_) | Self::Configuration { .. } | Self::Url(_) => {
                ErrorCategory::Configuration
            }
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Embedding { .. } | Self::ModelNotAvailable { .. } => ErrorCategory::Embedding,
            Self::Tokenizer { .. } => ErrorCategory::Tokenizer,
            Self::Network { .. } => ErrorCategory::Network,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Generic(_) => ErrorCategory::Generic,
        }
    }
}

/// Error categories for logging
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    FileSystem,
    Serialization,
    Configuration,
    Validation,
    Embedding,
    Tokenizer,
    Network,
    Timeout,
    NotFound,
    Generic,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileSystem => write!(f, "filesystem"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
            Self::Validation => write!(f, "validation"),
            Self::Embedding => write!(f, "embedding"),
            Self::Tokenizer => write!(f, "tokenizer"),
            Self::Network => write!(f, "network"),
            Self::Timeout => write!(f, "timeout"),
            Self::NotFound => write!(f, "not_found"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = KpxError::validation("nr_candidates too small");
        assert!(matches!(err, KpxError::Validation { .. }));
        assert_eq!(err.to_string(), "Validation error: nr_candidates too small");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            KpxError::embedding("test").category(),
            ErrorCategory::Embedding
        );
        assert_eq!(
            KpxError::configuration("test").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(KpxError::network("test").category(), ErrorCategory::Network);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(KpxError::network("test").is_retryable());
        assert!(KpxError::timeout("test").is_retryable());
        assert!(!KpxError::validation("test").is_retryable());
        assert!(!KpxError::tokenizer("test").is_retryable());
        assert!(!KpxError::embedding("test").is_retryable());
    }

    #[test]
    fn test_error_from_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KpxError = io_err.into();
        assert!(matches!(err, KpxError::Io(_)));

        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: KpxError = json_err.into();
        assert!(matches!(err, KpxError::Json(_)));
    }

    #[test]
    fn test_error_display() {
        let err = KpxError::model_not_available("multilingual-e5");
        assert_eq!(err.to_string(), "Model 'multilingual-e5' is not available");

        let err = KpxError::timeout("embedding");
        assert_eq!(err.to_string(), "Operation timed out: embedding");
    }
}
