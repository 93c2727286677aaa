//! kpx Infrastructure Library
//!
//! Infrastructure components for kpx: the Ollama embedding client and
//! logging setup.

use kpx_core::{EmbeddingModelConfig, Encoder, Result};
use serde::Serialize;
use std::sync::Arc;

pub mod logger;
pub mod ollama;

pub use logger::*;
pub use ollama::*;

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the encoder described by the embedding section of the configuration
pub fn build_encoder(config: &EmbeddingModelConfig) -> Result<Arc<dyn Encoder>> {
    config.validate()?;
    let encoder = OllamaEncoder::new(OllamaConfig::from(config))?;
    tracing::info!(
        "Using embedding model {} at {}",
        config.name,
        config.ollama_url
    );
    Ok(Arc::new(encoder))
}

/// Health check for infrastructure components
pub async fn health_check(config: &EmbeddingModelConfig) -> Result<HealthStatus> {
    let encoder = OllamaEncoder::new(OllamaConfig::from(config))?;
    let mut status = HealthStatus::new();

    status.ollama_accessible = encoder.health_check().await?;
    if status.ollama_accessible {
        status.model_available = encoder.model_exists().await.unwrap_or(false);
    }

    Ok(status)
}

/// Health status for infrastructure components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub ollama_accessible: bool,
    pub model_available: bool,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_healthy(&self) -> bool {
        self.ollama_accessible && self.model_available
    }
}
