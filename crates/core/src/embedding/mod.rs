//! Text embedding: the encoder collaborator and the session that owns it
//!
//! An [`Encoder`] turns texts into vectors. The [`EmbeddingSession`] is built
//! once around an encoder (the expensive model load happens there) and is then
//! used for every extraction call. It prepends encoder-specific prompts,
//! batches requests and checks what the encoder returns.

pub mod similarity;

use crate::error::{KpxError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Batch size used when none is configured
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Produces one embedding vector per input text
///
/// Errors are collaborator errors: the extraction call that triggered them
/// fails as a whole.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Name of the underlying model, for logging
    fn model_name(&self) -> &str;

    /// Embeds `texts`, returning vectors in input order
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Role of a text in an asymmetric retrieval model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// Texts being searched: documents and anchor sentences
    Passage,
    /// Texts searched for: candidate sentences and phrases
    Query,
}

/// Prefixes some encoders expect in front of passages and queries
///
/// For example E5-style models use `passage: ` and `query: `.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingPrompts {
    pub passage: String,
    pub query: String,
}

impl EmbeddingPrompts {
    pub fn new<P: Into<String>, Q: Into<String>>(passage: P, query: Q) -> Self {
        Self {
            passage: passage.into(),
            query: query.into(),
        }
    }

    pub fn prefix(&self, role: PromptRole) -> &str {
        match role {
            PromptRole::Passage => &self.passage,
            PromptRole::Query => &self.query,
        }
    }
}

/// Owns an encoder together with its prompts and batching policy
#[derive(Clone)]
pub struct EmbeddingSession {
    encoder: Arc<dyn Encoder>,
    prompts: Option<EmbeddingPrompts>,
    batch_size: usize,
}

impl std::fmt::Debug for EmbeddingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingSession")
            .field("model", &self.encoder.model_name())
            .field("prompts", &self.prompts)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl EmbeddingSession {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            prompts: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_prompts(mut self, prompts: Option<EmbeddingPrompts>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sets the batch size; zero is treated as one
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        self.encoder.model_name()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn prompts(&self) -> Option<&EmbeddingPrompts> {
        self.prompts.as_ref()
    }

    /// Embeds `texts` in batches, prefixing the prompt for `role` if configured
    ///
    /// # Errors
    ///
    /// Propagates encoder errors, and returns `KpxError::Embedding` when the
    /// encoder returns the wrong number of vectors or vectors of differing
    /// dimensions.
    pub async fn encode(&self, texts: &[String], role: Option<PromptRole>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prefix = match (role, &self.prompts) {
            (Some(role), Some(prompts)) => prompts.prefix(role),
            _ => "",
        };
        let prepared: Vec<String> = texts
            .iter()
            .map(|text| format!("{}{}", prefix, text))
            .collect();

        let mut embeddings = Vec::with_capacity(prepared.len());
        let mut dimension: Option<usize> = None;

        for batch in prepared.chunks(self.batch_size) {
            let vectors = self.encoder.encode(batch).await?;
            if vectors.len() != batch.len() {
                return Err(KpxError::embedding(format!(
                    "Encoder {} returned {} vectors for {} texts",
                    self.model_name(),
                    vectors.len(),
                    batch.len()
                )));
            }

            for vector in vectors {
                match dimension {
                    Some(expected) if vector.len() != expected => {
                        return Err(KpxError::embedding(format!(
                            "Embedding dimension mismatch: expected {}, got {}",
                            expected,
                            vector.len()
                        )));
                    }
                    Some(_) => {}
                    None => dimension = Some(vector.len()),
                }
                embeddings.push(vector);
            }
        }

        debug!(
            "Encoded {} texts with {} (dimension {})",
            embeddings.len(),
            self.model_name(),
            dimension.unwrap_or(0)
        );

        Ok(embeddings)
    }

    /// Embeds a single text
    pub async fn encode_one(&self, text: &str, role: Option<PromptRole>) -> Result<Vec<f32>> {
        self.encode(&[text.to_string()], role)
            .await?
            .pop()
            .ok_or_else(|| KpxError::embedding("Encoder returned no vector"))
    }
}
