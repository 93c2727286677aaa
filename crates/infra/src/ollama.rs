//! Ollama embedding client implementing the core `Encoder` trait

use async_trait::async_trait;
use kpx_core::{EmbeddingModelConfig, Encoder, KpxError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Ollama client configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout: Duration::from_secs(60),
            model: "bge-m3".to_string(),
        }
    }
}

impl From<&EmbeddingModelConfig> for OllamaConfig {
    fn from(config: &EmbeddingModelConfig) -> Self {
        Self {
            base_url: config.ollama_url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            model: config.name.clone(),
        }
    }
}

/// Embedding encoder backed by an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaEncoder {
    config: OllamaConfig,
    base_url: Url,
    client: reqwest::Client,
}

impl OllamaEncoder {
    /// Create a new Ollama encoder
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KpxError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = self.endpoint("/api/tags")?;

        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint("/api/tags")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error("list models", e))?;

        if !response.status().is_success() {
            return Err(KpxError::network(format!(
                "Failed to list models: {}",
                response.status()
            )));
        }

        let models_response: ModelsResponse = response
            .json()
            .await
            .map_err(|e| KpxError::network(format!("Failed to parse models response: {}", e)))?;

        Ok(models_response.models.into_iter().map(|m| m.name).collect())
    }

    /// Check if the configured model is available
    ///
    /// Ollama lists models with a tag, so `bge-m3` matches `bge-m3:latest`.
    pub async fn model_exists(&self) -> Result<bool> {
        let models = self.list_models().await?;
        let wanted = &self.config.model;
        Ok(models
            .iter()
            .any(|m| m == wanted || m.split(':').next() == Some(wanted.as_str())))
    }
}

#[async_trait]
impl Encoder for OllamaEncoder {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: texts,
        };
        let url = self.endpoint("/api/embed")?;

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("embed", e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(KpxError::model_not_available(self.config.model.clone()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KpxError::network(format!(
                "Ollama API returned error {}: {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| KpxError::embedding(format!("Failed to parse embed response: {}", e)))?;

        debug!(
            "Ollama returned {} embeddings for {} texts",
            embed_response.embeddings.len(),
            texts.len()
        );
        Ok(embed_response.embeddings)
    }
}

fn request_error(operation: &str, error: reqwest::Error) -> KpxError {
    if error.is_timeout() {
        KpxError::timeout(format!("Ollama {}", operation))
    } else {
        KpxError::network(format!("Failed to send {} request to Ollama: {}", operation, error))
    }
}

/// Embed request payload
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Embed response payload
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Models response payload
#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn encoder(server: &mockito::ServerGuard) -> OllamaEncoder {
        OllamaEncoder::new(OllamaConfig {
            base_url: server.url(),
            timeout: Duration::from_secs(5),
            model: "bge-m3".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_ollama_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.model, "bge-m3");
    }

    #[test]
    fn test_config_from_model_config() {
        let model = EmbeddingModelConfig {
            name: "multilingual-e5".to_string(),
            timeout_seconds: 5,
            ..Default::default()
        };
        let config = OllamaConfig::from(&model);
        assert_eq!(config.model, "multilingual-e5");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = OllamaEncoder::new(OllamaConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(KpxError::Url(_))));
    }

    #[test]
    fn test_embed_request_serialization() {
        let input = vec!["東京".to_string()];
        let request = EmbedRequest {
            model: "bge-m3",
            input: &input,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"model": "bge-m3", "input": ["東京"]}));
    }

    #[tokio::test]
    async fn test_encode_posts_batch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/embed")
            .match_body(Matcher::PartialJson(
                json!({"model": "bge-m3", "input": ["東京", "首都"]}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"bge-m3","embeddings":[[0.1,0.2],[0.3,0.4]]}"#)
            .create_async()
            .await;

        let vectors = encoder(&server)
            .encode(&["東京".to_string(), "首都".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_model() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embed")
            .with_status(404)
            .with_body(r#"{"error":"model \"bge-m3\" not found, try pulling it first"}"#)
            .create_async()
            .await;

        let result = encoder(&server).encode(&["東京".to_string()]).await;
        assert!(matches!(result, Err(KpxError::ModelNotAvailable { .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embed")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = encoder(&server).encode(&["東京".to_string()]).await;
        match result {
            Err(e @ KpxError::Network { .. }) => assert!(e.is_retryable()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_embedding_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/embed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding":[0.1]}"#)
            .create_async()
            .await;

        let result = encoder(&server).encode(&["東京".to_string()]).await;
        assert!(matches!(result, Err(KpxError::Embedding { .. })));
    }

    #[tokio::test]
    async fn test_health_check_and_models() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":[{"name":"bge-m3:latest"},{"name":"llama3:8b"}]}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let encoder = encoder(&server);
        assert!(encoder.health_check().await.unwrap());
        assert_eq!(
            encoder.list_models().await.unwrap(),
            vec!["bge-m3:latest".to_string(), "llama3:8b".to_string()]
        );
        assert!(encoder.model_exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let encoder = OllamaEncoder::new(OllamaConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();
        assert!(!encoder.health_check().await.unwrap());
    }
}
