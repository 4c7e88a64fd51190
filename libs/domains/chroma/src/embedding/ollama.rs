use async_trait::async_trait;
use core_config::env_or_default;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingProvider, send_json};
use crate::error::ChromaResult;
use crate::models::Embedding;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "all-minilm";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl OllamaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn from_env() -> Self {
        Self {
            base_url: env_or_default("OLLAMA_BASE_URL", DEFAULT_BASE_URL),
            model: env_or_default("OLLAMA_EMBEDDING_MODEL", DEFAULT_MODEL),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Embedding,
}

/// Ollama embeddings provider. The endpoint embeds one prompt per call.
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, texts: &[String]) -> ChromaResult<Vec<Embedding>> {
        let url = format!(
            "{}/api/embeddings",
            self.config.base_url.trim_end_matches('/')
        );

        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let request = OllamaEmbeddingRequest {
                prompt: text,
                model: &self.config.model,
            };

            let response: OllamaEmbeddingResponse =
                send_json(self.name(), self.client.post(&url).json(&request)).await?;
            embeddings.push(response.embedding);
        }

        Ok(embeddings)
    }
}
