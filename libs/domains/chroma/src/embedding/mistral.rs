use async_trait::async_trait;
use core_config::env_required;
use reqwest::Client;

use super::EmbeddingProvider;
use super::indexed::{IndexedEmbeddingRequest, IndexedEndpoint};
use crate::error::ChromaResult;
use crate::models::Embedding;

const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
const DEFAULT_MODEL: &str = "mistral-embed";

#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl MistralConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn from_env() -> ChromaResult<Self> {
        Ok(Self::new(env_required("MISTRAL_API_KEY")?))
    }
}

/// Mistral AI embeddings provider
pub struct MistralProvider {
    client: Client,
    config: MistralConfig,
}

impl MistralProvider {
    pub fn new(config: MistralConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for MistralProvider {
    fn name(&self) -> &'static str {
        "mistral"
    }

    async fn generate(&self, texts: &[String]) -> ChromaResult<Vec<Embedding>> {
        let endpoint = IndexedEndpoint {
            provider: self.name(),
            url: format!("{}/embeddings", self.config.base_url.trim_end_matches('/')),
            api_key: &self.config.api_key,
            extra_headers: vec![("Accept", "application/json".to_string())],
        };

        let request = IndexedEmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: None,
        };

        endpoint.embed(&self.client, &request).await
    }
}
