use async_trait::async_trait;
use core_config::env_required;
use reqwest::Client;

use super::EmbeddingProvider;
use super::indexed::{IndexedEmbeddingRequest, IndexedEndpoint};
use crate::error::ChromaResult;
use crate::models::Embedding;

const DEFAULT_BASE_URL: &str = "https://api.jina.ai/v1";
const DEFAULT_MODEL: &str = "jina-embeddings-v2-base-en";

#[derive(Debug, Clone)]
pub struct JinaConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl JinaConfig {
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
        Ok(Self::new(env_required("JINA_API_KEY")?))
    }
}

/// Jina AI embeddings provider
pub struct JinaProvider {
    client: Client,
    config: JinaConfig,
}

impl JinaProvider {
    pub fn new(config: JinaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for JinaProvider {
    fn name(&self) -> &'static str {
        "jina"
    }

    async fn generate(&self, texts: &[String]) -> ChromaResult<Vec<Embedding>> {
        let endpoint = IndexedEndpoint {
            provider: self.name(),
            url: format!("{}/embeddings", self.config.base_url.trim_end_matches('/')),
            api_key: &self.config.api_key,
            // compressed responses are not decoded by the client
            extra_headers: vec![("Accept-Encoding", "identity".to_string())],
        };

        let request = IndexedEmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: None,
        };

        endpoint.embed(&self.client, &request).await
    }
}
