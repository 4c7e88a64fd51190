use async_trait::async_trait;
use core_config::{env_or_default, env_required};
use reqwest::Client;

use super::EmbeddingProvider;
use super::indexed::{IndexedEmbeddingRequest, IndexedEndpoint};
use crate::error::ChromaResult;
use crate::models::Embedding;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub organization: Option<String>,
    pub dimensions: Option<u32>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            organization: None,
            dimensions: None,
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

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn from_env() -> ChromaResult<Self> {
        Ok(Self {
            api_key: env_required("OPENAI_API_KEY")?,
            base_url: env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: env_or_default("OPENAI_EMBEDDING_MODEL", DEFAULT_MODEL),
            organization: env_required("OPENAI_ORGANIZATION").ok(),
            dimensions: None,
        })
    }

    fn endpoint_url(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> ChromaResult<Self> {
        Ok(Self::new(OpenAIConfig::from_env()?))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, texts: &[String]) -> ChromaResult<Vec<Embedding>> {
        let extra_headers = self
            .config
            .organization
            .iter()
            .map(|org| ("OpenAI-Organization", org.clone()))
            .collect();

        let endpoint = IndexedEndpoint {
            provider: self.name(),
            url: self.config.endpoint_url(),
            api_key: &self.config.api_key,
            extra_headers,
        };

        let request = IndexedEmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.config.dimensions,
        };

        endpoint.embed(&self.client, &request).await
    }
}
