use async_trait::async_trait;
use core_config::{env_or_default, env_required};
use reqwest::Client;
use serde::Serialize;

use super::{EmbeddingProvider, send_json};
use crate::error::ChromaResult;
use crate::models::Embedding;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Configuration for a HuggingFace text-embeddings-inference server
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl HuggingFaceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn from_env() -> Self {
        Self {
            base_url: env_or_default("HF_EMBEDDING_SERVER_URL", DEFAULT_BASE_URL),
            api_key: env_required("HF_API_KEY").ok(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

pub struct HuggingFaceProvider {
    client: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceProvider {
    pub fn new(config: HuggingFaceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn generate(&self, texts: &[String]) -> ChromaResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}/embed", self.config.base_url.trim_end_matches('/'));
        let mut request = self
            .client
            .post(url)
            .json(&EmbedRequest { inputs: texts });

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        send_json(self.name(), request).await
    }
}
