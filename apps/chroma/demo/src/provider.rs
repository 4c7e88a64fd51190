use std::env;
use std::sync::Arc;

use domain_chroma::{
    EmbeddingProvider, HuggingFaceConfig, HuggingFaceProvider, JinaConfig, JinaProvider,
    MistralConfig, MistralProvider, OllamaConfig, OllamaProvider, OpenAIConfig, OpenAIProvider,
};
use eyre::{Result, WrapErr};

/// Embedding provider selected by `EMBEDDING_PROVIDER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Jina,
    Mistral,
    Ollama,
    HuggingFace,
}

impl ProviderKind {
    /// Reads `EMBEDDING_PROVIDER`, defaulting to Ollama (no API key needed)
    pub fn from_env() -> Result<Self> {
        match env::var("EMBEDDING_PROVIDER") {
            Ok(value) => value.parse(),
            Err(_) => Ok(ProviderKind::Ollama),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAI),
            "jina" => Ok(ProviderKind::Jina),
            "mistral" => Ok(ProviderKind::Mistral),
            "ollama" => Ok(ProviderKind::Ollama),
            "huggingface" | "hf" => Ok(ProviderKind::HuggingFace),
            other => Err(eyre::eyre!("Unknown embedding provider: {}", other)),
        }
    }
}

/// Build the provider chosen by `kind` from its environment configuration
pub fn build(kind: ProviderKind) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match kind {
        ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(
            OpenAIConfig::from_env().wrap_err("Failed to load OpenAI configuration")?,
        )),
        ProviderKind::Jina => Arc::new(JinaProvider::new(
            JinaConfig::from_env().wrap_err("Failed to load Jina configuration")?,
        )),
        ProviderKind::Mistral => Arc::new(MistralProvider::new(
            MistralConfig::from_env().wrap_err("Failed to load Mistral configuration")?,
        )),
        ProviderKind::Ollama => Arc::new(OllamaProvider::new(OllamaConfig::from_env())),
        ProviderKind::HuggingFace => {
            Arc::new(HuggingFaceProvider::new(HuggingFaceConfig::from_env()))
        }
    };

    Ok(provider)
}
