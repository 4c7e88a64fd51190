mod huggingface;
mod indexed;
mod jina;
mod mistral;
mod ollama;
mod openai;
mod provider;

pub use huggingface::{HuggingFaceConfig, HuggingFaceProvider};
pub use jina::{JinaConfig, JinaProvider};
pub use mistral::{MistralConfig, MistralProvider};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ChromaError, ChromaResult};
use crate::models::Embedding;

/// Run `provider` over `inputs`, enforcing the one-vector-per-input contract.
///
/// Any failure is reported as `EmbeddingGeneration` under the provider's name.
pub async fn generate_embeddings(
    provider: &dyn EmbeddingProvider,
    inputs: &[String],
) -> ChromaResult<Vec<Embedding>> {
    debug!(provider = provider.name(), count = inputs.len(), "Generating embeddings");

    let embeddings = provider.generate(inputs).await.map_err(|err| match err {
        ChromaError::EmbeddingGeneration { .. } => err,
        other => ChromaError::embedding(provider.name(), other.code(), other.to_string()),
    })?;

    if embeddings.len() != inputs.len() {
        return Err(ChromaError::embedding(
            provider.name(),
            0,
            format!(
                "returned {} embeddings for {} inputs",
                embeddings.len(),
                inputs.len()
            ),
        ));
    }

    Ok(embeddings)
}

/// Send a provider request and decode its JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> ChromaResult<T> {
    let response = request.send().await.map_err(|e| {
        let code = e.status().map(|s| s.as_u16()).unwrap_or(0);
        ChromaError::embedding(provider, code, e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ChromaError::embedding(
            provider,
            status.as_u16(),
            format!("API error ({}): {}", status, error_text),
        ));
    }

    response.json::<T>().await.map_err(|e| {
        ChromaError::embedding(provider, status.as_u16(), format!("invalid response: {}", e))
    })
}
