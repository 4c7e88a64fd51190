use async_trait::async_trait;

use crate::error::ChromaResult;
use crate::models::Embedding;

/// Trait for embedding generation providers
///
/// `generate` returns one vector per input text, in input order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name used when reporting failures
    fn name(&self) -> &'static str;

    /// Generate embeddings for a batch of texts
    async fn generate(&self, texts: &[String]) -> ChromaResult<Vec<Embedding>>;
}
