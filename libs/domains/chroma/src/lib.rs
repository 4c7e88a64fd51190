//! Chroma Domain Library
//!
//! Typed async client for the Chroma vector database REST API, with pluggable
//! embedding generation for callers that supply raw documents instead of vectors.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  ChromaClient   │  ← tenant/database provisioning, collection management
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────┐
//! │   Collection    │────▶│ EmbeddingProvider│
//! │ (validation)    │     │     (trait)      │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//! ┌────────▼────────┐     ┌────────▼─────────┐
//! │   ChromaApi     │     │ OpenAI, Jina,    │
//! │ (classifier)    │     │ Mistral, Ollama, │
//! └────────┬────────┘     │ HuggingFace      │
//!          │              └──────────────────┘
//! ┌────────▼────────┐
//! │   Transport     │  ← HttpTransport (reqwest)
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use core_config::FromEnv;
//! use domain_chroma::{
//!     Batch, ChromaClient, ChromaConfig, OllamaConfig, OllamaProvider, QueryOptions,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChromaClient::connect(ChromaConfig::from_env()?).await?;
//!
//! let provider = Arc::new(OllamaProvider::new(OllamaConfig::from_env()));
//! let collection = client
//!     .get_or_create_collection("notes", None, Some(provider))
//!     .await?;
//!
//! collection
//!     .add(Batch::new(["n1", "n2"]).with_documents(["Rust is fast", "Chroma stores vectors"]))
//!     .await?;
//!
//! let result = collection.query(QueryOptions::texts(["speed"]).with_n_results(1)).await?;
//! println!("{:?}", result.ids);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod classifier;
pub mod client;
pub mod collection;
pub mod config;
pub mod embedding;
pub mod error;
pub mod models;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use api::ChromaApi;
pub use client::ChromaClient;
pub use collection::{Collection, DeleteOptions, GetOptions, QueryOptions};
pub use config::ChromaConfig;
pub use embedding::{
    EmbeddingProvider, HuggingFaceConfig, HuggingFaceProvider, JinaConfig, JinaProvider,
    MistralConfig, MistralProvider, OllamaConfig, OllamaProvider, OpenAIConfig, OpenAIProvider,
};
pub use error::{ApiErrorKind, BatchField, ChromaError, ChromaResult, ErrorKind, FieldLength};
pub use models::{
    CollectionInfo, Embedding, Filter, GetItemsResponse, Include, Metadata, MetadataValue,
    QueryItemsResponse,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use validation::{Batch, ValidatedBatch, validate};
