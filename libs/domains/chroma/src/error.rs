use std::fmt;

use core_config::ConfigError;
use thiserror::Error;

/// Server-side error kinds, derived from the error type name the server reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    NotFound,
    Authorization,
    Value,
    UniqueConstraint,
    Dimensionality,
    InvalidCollection,
    Type,
    Generic,
}

impl ApiErrorKind {
    /// Map a server error type name (e.g. `NotFoundError`) to its kind.
    ///
    /// Unrecognized names, including `UnknownError`, map to `Generic`.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "NotFoundError" => ApiErrorKind::NotFound,
            "AuthorizationError" => ApiErrorKind::Authorization,
            "ValueError" => ApiErrorKind::Value,
            "UniqueConstraintError" => ApiErrorKind::UniqueConstraint,
            "DimensionalityError" => ApiErrorKind::Dimensionality,
            "InvalidCollection" => ApiErrorKind::InvalidCollection,
            "TypeError" => ApiErrorKind::Type,
            _ => ApiErrorKind::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorKind::NotFound => "not_found",
            ApiErrorKind::Authorization => "authorization",
            ApiErrorKind::Value => "value",
            ApiErrorKind::UniqueConstraint => "unique_constraint",
            ApiErrorKind::Dimensionality => "dimensionality",
            ApiErrorKind::InvalidCollection => "invalid_collection",
            ApiErrorKind::Type => "type",
            ApiErrorKind::Generic => "generic",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every kind of failure the client can surface, server-side and client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Api(ApiErrorKind),
    EmptyIds,
    MissingContent,
    BatchLengthMismatch,
    DuplicateIds,
    MissingEmbeddingFunction,
    MissingSourceContent,
    AmbiguousQuerySource,
    EmbeddingGeneration,
    Transport,
    Deserialization,
    Config,
}

/// Optional per-item field of a mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchField {
    Embeddings,
    Metadatas,
    Documents,
    Images,
}

impl BatchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchField::Embeddings => "embeddings",
            BatchField::Metadatas => "metadatas",
            BatchField::Documents => "documents",
            BatchField::Images => "images",
        }
    }
}

impl fmt::Display for BatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A batch field whose length differs from the number of ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLength {
    pub field: BatchField,
    pub len: usize,
}

fn describe_mismatches(mismatched: &[FieldLength]) -> String {
    mismatched
        .iter()
        .map(|m| format!("{} ({})", m.field, m.len))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ChromaError {
    /// Classified error returned by the server. `message` is verbatim.
    #[error("{message}")]
    Api {
        kind: ApiErrorKind,
        message: String,
        code: u16,
    },

    #[error("Expected at least one id")]
    EmptyIds,

    #[error("You must provide embeddings, documents, or images")]
    MissingContent,

    #[error(
        "The number of ids, embeddings, metadatas, documents, and images must be the same: \
         expected {expected}, found {}",
        describe_mismatches(.mismatched)
    )]
    BatchLengthMismatch {
        expected: usize,
        mismatched: Vec<FieldLength>,
    },

    #[error("Expected IDs to be unique, found duplicates for: {}", .0.join(", "))]
    DuplicateIds(Vec<String>),

    #[error("You must provide an embedding function if you did not provide embeddings")]
    MissingEmbeddingFunction,

    #[error("If you did not provide embeddings, you must provide documents or images")]
    MissingSourceContent,

    #[error("You must provide exactly one of query_embeddings, query_texts or query_images")]
    AmbiguousQuerySource,

    #[error("Embedding provider '{provider}' failed: {message}")]
    EmbeddingGeneration {
        provider: String,
        code: u16,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ChromaResult<T> = Result<T, ChromaError>;

impl ChromaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChromaError::Api { kind, .. } => ErrorKind::Api(*kind),
            ChromaError::EmptyIds => ErrorKind::EmptyIds,
            ChromaError::MissingContent => ErrorKind::MissingContent,
            ChromaError::BatchLengthMismatch { .. } => ErrorKind::BatchLengthMismatch,
            ChromaError::DuplicateIds(_) => ErrorKind::DuplicateIds,
            ChromaError::MissingEmbeddingFunction => ErrorKind::MissingEmbeddingFunction,
            ChromaError::MissingSourceContent => ErrorKind::MissingSourceContent,
            ChromaError::AmbiguousQuerySource => ErrorKind::AmbiguousQuerySource,
            ChromaError::EmbeddingGeneration { .. } => ErrorKind::EmbeddingGeneration,
            ChromaError::Transport(_) => ErrorKind::Transport,
            ChromaError::Deserialization(_) => ErrorKind::Deserialization,
            ChromaError::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status for server errors, the provider status for embedding
    /// failures, `0` for everything raised locally.
    pub fn code(&self) -> u16 {
        match self {
            ChromaError::Api { code, .. } | ChromaError::EmbeddingGeneration { code, .. } => *code,
            _ => 0,
        }
    }

    /// Human-readable message; verbatim from the server for `Api` errors.
    pub fn message(&self) -> String {
        match self {
            ChromaError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            ChromaError::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.api_kind() == Some(ApiErrorKind::NotFound)
    }

    pub fn is_unique_constraint(&self) -> bool {
        self.api_kind() == Some(ApiErrorKind::UniqueConstraint)
    }

    pub(crate) fn embedding(provider: &str, code: u16, message: impl Into<String>) -> Self {
        ChromaError::EmbeddingGeneration {
            provider: provider.to_string(),
            code,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ChromaError {
    fn from(err: reqwest::Error) -> Self {
        ChromaError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ChromaError {
    fn from(err: serde_json::Error) -> Self {
        ChromaError::Deserialization(err.to_string())
    }
}

impl From<ConfigError> for ChromaError {
    fn from(err: ConfigError) -> Self {
        ChromaError::Config(err.to_string())
    }
}
