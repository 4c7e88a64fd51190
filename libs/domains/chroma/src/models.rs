use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dense embedding vector.
pub type Embedding = Vec<f32>;

/// Per-item or per-collection metadata.
pub type Metadata = HashMap<String, MetadataValue>;

/// Server-evaluated filter expression (`where` / `where_document`).
pub type Filter = Value;

/// Scalar metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Str(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Str(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Int(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Columns that `get` and `query` can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Include {
    Embeddings,
    Metadatas,
    Documents,
    Distances,
    Uris,
    Data,
}

impl Include {
    /// Columns requested when the caller does not specify any.
    pub fn defaults() -> Vec<Include> {
        vec![Include::Embeddings, Include::Metadatas, Include::Distances]
    }
}

// ===== Server resources =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tenant: Option<String>,
}

/// Collection as described by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

// ===== Requests =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTenantRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDatabaseRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub get_or_create: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateCollectionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_metadata: Option<Metadata>,
}

/// Body of `add` and `upsert`.
///
/// Images are only an embedding source and never leave the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddEmbeddingRequest {
    pub ids: Vec<String>,
    pub embeddings: Vec<Embedding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Metadata>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateEmbeddingRequest {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Embedding>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Metadata>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetEmbeddingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Include>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteEmbeddingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryEmbeddingRequest {
    pub query_embeddings: Vec<Embedding>,
    pub n_results: u32,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_document: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<Include>>,
}

// ===== Responses =====

/// Items returned by `get`, one entry per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetItemsResponse {
    pub ids: Vec<String>,
    #[serde(default)]
    pub embeddings: Option<Vec<Embedding>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Option<Metadata>>>,
    #[serde(default)]
    pub documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub uris: Option<Vec<Option<String>>>,
}

/// Items returned by `query`, one inner list per query embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryItemsResponse {
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub embeddings: Option<Vec<Vec<Embedding>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Metadata>>>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    pub uris: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub distances: Option<Vec<Vec<f32>>>,
}
