//! Wire format shared by OpenAI-compatible embedding APIs (OpenAI, Jina, Mistral).
//!
//! These APIs tag each returned vector with the index of its input and do not
//! guarantee the order of `data`, so results are sorted before being returned.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::send_json;
use crate::error::ChromaResult;
use crate::models::Embedding;

#[derive(Debug, Serialize)]
pub(crate) struct IndexedEmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexedEmbeddingResponse {
    pub data: Vec<IndexedEmbedding>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexedEmbedding {
    pub embedding: Embedding,
    pub index: usize,
}

impl IndexedEmbeddingResponse {
    /// Vectors in input order
    pub fn into_ordered(self) -> Vec<Embedding> {
        let mut data = self.data;
        data.sort_by_key(|d| d.index);
        data.into_iter().map(|d| d.embedding).collect()
    }
}

/// Bearer-authenticated request to an indexed embeddings endpoint.
pub(crate) struct IndexedEndpoint<'a> {
    pub provider: &'static str,
    pub url: String,
    pub api_key: &'a str,
    pub extra_headers: Vec<(&'static str, String)>,
}

impl IndexedEndpoint<'_> {
    pub async fn embed(
        &self,
        client: &Client,
        request: &IndexedEmbeddingRequest<'_>,
    ) -> ChromaResult<Vec<Embedding>> {
        if request.input.is_empty() {
            return Ok(vec![]);
        }

        let mut builder = client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        for (name, value) in &self.extra_headers {
            builder = builder.header(*name, value);
        }

        let response: IndexedEmbeddingResponse =
            send_json(self.provider, builder.json(request)).await?;

        Ok(response.into_ordered())
    }
}
