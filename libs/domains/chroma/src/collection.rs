use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::ChromaApi;
use crate::embedding::{EmbeddingProvider, generate_embeddings};
use crate::error::{ChromaError, ChromaResult};
use crate::models::{
    AddEmbeddingRequest, CollectionInfo, DeleteEmbeddingRequest, Embedding, Filter,
    GetEmbeddingRequest, GetItemsResponse, Include, Metadata, QueryEmbeddingRequest,
    QueryItemsResponse, UpdateCollectionRequest, UpdateEmbeddingRequest,
};
use crate::validation::{Batch, validate};

pub const DEFAULT_N_RESULTS: u32 = 10;
pub const DEFAULT_PEEK_LIMIT: u32 = 10;

/// Selection for [`Collection::get`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    pub ids: Option<Vec<String>>,
    pub where_filter: Option<Filter>,
    pub where_document: Option<Filter>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Server default applies when unset
    pub include: Option<Vec<Include>>,
}

impl GetOptions {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_where(mut self, filter: Filter) -> Self {
        self.where_filter = Some(filter);
        self
    }

    pub fn with_where_document(mut self, filter: Filter) -> Self {
        self.where_document = Some(filter);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_include(mut self, include: Vec<Include>) -> Self {
        self.include = Some(include);
        self
    }
}

/// Selection for [`Collection::delete`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    pub ids: Option<Vec<String>>,
    pub where_filter: Option<Filter>,
    pub where_document: Option<Filter>,
}

impl DeleteOptions {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_where(mut self, filter: Filter) -> Self {
        self.where_filter = Some(filter);
        self
    }

    pub fn with_where_document(mut self, filter: Filter) -> Self {
        self.where_document = Some(filter);
        self
    }
}

/// Similarity query. Exactly one of `query_embeddings`, `query_texts` and
/// `query_images` must be set.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub query_embeddings: Option<Vec<Embedding>>,
    pub query_texts: Option<Vec<String>>,
    pub query_images: Option<Vec<String>>,
    pub n_results: u32,
    pub where_filter: Option<Filter>,
    pub where_document: Option<Filter>,
    pub include: Option<Vec<Include>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            query_embeddings: None,
            query_texts: None,
            query_images: None,
            n_results: DEFAULT_N_RESULTS,
            where_filter: None,
            where_document: None,
            include: None,
        }
    }
}

impl QueryOptions {
    pub fn embeddings(embeddings: Vec<Embedding>) -> Self {
        Self::default().with_embeddings(embeddings)
    }

    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_texts(texts)
    }

    pub fn with_embeddings(mut self, embeddings: Vec<Embedding>) -> Self {
        self.query_embeddings = Some(embeddings);
        self
    }

    pub fn with_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_texts = Some(texts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_images = Some(images.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_n_results(mut self, n_results: u32) -> Self {
        self.n_results = n_results;
        self
    }

    pub fn with_where(mut self, filter: Filter) -> Self {
        self.where_filter = Some(filter);
        self
    }

    pub fn with_where_document(mut self, filter: Filter) -> Self {
        self.where_document = Some(filter);
        self
    }

    pub fn with_include(mut self, include: Vec<Include>) -> Self {
        self.include = Some(include);
        self
    }

    fn source_count(&self) -> usize {
        [
            self.query_embeddings.is_some(),
            self.query_texts.is_some(),
            self.query_images.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Handle to one collection on the server.
///
/// Cheap to clone; clones share the API client and embedding provider.
#[derive(Clone)]
pub struct Collection {
    name: String,
    id: String,
    metadata: Option<Metadata>,
    database: String,
    tenant: String,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    api: ChromaApi,
}

impl Collection {
    pub(crate) fn new(
        info: CollectionInfo,
        database: &str,
        tenant: &str,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        api: ChromaApi,
    ) -> Self {
        Self {
            name: info.name,
            id: info.id,
            metadata: info.metadata,
            database: database.to_string(),
            tenant: tenant.to_string(),
            provider,
            api,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn embedding_provider(&self) -> Option<&Arc<dyn EmbeddingProvider>> {
        self.provider.as_ref()
    }

    /// Add new items. Fails if any id already exists.
    #[instrument(skip(self, batch), fields(collection = %self.name, items = batch.ids.len()))]
    pub async fn add(&self, batch: Batch) -> ChromaResult<()> {
        let validated = validate(batch, self.provider.as_deref(), true).await?;

        let request = AddEmbeddingRequest {
            ids: validated.ids,
            embeddings: validated.embeddings,
            metadatas: validated.metadatas,
            documents: validated.documents,
        };

        self.api.add(&self.id, &request).await
    }

    /// Update existing items.
    #[instrument(skip(self, batch), fields(collection = %self.name, items = batch.ids.len()))]
    pub async fn update(&self, batch: Batch) -> ChromaResult<()> {
        let validated = validate(batch, self.provider.as_deref(), false).await?;

        let request = UpdateEmbeddingRequest {
            ids: validated.ids,
            embeddings: Some(validated.embeddings),
            metadatas: validated.metadatas,
            documents: validated.documents,
        };

        self.api.update(&self.id, &request).await
    }

    /// Add items, replacing any that already exist.
    #[instrument(skip(self, batch), fields(collection = %self.name, items = batch.ids.len()))]
    pub async fn upsert(&self, batch: Batch) -> ChromaResult<()> {
        let validated = validate(batch, self.provider.as_deref(), true).await?;

        let request = AddEmbeddingRequest {
            ids: validated.ids,
            embeddings: validated.embeddings,
            metadatas: validated.metadatas,
            documents: validated.documents,
        };

        self.api.upsert(&self.id, &request).await
    }

    pub async fn count(&self) -> ChromaResult<u64> {
        self.api.count(&self.id).await
    }

    /// First `limit` items of the collection, ten by default.
    pub async fn peek(&self, limit: Option<u32>) -> ChromaResult<GetItemsResponse> {
        let request = GetEmbeddingRequest {
            limit: Some(limit.unwrap_or(DEFAULT_PEEK_LIMIT)),
            include: Some(vec![
                Include::Embeddings,
                Include::Metadatas,
                Include::Documents,
            ]),
            ..Default::default()
        };

        self.api.get(&self.id, &request).await
    }

    #[instrument(skip(self, options), fields(collection = %self.name))]
    pub async fn get(&self, options: GetOptions) -> ChromaResult<GetItemsResponse> {
        let request = GetEmbeddingRequest {
            ids: options.ids,
            where_filter: options.where_filter,
            where_document: options.where_document,
            sort: options.sort,
            limit: options.limit,
            offset: options.offset,
            include: options.include,
        };

        self.api.get(&self.id, &request).await
    }

    #[instrument(skip(self, options), fields(collection = %self.name))]
    pub async fn delete(&self, options: DeleteOptions) -> ChromaResult<()> {
        let request = DeleteEmbeddingRequest {
            ids: options.ids,
            where_filter: options.where_filter,
            where_document: options.where_document,
        };

        self.api.delete(&self.id, &request).await
    }

    /// Nearest neighbours of each query, one result list per query.
    #[instrument(
        skip(self, options),
        fields(collection = %self.name, n_results = options.n_results)
    )]
    pub async fn query(&self, options: QueryOptions) -> ChromaResult<QueryItemsResponse> {
        if options.source_count() != 1 {
            return Err(ChromaError::AmbiguousQuerySource);
        }

        let query_embeddings = match options.query_embeddings {
            Some(embeddings) => embeddings,
            None => {
                let provider = self
                    .provider
                    .as_deref()
                    .ok_or(ChromaError::MissingEmbeddingFunction)?;
                let source = options
                    .query_texts
                    .as_ref()
                    .or(options.query_images.as_ref())
                    .ok_or(ChromaError::MissingSourceContent)?;

                generate_embeddings(provider, source).await?
            }
        };

        let request = QueryEmbeddingRequest {
            query_embeddings,
            n_results: options.n_results,
            where_filter: options.where_filter,
            where_document: options.where_document,
            include: Some(options.include.unwrap_or_else(Include::defaults)),
        };

        self.api.query(&self.id, &request).await
    }

    /// Rename the collection and replace its metadata.
    #[instrument(skip(self, metadata), fields(collection = %self.name))]
    pub async fn modify(&mut self, name: &str, metadata: Option<Metadata>) -> ChromaResult<()> {
        let request = UpdateCollectionRequest {
            new_name: Some(name.to_string()),
            new_metadata: metadata.clone(),
        };

        self.api.update_collection(&self.id, &request).await?;

        debug!(old = %self.name, new = %name, "Collection modified");
        self.name = name.to_string();
        if metadata.is_some() {
            self.metadata = metadata;
        }

        Ok(())
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("database", &self.database)
            .field("tenant", &self.tenant)
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::function;
    use serde_json::json;

    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::error::ErrorKind;
    use crate::transport::{ApiRequest, ApiResponse, MockTransport};

    fn collection(transport: MockTransport, provider: Option<MockEmbeddingProvider>) -> Collection {
        let info = CollectionInfo {
            name: "docs".to_string(),
            id: "c-1".to_string(),
            metadata: None,
        };

        Collection::new(
            info,
            "default_database",
            "default_tenant",
            provider.map(|p| Arc::new(p) as Arc<dyn EmbeddingProvider>),
            ChromaApi::new(Arc::new(transport)),
        )
    }

    fn silent_transport() -> MockTransport {
        let mut transport = MockTransport::new();
        transport.expect_execute().never();
        transport
    }

    fn silent_provider() -> MockEmbeddingProvider {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider.expect_generate().never();
        provider
    }

    #[tokio::test]
    async fn test_add_generates_embeddings_from_documents() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate()
            .times(1)
            .returning(|texts| Ok(texts.iter().map(|_| vec![0.5, 0.5]).collect()));

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1/add"
                    && r.body
                        == Some(json!({
                            "ids": ["a", "b"],
                            "embeddings": [[0.5, 0.5], [0.5, 0.5]],
                            "documents": ["first", "second"]
                        }))
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(201, "true")));

        let batch = Batch::new(["a", "b"]).with_documents(["first", "second"]);
        collection(transport, Some(provider)).add(batch).await.unwrap();
    }

    #[tokio::test]
    async fn test_images_are_not_sent() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate()
            .returning(|texts| Ok(texts.iter().map(|_| vec![1.0]).collect()));

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.body
                    .as_ref()
                    .is_some_and(|body| body.get("images").is_none())
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(201, "true")));

        let batch = Batch::new(["a"]).with_images(["aGVsbG8="]);
        collection(transport, Some(provider)).upsert(batch).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_batch_makes_no_calls() {
        let batch = Batch::new(["a", "b"])
            .with_embeddings(vec![vec![1.0]])
            .with_documents(["x", "y"]);

        let err = collection(silent_transport(), Some(silent_provider()))
            .add(batch)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BatchLengthMismatch);
    }

    #[tokio::test]
    async fn test_update_sends_embeddings() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1/update"
                    && r.body == Some(json!({"ids": ["a"], "embeddings": [[3.0]]}))
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, "true")));

        let batch = Batch::new(["a"]).with_embeddings(vec![vec![3.0]]);
        collection(transport, None).update(batch).await.unwrap();
    }

    #[tokio::test]
    async fn test_query_with_two_sources_is_ambiguous() {
        let options = QueryOptions::texts(["rust"]).with_embeddings(vec![vec![1.0]]);

        let err = collection(silent_transport(), Some(silent_provider()))
            .query(options)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AmbiguousQuerySource);
    }

    #[tokio::test]
    async fn test_query_without_source_is_ambiguous() {
        let err = collection(silent_transport(), None)
            .query(QueryOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AmbiguousQuerySource);
    }

    #[tokio::test]
    async fn test_query_texts_without_provider() {
        let err = collection(silent_transport(), None)
            .query(QueryOptions::texts(["rust"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingEmbeddingFunction);
    }

    #[tokio::test]
    async fn test_query_texts_uses_defaults() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_generate()
            .times(1)
            .returning(|_| Ok(vec![vec![0.5, 0.25]]));

        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1/query"
                    && r.body
                        == Some(json!({
                            "query_embeddings": [[0.5, 0.25]],
                            "n_results": 10,
                            "include": ["embeddings", "metadatas", "distances"]
                        }))
            }))
            .times(1)
            .returning(|_| {
                Ok(ApiResponse::new(
                    200,
                    concat!(
                        r#"{"ids": [["a"]], "distances": [[0.25]], "#,
                        r#""embeddings": null, "metadatas": [[null]]}"#
                    ),
                ))
            });

        let result = collection(transport, Some(provider))
            .query(QueryOptions::texts(["rust"]))
            .await
            .unwrap();

        assert_eq!(result.ids, vec![vec!["a".to_string()]]);
        assert_eq!(result.distances, Some(vec![vec![0.25]]));
    }

    #[tokio::test]
    async fn test_get_passes_filters() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1/get"
                    && r.body
                        == Some(json!({
                            "where": {"source": "notes"},
                            "sort": "created_at",
                            "limit": 5,
                            "include": ["documents"]
                        }))
            }))
            .times(1)
            .returning(|_| {
                Ok(ApiResponse::new(
                    200,
                    r#"{"ids": ["a"], "documents": ["hello"]}"#,
                ))
            });

        let options = GetOptions::default()
            .with_where(json!({"source": "notes"}))
            .with_sort("created_at")
            .with_limit(5)
            .with_include(vec![Include::Documents]);

        let items = collection(transport, None).get(options).await.unwrap();
        assert_eq!(items.documents, Some(vec![Some("hello".to_string())]));
    }

    #[tokio::test]
    async fn test_delete_by_ids() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1/delete" && r.body == Some(json!({"ids": ["a", "b"]}))
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, r#"["a", "b"]"#)));

        collection(transport, None)
            .delete(DeleteOptions::ids(["a", "b"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_modify_updates_local_identity() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1"
                    && r.body == Some(json!({"new_name": "renamed", "new_metadata": {"v": 2}}))
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, "null")));

        let mut metadata = Metadata::new();
        metadata.insert("v".to_string(), 2i64.into());

        let mut handle = collection(transport, None);
        handle.modify("renamed", Some(metadata.clone())).await.unwrap();

        assert_eq!(handle.name(), "renamed");
        assert_eq!(handle.metadata(), Some(&metadata));
    }

    #[tokio::test]
    async fn test_peek_defaults_to_ten() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .with(function(|r: &ApiRequest| {
                r.path == "/collections/c-1/get"
                    && r.body
                        == Some(json!({
                            "limit": 10,
                            "include": ["embeddings", "metadatas", "documents"]
                        }))
            }))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, r#"{"ids": []}"#)));

        let items = collection(transport, None).peek(None).await.unwrap();
        assert!(items.ids.is_empty());
    }

    #[tokio::test]
    async fn test_count() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Ok(ApiResponse::new(200, "42")));

        assert_eq!(collection(transport, None).count().await.unwrap(), 42);
    }
}
