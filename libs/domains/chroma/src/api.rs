//! Endpoint layer: one method per server route.
//!
//! Builds [`ApiRequest`]s, sends them through a [`Transport`], classifies
//! failed replies and decodes successful ones.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use urlencoding::encode;

use crate::classifier::classify;
use crate::error::{ChromaError, ChromaResult};
use crate::models::{
    AddEmbeddingRequest, CollectionInfo, CreateCollectionRequest, CreateDatabaseRequest,
    CreateTenantRequest, Database, DeleteEmbeddingRequest, GetEmbeddingRequest, GetItemsResponse,
    QueryEmbeddingRequest, QueryItemsResponse, Tenant, UpdateCollectionRequest,
    UpdateEmbeddingRequest,
};
use crate::transport::{ApiRequest, Transport};

/// Low-level API client, shared by the client and every collection handle.
#[derive(Clone)]
pub struct ChromaApi {
    transport: Arc<dyn Transport>,
}

impl ChromaApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // ===== Server =====

    pub async fn root(&self) -> ChromaResult<Value> {
        self.fetch(ApiRequest::get("")).await
    }

    /// Server version, e.g. `0.4.24`
    pub async fn version(&self) -> ChromaResult<String> {
        let body = self.send(ApiRequest::get("/version")).await?;
        Ok(body.trim().trim_matches('"').to_string())
    }

    /// Server clock in nanoseconds
    pub async fn heartbeat(&self) -> ChromaResult<u64> {
        let body: Value = self.fetch(ApiRequest::get("/heartbeat")).await?;
        body.get("nanosecond heartbeat")
            .and_then(Value::as_u64)
            .ok_or_else(|| ChromaError::Deserialization(format!("unexpected heartbeat: {}", body)))
    }

    pub async fn pre_flight_checks(&self) -> ChromaResult<Value> {
        self.fetch(ApiRequest::get("/pre-flight-checks")).await
    }

    /// Empties the whole server. Only honoured when the server allows resets.
    pub async fn reset(&self) -> ChromaResult<bool> {
        self.fetch(ApiRequest::post("/reset")).await
    }

    // ===== Tenants & databases =====

    pub async fn create_tenant(&self, request: &CreateTenantRequest) -> ChromaResult<()> {
        self.send(ApiRequest::post("/tenants").with_json(request)?)
            .await
            .map(drop)
    }

    pub async fn get_tenant(&self, name: &str) -> ChromaResult<Tenant> {
        self.fetch(ApiRequest::get(format!("/tenants/{}", encode(name))))
            .await
    }

    pub async fn create_database(
        &self,
        tenant: &str,
        request: &CreateDatabaseRequest,
    ) -> ChromaResult<()> {
        let request = ApiRequest::post("/databases")
            .with_query("tenant", tenant)
            .with_json(request)?;
        self.send(request).await.map(drop)
    }

    pub async fn get_database(&self, name: &str, tenant: &str) -> ChromaResult<Database> {
        let request =
            ApiRequest::get(format!("/databases/{}", encode(name))).with_query("tenant", tenant);
        self.fetch(request).await
    }

    // ===== Collections =====

    pub async fn list_collections(
        &self,
        database: &str,
        tenant: &str,
    ) -> ChromaResult<Vec<CollectionInfo>> {
        self.fetch(scoped(ApiRequest::get("/collections"), database, tenant))
            .await
    }

    pub async fn create_collection(
        &self,
        database: &str,
        tenant: &str,
        request: &CreateCollectionRequest,
    ) -> ChromaResult<CollectionInfo> {
        let request =
            scoped(ApiRequest::post("/collections"), database, tenant).with_json(request)?;
        self.fetch(request).await
    }

    pub async fn get_collection(
        &self,
        name: &str,
        database: &str,
        tenant: &str,
    ) -> ChromaResult<CollectionInfo> {
        let request = ApiRequest::get(format!("/collections/{}", encode(name)));
        self.fetch(scoped(request, database, tenant)).await
    }

    pub async fn update_collection(
        &self,
        collection_id: &str,
        request: &UpdateCollectionRequest,
    ) -> ChromaResult<()> {
        let request =
            ApiRequest::put(format!("/collections/{}", encode(collection_id))).with_json(request)?;
        self.send(request).await.map(drop)
    }

    pub async fn delete_collection(
        &self,
        name: &str,
        database: &str,
        tenant: &str,
    ) -> ChromaResult<()> {
        let request = ApiRequest::delete(format!("/collections/{}", encode(name)));
        self.send(scoped(request, database, tenant)).await.map(drop)
    }

    // ===== Items =====

    pub async fn add(
        &self,
        collection_id: &str,
        request: &AddEmbeddingRequest,
    ) -> ChromaResult<()> {
        self.send(item_request(collection_id, "add").with_json(request)?)
            .await
            .map(drop)
    }

    pub async fn update(
        &self,
        collection_id: &str,
        request: &UpdateEmbeddingRequest,
    ) -> ChromaResult<()> {
        self.send(item_request(collection_id, "update").with_json(request)?)
            .await
            .map(drop)
    }

    pub async fn upsert(
        &self,
        collection_id: &str,
        request: &AddEmbeddingRequest,
    ) -> ChromaResult<()> {
        self.send(item_request(collection_id, "upsert").with_json(request)?)
            .await
            .map(drop)
    }

    pub async fn get(
        &self,
        collection_id: &str,
        request: &GetEmbeddingRequest,
    ) -> ChromaResult<GetItemsResponse> {
        self.fetch(item_request(collection_id, "get").with_json(request)?)
            .await
    }

    pub async fn delete(
        &self,
        collection_id: &str,
        request: &DeleteEmbeddingRequest,
    ) -> ChromaResult<()> {
        self.send(item_request(collection_id, "delete").with_json(request)?)
            .await
            .map(drop)
    }

    pub async fn count(&self, collection_id: &str) -> ChromaResult<u64> {
        let request = ApiRequest::get(format!("/collections/{}/count", encode(collection_id)));
        self.fetch(request).await
    }

    pub async fn query(
        &self,
        collection_id: &str,
        request: &QueryEmbeddingRequest,
    ) -> ChromaResult<QueryItemsResponse> {
        self.fetch(item_request(collection_id, "query").with_json(request)?)
            .await
    }

    // ===== Plumbing =====

    /// Execute `request`, returning the body of a successful reply.
    async fn send(&self, request: ApiRequest) -> ChromaResult<String> {
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            return Err(classify(&response.body, response.status));
        }

        Ok(response.body)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> ChromaResult<T> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn scoped(request: ApiRequest, database: &str, tenant: &str) -> ApiRequest {
    request
        .with_query("tenant", tenant)
        .with_query("database", database)
}

fn item_request(collection_id: &str, action: &str) -> ApiRequest {
    ApiRequest::post(format!("/collections/{}/{}", encode(collection_id), action))
}
