use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::ChromaApi;
use crate::collection::Collection;
use crate::config::ChromaConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::ChromaResult;
use crate::models::{
    CollectionInfo, CreateCollectionRequest, CreateDatabaseRequest, CreateTenantRequest, Metadata,
};
use crate::transport::HttpTransport;

/// Entry point: a connection bound to one tenant and database.
#[derive(Clone)]
pub struct ChromaClient {
    api: ChromaApi,
    database: String,
    tenant: String,
}

impl ChromaClient {
    /// Connect over HTTP and provision the configured tenant and database.
    pub async fn connect(config: ChromaConfig) -> ChromaResult<Self> {
        let transport = HttpTransport::new(&config)?;
        info!(url = %transport.base_url(), "Connecting to Chroma");

        Self::new(
            ChromaApi::new(Arc::new(transport)),
            &config.database,
            &config.tenant,
        )
        .await
    }

    /// Bind `api` to a tenant and database, creating them if missing.
    pub async fn new(api: ChromaApi, database: &str, tenant: &str) -> ChromaResult<Self> {
        let client = Self {
            api,
            database: database.to_string(),
            tenant: tenant.to_string(),
        };

        client.provision().await?;
        Ok(client)
    }

    pub fn api(&self) -> &ChromaApi {
        &self.api
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Ensure the tenant and database exist. Safe to call repeatedly.
    #[instrument(skip(self), fields(tenant = %self.tenant, database = %self.database))]
    pub async fn provision(&self) -> ChromaResult<()> {
        self.ensure_tenant().await?;
        self.ensure_database().await
    }

    async fn ensure_tenant(&self) -> ChromaResult<()> {
        match self.api.get_tenant(&self.tenant).await {
            Err(err) if err.is_not_found() => {
                info!(tenant = %self.tenant, "Creating tenant");
                let request = CreateTenantRequest {
                    name: self.tenant.clone(),
                };
                already_exists_is_ok(self.api.create_tenant(&request).await)
            }
            other => other.map(drop),
        }
    }

    async fn ensure_database(&self) -> ChromaResult<()> {
        match self.api.get_database(&self.database, &self.tenant).await {
            Err(err) if err.is_not_found() => {
                info!(database = %self.database, tenant = %self.tenant, "Creating database");
                let request = CreateDatabaseRequest {
                    name: self.database.clone(),
                };
                already_exists_is_ok(self.api.create_database(&self.tenant, &request).await)
            }
            other => other.map(drop),
        }
    }

    pub async fn version(&self) -> ChromaResult<String> {
        self.api.version().await
    }

    pub async fn heartbeat(&self) -> ChromaResult<u64> {
        self.api.heartbeat().await
    }

    pub async fn list_collections(&self) -> ChromaResult<Vec<CollectionInfo>> {
        self.api
            .list_collections(&self.database, &self.tenant)
            .await
    }

    /// Create a collection; fails with `UniqueConstraint` if the name is taken.
    #[instrument(skip(self, metadata, provider))]
    pub async fn create_collection(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> ChromaResult<Collection> {
        self.create(name, metadata, provider, false).await
    }

    #[instrument(skip(self, metadata, provider))]
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> ChromaResult<Collection> {
        self.create(name, metadata, provider, true).await
    }

    #[instrument(skip(self, provider))]
    pub async fn get_collection(
        &self,
        name: &str,
        provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> ChromaResult<Collection> {
        let info = self
            .api
            .get_collection(name, &self.database, &self.tenant)
            .await?;

        Ok(self.handle(info, provider))
    }

    #[instrument(skip(self))]
    pub async fn delete_collection(&self, name: &str) -> ChromaResult<()> {
        self.api
            .delete_collection(name, &self.database, &self.tenant)
            .await
    }

    /// Delete every collection in this tenant and database.
    #[instrument(skip(self))]
    pub async fn delete_all_collections(&self) -> ChromaResult<()> {
        for collection in self.list_collections().await? {
            self.delete_collection(&collection.name).await?;
        }

        Ok(())
    }

    /// Wipe the server. Requires `ALLOW_RESET` on the server side.
    pub async fn reset(&self) -> ChromaResult<bool> {
        self.api.reset().await
    }

    async fn create(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        provider: Option<Arc<dyn EmbeddingProvider>>,
        get_or_create: bool,
    ) -> ChromaResult<Collection> {
        let request = CreateCollectionRequest {
            name: name.to_string(),
            metadata,
            get_or_create,
        };

        let info = self
            .api
            .create_collection(&self.database, &self.tenant, &request)
            .await?;

        Ok(self.handle(info, provider))
    }

    fn handle(
        &self,
        info: CollectionInfo,
        provider: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Collection {
        Collection::new(
            info,
            &self.database,
            &self.tenant,
            provider,
            self.api.clone(),
        )
    }
}

fn already_exists_is_ok(result: ChromaResult<()>) -> ChromaResult<()> {
    match result {
        Err(err) if err.is_unique_constraint() => Ok(()),
        other => other,
    }
}
