use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv, env_or_default};
use domain_chroma::{Batch, ChromaClient, ChromaConfig, Include, QueryOptions};
use eyre::{Result, WrapErr};
use tracing::info;

use crate::provider::{self, ProviderKind};

const DEMO_TENANT: &str = "test_tenant";
const DEMO_DATABASE: &str = "test_database";
const DEMO_COLLECTION: &str = "test_collection";

/// Connection settings for the demo; tenant and database default to a scratch
/// pair so the walkthrough never touches `default_database`.
pub fn demo_config() -> Result<ChromaConfig> {
    let config = ChromaConfig::from_env().wrap_err("Failed to load Chroma configuration")?;

    Ok(config
        .with_tenant(env_or_default("CHROMA_TENANT", DEMO_TENANT))
        .with_database(env_or_default("CHROMA_DATABASE", DEMO_DATABASE)))
}

/// Run the walkthrough
///
/// # Errors
///
/// Returns an error if configuration is invalid, the server is unreachable,
/// or the embedding provider fails.
pub async fn run() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let config = demo_config()?;
    info!(
        url = %config.base_url(),
        tenant = %config.tenant,
        database = %config.database,
        "Connecting to Chroma"
    );

    let client = ChromaClient::connect(config)
        .await
        .wrap_err("Failed to connect to Chroma")?;

    let version = client.version().await.wrap_err("Failed to read server version")?;
    info!(%version, "Connected");

    client
        .delete_all_collections()
        .await
        .wrap_err("Failed to clear collections")?;

    let kind = ProviderKind::from_env()?;
    let embedding_provider = provider::build(kind)?;
    info!(provider = embedding_provider.name(), "Embedding provider configured");

    let collection = client
        .create_collection(DEMO_COLLECTION, None, Some(embedding_provider))
        .await
        .wrap_err("Failed to create collection")?;

    collection
        .add(
            Batch::new(["hello", "world"])
                .with_documents(["This is a test document", "The man is happy"]),
        )
        .await
        .wrap_err("Failed to add documents")?;

    let response = collection
        .query(
            QueryOptions::texts(["The man is excited"])
                .with_include(vec![Include::Documents, Include::Distances]),
        )
        .await
        .wrap_err("Failed to query collection")?;

    let documents = response.documents.unwrap_or_default();
    let distances = response.distances.unwrap_or_default();

    for (ids, (docs, dists)) in response.ids.iter().zip(documents.iter().zip(distances.iter())) {
        for ((id, document), distance) in ids.iter().zip(docs).zip(dists) {
            println!(
                "{:<8} {:>8.4}  {}",
                id,
                distance,
                document.as_deref().unwrap_or("<no document>")
            );
        }
    }

    Ok(())
}
