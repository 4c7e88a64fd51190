//! Chroma test infrastructure
//!
//! Provides a `TestChroma` helper that runs a Chroma server container for testing.

use std::time::Duration;

use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

const IMAGE: &str = "chromadb/chroma";
const TAG: &str = "0.4.24";
const PORT: u16 = 8000;
const READY_ATTEMPTS: u32 = 60;

/// Test Chroma wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestChroma;
///
/// # async fn example() {
/// let chroma = TestChroma::new().await;
/// let url = chroma.url();
/// // Point your client at `url`
/// # }
/// ```
pub struct TestChroma {
    #[allow(dead_code)]
    container: ContainerAsync<GenericImage>,
    host: String,
    port: u16,
}

impl TestChroma {
    /// Start a Chroma server and wait until its heartbeat answers.
    ///
    /// Resets are allowed so tests may wipe the server.
    pub async fn new() -> Self {
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(PORT.tcp())
            .with_env_var("ALLOW_RESET", "TRUE")
            .with_env_var("ANONYMIZED_TELEMETRY", "FALSE")
            .start()
            .await
            .expect("Failed to start Chroma container");

        let port = container
            .get_host_port_ipv4(PORT)
            .await
            .expect("Failed to get Chroma port");

        let chroma = Self {
            container,
            host: "http://127.0.0.1".to_string(),
            port,
        };

        chroma.wait_until_ready().await;
        tracing::info!(port, "Test Chroma ready ({}:{})", IMAGE, TAG);

        chroma
    }

    async fn wait_until_ready(&self) {
        let heartbeat = format!("{}/api/v1/heartbeat", self.url());
        let client = reqwest::Client::new();

        for _ in 0..READY_ATTEMPTS {
            match client.get(&heartbeat).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(500)).await,
            }
        }

        panic!("Chroma did not become ready at {}", heartbeat);
    }

    /// Host including scheme, e.g. `http://127.0.0.1`
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Server root, e.g. `http://127.0.0.1:49153`
    pub fn url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Container is automatically cleaned up when TestChroma is dropped
impl Drop for TestChroma {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Chroma container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_chroma_heartbeat() {
        let chroma = TestChroma::new().await;

        let response = reqwest::get(format!("{}/api/v1/heartbeat", chroma.url()))
            .await
            .unwrap();

        assert!(response.status().is_success());
    }
}
