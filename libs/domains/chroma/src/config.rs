use core_config::{ConfigError, FromEnv, env_or_default, env_parse};

pub const DEFAULT_HOST: &str = "http://localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TENANT: &str = "default_tenant";
pub const DEFAULT_DATABASE: &str = "default_database";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for a Chroma server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChromaConfig {
    pub host: String,
    pub port: u16,
    pub tenant: String,
    pub database: String,
    pub auth_token: Option<String>,
    pub timeout_secs: u64,
}

impl ChromaConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = tenant.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Server root as "host:port"
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }
}

impl FromEnv for ChromaConfig {
    /// Reads CHROMA_HOST, CHROMA_PORT, CHROMA_TENANT, CHROMA_DATABASE,
    /// CHROMA_AUTH_TOKEN and CHROMA_TIMEOUT_SECS, falling back to the defaults.
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("CHROMA_HOST", DEFAULT_HOST),
            port: env_parse("CHROMA_PORT", DEFAULT_PORT)?,
            tenant: env_or_default("CHROMA_TENANT", DEFAULT_TENANT),
            database: env_or_default("CHROMA_DATABASE", DEFAULT_DATABASE),
            auth_token: std::env::var("CHROMA_AUTH_TOKEN").ok(),
            timeout_secs: env_parse("CHROMA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tenant: DEFAULT_TENANT.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
