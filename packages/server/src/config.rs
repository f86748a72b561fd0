use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{RenderConfig, S3Config, StorageConfig, StorageKind};

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Delegated authentication against the external identity service.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    /// Verification path appended to `base_url`. Default: "/api/auth/verify".
    pub path: String,
    /// Shared secret that lets trusted internal callers skip verification.
    /// Empty disables the bypass.
    #[serde(default)]
    pub bypass_token: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    1000
}
fn default_read_timeout_ms() -> u64 {
    1500
}

/// Classification service that receives original uploads.
#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Whether originals are forwarded at all. Default: true.
    #[serde(default = "default_ingest_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
    /// Default: "/api/v1/ingest".
    #[serde(default = "default_ingest_path")]
    pub path: String,
    /// Catalog of processing models offered by the service.
    /// Default: "/api/v1/information/available_models".
    #[serde(default = "default_information_path")]
    pub information_path: String,
    /// Per-request timeout. Default: 10000.
    #[serde(default = "default_ingest_timeout_ms")]
    pub timeout_ms: u64,
    /// Pending dispatches beyond this are dropped. Default: 256.
    #[serde(default = "default_ingest_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_ingest_enabled() -> bool {
    true
}
fn default_ingest_path() -> String {
    "/api/v1/ingest".into()
}
fn default_information_path() -> String {
    "/api/v1/information/available_models".into()
}
fn default_ingest_timeout_ms() -> u64 {
    10_000
}
fn default_ingest_queue_capacity() -> usize {
    256
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            enabled: default_ingest_enabled(),
            base_url: String::new(),
            path: default_ingest_path(),
            information_path: default_information_path(),
            timeout_ms: default_ingest_timeout_ms(),
            queue_capacity: default_ingest_queue_capacity(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("DOCVAULT_CONFIG").unwrap_or_else(|_| "config/config".to_string());

        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["*"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://docvault.db?mode=rwc")?
            .set_default("auth.base_url", "http://localhost:4000")?
            .set_default("auth.path", "/api/auth/verify")?
            // Load from config/config.toml
            .add_source(File::with_name(&config_path).required(false))
            // Override from environment (e.g., DOCVAULT__AUTH__BYPASS_TOKEN)
            .add_source(Environment::with_prefix("DOCVAULT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
