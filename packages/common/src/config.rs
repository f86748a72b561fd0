use std::path::PathBuf;

use serde::Deserialize;

/// Which storage backend variant to construct.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Filesystem,
    S3,
}

/// S3-compatible object store settings.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// Region name. Default: "eu-central-1".
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint for MinIO and other S3-compatible stores.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style bucket addressing. Default: false.
    #[serde(default)]
    pub path_style: bool,
}

fn default_s3_region() -> String {
    "eu-central-1".into()
}

/// App-level storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Backend variant. Default: filesystem.
    #[serde(default = "default_storage_backend")]
    pub backend: StorageKind,
    /// Base directory for the filesystem backend. Default: "./data/files".
    #[serde(default = "default_storage_base_path")]
    pub base_path: PathBuf,
    /// Largest object accepted, in bytes. Default: 64 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
    #[serde(default)]
    pub s3: Option<S3Config>,
}

fn default_storage_backend() -> StorageKind {
    StorageKind::Filesystem
}
fn default_storage_base_path() -> PathBuf {
    PathBuf::from("./data/files")
}
fn default_max_blob_size() -> u64 {
    64 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            base_path: default_storage_base_path(),
            max_blob_size: default_max_blob_size(),
            s3: None,
        }
    }
}

/// External PDF renderer settings.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Renderer executable. Default: "soffice".
    #[serde(default = "default_render_program")]
    pub program: String,
    /// Arguments placed before the conversion arguments. Default: ["--headless"].
    #[serde(default = "default_render_args")]
    pub args: Vec<String>,
    /// Hard limit on one render, in seconds. Default: 60.
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,
    /// Parent directory for per-render scratch directories. Default: the system temp dir.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_render_program() -> String {
    "soffice".into()
}
fn default_render_args() -> Vec<String> {
    vec!["--headless".into()]
}
fn default_render_timeout_secs() -> u64 {
    60
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: default_render_program(),
            args: default_render_args(),
            timeout_secs: default_render_timeout_secs(),
            scratch_dir: None,
        }
    }
}
