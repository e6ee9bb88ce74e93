//! Document storage configuration.

use serde::{Deserialize, Serialize};

/// Which object store holds document versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under `local.root_path`.
    #[default]
    Local,
    /// An S3 bucket (AWS or any S3-compatible endpoint).
    S3,
}

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Active storage backend.
    #[serde(default)]
    pub provider: StorageBackend,
    /// Maximum upload size in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: usize,
    /// Lifetime of generated download links in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// Local filesystem storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
    /// S3-compatible storage configuration.
    #[serde(default)]
    pub s3: S3StorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageBackend::default(),
            max_upload_size_bytes: default_max_upload(),
            signed_url_ttl_seconds: default_signed_url_ttl(),
            local: LocalStorageConfig::default(),
            s3: S3StorageConfig::default(),
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root path for local file storage.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

/// S3-compatible object storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StorageConfig {
    /// Custom endpoint URL (MinIO, LocalStack). Empty means AWS.
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// Access key ID. Empty falls back to the default AWS credential chain.
    #[serde(default)]
    pub access_key: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Use path-style addressing (required by most S3-compatible servers).
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            force_path_style: false,
        }
    }
}

fn default_max_upload() -> usize {
    50 * 1024 * 1024
}

fn default_signed_url_ttl() -> u64 {
    3600
}

fn default_local_root() -> String {
    "./data/documents".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}
