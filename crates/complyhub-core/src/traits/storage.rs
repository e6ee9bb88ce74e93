//! Storage provider trait for document object stores.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Object key within the provider.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type (if known).
    pub content_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// A byte stream type used for reading object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object storage backends holding document versions.
///
/// Keys are `/`-separated relative paths such as
/// `documents/{org}/{team}/{folder}/{uuid}.pdf`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store an object, replacing any existing object under the same key.
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> AppResult<()>;

    /// Open an object for streaming.
    async fn get(&self, key: &str) -> AppResult<ByteStream>;

    /// Read a complete object into memory.
    async fn get_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Get metadata about an object.
    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta>;

    /// Produce a time-limited download URL for an object.
    ///
    /// Returns `None` when the backend cannot sign URLs; callers then
    /// stream the object themselves.
    async fn presigned_get(&self, key: &str, expires_in: Duration) -> AppResult<Option<String>>;
}
