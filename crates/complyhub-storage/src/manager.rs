//! Storage manager: the configured provider plus upload limits and
//! download link lifetime.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use complyhub_core::config::storage::{StorageBackend, StorageConfig};
use complyhub_core::error::AppError;
use complyhub_core::result::AppResult;
use complyhub_core::traits::storage::{ByteStream, StorageProvider};

/// How a client should fetch a stored object.
pub enum Download {
    /// A time-limited URL the client follows itself.
    Redirect(String),
    /// Bytes streamed through the API.
    Stream(ByteStream),
}

/// Shared handle to the active storage backend.
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn StorageProvider>,
    max_upload_size_bytes: usize,
    signed_url_ttl: Duration,
}

impl StorageManager {
    /// Wrap an already constructed provider.
    pub fn new(provider: Arc<dyn StorageProvider>, config: &StorageConfig) -> Self {
        Self {
            provider,
            max_upload_size_bytes: config.max_upload_size_bytes,
            signed_url_ttl: Duration::from_secs(config.signed_url_ttl_seconds),
        }
    }

    /// Build the provider named by `config.provider`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider {
            #[cfg(feature = "local")]
            StorageBackend::Local => Arc::new(
                crate::providers::local::LocalStorageProvider::new(&config.local.root_path).await?,
            ),
            #[cfg(feature = "s3")]
            StorageBackend::S3 => {
                Arc::new(crate::providers::s3::S3StorageProvider::new(&config.s3).await?)
            }
            #[allow(unreachable_patterns)]
            other => {
                return Err(AppError::configuration(format!(
                    "Storage provider {other:?} is not compiled in"
                )));
            }
        };
        info!(provider = provider.provider_type(), "Storage provider ready");
        Ok(Self::new(provider, config))
    }

    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_bytes
    }

    /// Store an upload after enforcing the size limit.
    pub async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if data.len() > self.max_upload_size_bytes {
            return Err(AppError::payload_too_large(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        self.provider.put(key, data, Some(content_type)).await
    }

    /// Signed URL when the backend supports it, otherwise a byte stream.
    pub async fn download(&self, key: &str) -> AppResult<Download> {
        match self.provider.presigned_get(key, self.signed_url_ttl).await? {
            Some(url) => Ok(Download::Redirect(url)),
            None => Ok(Download::Stream(self.provider.get(key).await?)),
        }
    }

    /// Delete a single object, logging instead of failing.
    pub async fn discard(&self, key: &str) {
        if let Err(e) = self.provider.delete(key).await {
            warn!(key, error = %e, "Failed to delete stored object");
        }
    }

    /// Delete many objects, continuing past individual failures. Returns
    /// how many deletes succeeded.
    pub async fn discard_all(&self, keys: &[String]) -> usize {
        let mut deleted = 0;
        for key in keys {
            match self.provider.delete(key).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!(key = %key, error = %e, "Failed to delete stored object"),
            }
        }
        deleted
    }

    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }
}
