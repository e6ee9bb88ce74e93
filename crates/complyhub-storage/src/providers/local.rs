//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use complyhub_core::error::{AppError, ErrorKind};
use complyhub_core::result::AppResult;
use complyhub_core::traits::storage::{ByteStream, StorageObjectMeta, StorageProvider};

/// Stores objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a provider rooted at `root_path`, creating the directory.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Map a key to a path inside the root. Keys that could escape the root
    /// are rejected.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn io_error(action: &str, key: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {key}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {key}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: Option<&str>) -> AppResult<()> {
        let path = self.resolve(key)?;
        self.ensure_parent(&path).await?;
        fs::write(&path, &data)
            .await
            .map_err(|e| io_error("write object", key, e))?;
        debug!(key, bytes = data.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| io_error("open object", key, e))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn get_bytes(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| io_error("read object", key, e))?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("delete object", key, e)),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let path = self.resolve(key)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| io_error("stat object", key, e))?;
        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: meta.len(),
            content_type: None,
            last_modified: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
        })
    }

    async fn presigned_get(&self, _key: &str, _expires_in: Duration) -> AppResult<Option<String>> {
        Ok(None)
    }
}
