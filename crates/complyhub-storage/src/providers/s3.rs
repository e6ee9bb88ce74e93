//! S3-compatible object storage provider.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3Body;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use complyhub_core::config::storage::S3StorageConfig;
use complyhub_core::error::{AppError, ErrorKind};
use complyhub_core::result::AppResult;
use complyhub_core::traits::storage::{ByteStream, StorageObjectMeta, StorageProvider};

/// Stores objects in one S3 bucket.
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: Client,
    bucket: String,
}

impl S3StorageProvider {
    /// Build a client from configuration. Static credentials are used when
    /// an access key is configured, otherwise the default AWS chain.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "complyhub-static",
            ));
        }
        let base = loader.load().await;

        let s3_config = S3ConfigBuilder::from(&base)
            .force_path_style(config.force_path_style)
            .build();

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = %config.endpoint,
            "Initialized S3 storage provider"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

fn s3_error(action: &str, key: &str, e: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {key}"), e)
}

#[async_trait]
impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> AppResult<()> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .set_content_type(content_type.map(str::to_string))
            .body(S3Body::from(data))
            .send()
            .await
            .map_err(|e| s3_error("upload object", key, e))?;
        debug!(key, bytes = size, "Uploaded object");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Object not found: {key}"))
                } else {
                    s3_error("download object", key, e)
                }
            })?;
        Ok(Box::pin(ReaderStream::new(output.body.into_async_read())))
    }

    async fn get_bytes(&self, key: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    AppError::not_found(format!("Object not found: {key}"))
                } else {
                    s3_error("download object", key, e)
                }
            })?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|e| s3_error("read object body", key, e))?;
        Ok(data.into_bytes())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| s3_error("delete object", key, e))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(s3_error("stat object", key, e)),
        }
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    AppError::not_found(format!("Object not found: {key}"))
                } else {
                    s3_error("stat object", key, e)
                }
            })?;

        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: head.content_length().unwrap_or(0).max(0) as u64,
            content_type: head.content_type().map(str::to_string),
            last_modified: head
                .last_modified()
                .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
        })
    }

    async fn presigned_get(&self, key: &str, expires_in: Duration) -> AppResult<Option<String>> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| s3_error("build presigning config", key, e))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| s3_error("presign object", key, e))?;
        Ok(Some(request.uri().to_string()))
    }
}
