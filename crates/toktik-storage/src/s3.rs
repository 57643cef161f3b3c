use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;
use toktik_core::models::{ObjectKey, Operation};

/// S3 storage implementation
///
/// Works against AWS S3 and S3-compatible providers such as DigitalOcean
/// Spaces. Credentials come from the environment (`AWS_ACCESS_KEY_ID`,
/// `AWS_SECRET_ACCESS_KEY`) and never leave the process; clients only ever
/// see presigned URLs.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - Bucket name
    /// * `region` - Region identifier (e.g. "sgp1" for DigitalOcean Spaces)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g., "https://sgp1.digitaloceanspaces.com", "http://localhost:9000" for MinIO)
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }

    fn location(key: &ObjectKey) -> Path {
        Path::from(key.as_str())
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn signed_url(
        &self,
        key: &ObjectKey,
        operation: Operation,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let method = match operation {
            Operation::Read => Method::GET,
            Operation::Write => Method::PUT,
        };
        let location = Self::location(key);

        let url_result: ObjectResult<_> =
            self.store.signed_url(method, &location, expires_in).await;

        let url = url_result
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    operation = %operation,
                    "S3 presign failed"
                );
                match e {
                    ObjectStoreError::Unauthenticated { .. }
                    | ObjectStoreError::UnknownConfigurationKey { .. } => {
                        StorageError::ConfigError(e.to_string())
                    }
                    other => StorageError::SigningFailed(other.to_string()),
                }
            })?
            .to_string();

        Ok(url)
    }

    async fn download_stream(&self, key: &ObjectKey) -> StorageResult<ByteStream> {
        let start = std::time::Instant::now();
        let location = Self::location(key);

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bucket = self.bucket.clone();
        let key = key.to_string();

        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }

    async fn upload(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        let location = Self::location(key);
        let size = data.len();
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload succeeded"
        );
        Ok(())
    }

    async fn exists(&self, key: &ObjectKey) -> StorageResult<bool> {
        let location = Self::location(key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
