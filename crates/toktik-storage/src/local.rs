use crate::signing::UrlSigner;
use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use toktik_core::models::{ObjectKey, Operation};

/// Local filesystem storage implementation
///
/// Capability URLs point back at this service (`base_url`), which checks the
/// HMAC signature before serving or accepting the object.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signer: UrlSigner,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/toktik/objects")
    /// * `base_url` - Public URL of the object route (e.g., "http://localhost:7000/objects")
    /// * `signer` - Signs and verifies capability URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signer: UrlSigner,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            signer,
        })
    }

    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    /// Convert storage key to filesystem path.
    ///
    /// `ObjectKey` already rules out `..` and absolute keys; the prefix check
    /// guards against symlinks pointing outside the base directory.
    fn key_to_path(&self, key: &ObjectKey) -> StorageResult<PathBuf> {
        let raw = key.as_str();
        if raw.split('/').any(|segment| segment == "..") || raw.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(raw);

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn object_url(&self, key: &ObjectKey) -> String {
        let encoded: Vec<String> = key
            .as_str()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encoded.join("/")
        )
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn signed_url(
        &self,
        key: &ObjectKey,
        operation: Operation,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(key)?;
        let query = self.signer.sign(key, operation, expires_in, Utc::now())?;
        Ok(format!("{}?{}", self.object_url(key), query.to_query_string()))
    }

    async fn download_stream(&self, key: &ObjectKey) -> StorageResult<ByteStream> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let key = key.to_string();
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream download error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn upload(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = data.len();
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload succeeded"
        );
        Ok(())
    }

    async fn exists(&self, key: &ObjectKey) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
