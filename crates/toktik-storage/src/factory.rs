#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult, UrlSigner};
use std::sync::Arc;
use toktik_core::Config;

/// Signer for self-served capability URLs; `None` unless the local backend is configured.
pub fn url_signer(config: &Config) -> StorageResult<Option<UrlSigner>> {
    match config.storage_backend() {
        StorageBackend::S3 => Ok(None),
        StorageBackend::Local => {
            let secret = config.url_signing_secret().ok_or_else(|| {
                StorageError::ConfigError("URL_SIGNING_SECRET not configured".to_string())
            })?;
            UrlSigner::new(secret).map(Some)
        }
    }
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                config.s3_bucket().to_string(),
                config.s3_region().to_string(),
                config.s3_endpoint().map(String::from),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            let signer = url_signer(config)?.ok_or_else(|| {
                StorageError::ConfigError("URL_SIGNING_SECRET not configured".to_string())
            })?;

            let storage = LocalStorage::new(base_path, base_url.to_string(), signer).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
