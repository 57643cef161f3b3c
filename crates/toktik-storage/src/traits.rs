//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use toktik_core::models::{ObjectKey, Operation};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// capability issuer and the manifest rewriter never couple to a specific
/// provider.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a URL that grants `operation` on `key` for `expires_in`.
    ///
    /// Read maps to a signed GET and Write to a signed PUT. The URL carries
    /// no long-lived credentials.
    async fn signed_url(
        &self,
        key: &ObjectKey,
        operation: Operation,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Download an object as a stream of chunks.
    ///
    /// Returns `StorageError::NotFound` when the object does not exist.
    async fn download_stream(&self, key: &ObjectKey) -> StorageResult<ByteStream>;

    /// Write an object, replacing any previous content.
    async fn upload(&self, key: &ObjectKey, data: Bytes) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &ObjectKey) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
