//! Manifest rewriting
//!
//! Reads a stored HLS playlist line by line and replaces every segment
//! reference with a short-lived read capability. Signing runs concurrently,
//! one task per segment line; output order always follows the stored order.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::TryStreamExt;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio::task::JoinSet;
use tokio_util::io::StreamReader;
use toktik_core::models::{ObjectKey, Operation, PlaylistLine};
use toktik_core::AppError;
use toktik_storage::{CapabilityIssuer, Storage, StorageError};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {0}")]
    NotFound(String),

    #[error("failed to fetch manifest: {0}")]
    Storage(String),

    #[error("failed to read manifest: {0}")]
    Read(String),

    #[error("failed to sign line {index} ({key}): {reason}")]
    PartialSigningFailure {
        index: usize,
        key: String,
        reason: String,
    },

    #[error("manifest signing did not finish within {0:?}")]
    Timeout(Duration),
}

impl From<ManifestError> for AppError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::NotFound(key) => AppError::NotFound(format!("Video not found: {}", key)),
            ManifestError::Storage(msg) | ManifestError::Read(msg) => AppError::Storage(msg),
            ManifestError::PartialSigningFailure { index, key, reason } => {
                AppError::PartialSigningFailure(format!("line {} ({}): {}", index, key, reason))
            }
            ManifestError::Timeout(deadline) => AppError::Timeout(format!(
                "Manifest signing exceeded {} seconds",
                deadline.as_secs()
            )),
        }
    }
}

#[derive(Clone)]
pub struct ManifestRewriter {
    storage: Arc<dyn Storage>,
    issuer: CapabilityIssuer,
    read_lifetime: Duration,
    deadline: Duration,
}

impl ManifestRewriter {
    pub fn new(
        storage: Arc<dyn Storage>,
        issuer: CapabilityIssuer,
        read_lifetime: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            storage,
            issuer,
            read_lifetime,
            deadline,
        }
    }

    /// Produce a playable copy of `<root>/vid.m3u8`.
    ///
    /// Every line starting with `vid` becomes a read capability for
    /// `<root>/<line>`; all other lines pass through unchanged. A single
    /// signing failure fails the whole rewrite. Dropping the returned future
    /// aborts any signing still in flight.
    #[tracing::instrument(skip_all, fields(root = %root))]
    pub async fn rewrite(&self, root: &ObjectKey) -> Result<Bytes, ManifestError> {
        match tokio::time::timeout(self.deadline, self.rewrite_lines(root)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "Manifest rewrite timed out");
                Err(ManifestError::Timeout(self.deadline))
            }
        }
    }

    async fn rewrite_lines(&self, root: &ObjectKey) -> Result<Bytes, ManifestError> {
        let manifest_key = root.manifest();
        let stream = self
            .storage
            .download_stream(&manifest_key)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => ManifestError::NotFound(manifest_key.to_string()),
                other => ManifestError::Storage(other.to_string()),
            })?;

        let mut lines = StreamReader::new(stream.map_err(io::Error::other)).split(b'\n');

        // Directive lines are filled immediately; segment slots stay empty
        // until their signing task reports back.
        let mut slots: Vec<Option<Vec<u8>>> = Vec::new();
        let mut pending: HashMap<tokio::task::Id, (usize, ObjectKey)> = HashMap::new();
        let mut signing = JoinSet::new();

        while let Some(raw) = lines
            .next_segment()
            .await
            .map_err(|e| ManifestError::Read(e.to_string()))?
        {
            let line = PlaylistLine::classify(slots.len(), raw);
            if !line.is_segment_reference() {
                slots.push(Some(line.content));
                continue;
            }

            let key = line
                .as_text()
                .ok_or_else(|| "segment name is not valid UTF-8".to_string())
                .and_then(|name| root.join(name).map_err(|e| e.to_string()))
                .map_err(|reason| ManifestError::PartialSigningFailure {
                    index: line.index,
                    key: format!("{}/{}", root, String::from_utf8_lossy(&line.content)),
                    reason,
                })?;

            let issuer = self.issuer.clone();
            let lifetime = self.read_lifetime;
            let index = line.index;
            let task_key = key.clone();
            let handle = signing.spawn(async move {
                let signed = issuer
                    .issue(&task_key, Operation::Read, lifetime)
                    .await
                    .map(|capability| capability.url);
                (index, signed)
            });
            pending.insert(handle.id(), (index, key));
            slots.push(None);
        }

        let segment_count = pending.len();

        while let Some(joined) = signing.join_next_with_id().await {
            match joined {
                Ok((id, (index, Ok(url)))) => {
                    pending.remove(&id);
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(url.into_bytes());
                    }
                }
                Ok((id, (index, Err(e)))) => {
                    let key = pending
                        .remove(&id)
                        .map(|(_, key)| key.into_string())
                        .unwrap_or_default();
                    tracing::warn!(index, key = %key, error = %e, "Segment signing failed");
                    return Err(ManifestError::PartialSigningFailure {
                        index,
                        key,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    let (index, key) = pending
                        .remove(&e.id())
                        .map(|(index, key)| (index, key.into_string()))
                        .unwrap_or_default();
                    tracing::error!(key = %key, error = %e, "Segment signing task did not complete");
                    return Err(ManifestError::PartialSigningFailure {
                        index,
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let line_count = slots.len();
        let mut output = Vec::new();
        for (index, slot) in slots.into_iter().enumerate() {
            let content = slot.ok_or_else(|| ManifestError::PartialSigningFailure {
                index,
                key: String::new(),
                reason: "segment was never signed".to_string(),
            })?;
            output.extend_from_slice(&content);
            output.push(b'\n');
        }

        tracing::debug!(
            lines = line_count,
            segments = segment_count,
            "Manifest rewritten"
        );

        Ok(Bytes::from(output))
    }
}
