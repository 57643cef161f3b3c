//! Upload pipeline coordinator
//!
//! `begin_upload` hands out a write capability for a fresh random key;
//! `confirm_upload` records the video and submits the encode task. The two
//! confirmation side effects are separate steps, not a transaction.

use std::sync::Arc;
use std::time::Duration;

use toktik_core::models::{validate_segment, EncodeTask, ObjectKey, Operation};
use toktik_db::MetadataStore;
use toktik_storage::keys::generate_video_key;
use toktik_storage::CapabilityIssuer;
use toktik_worker::EncodeQueue;

use super::types::{ConfirmedUpload, UploadError, UploadTicket};

#[derive(Clone)]
pub struct UploadCoordinator {
    issuer: CapabilityIssuer,
    metadata: Arc<dyn MetadataStore>,
    queue: Arc<dyn EncodeQueue>,
    upload_lifetime: Duration,
}

impl UploadCoordinator {
    pub fn new(
        issuer: CapabilityIssuer,
        metadata: Arc<dyn MetadataStore>,
        queue: Arc<dyn EncodeQueue>,
        upload_lifetime: Duration,
    ) -> Self {
        Self {
            issuer,
            metadata,
            queue,
            upload_lifetime,
        }
    }

    /// Issue a write capability for `users/<username>/videos/<random>/vid`.
    #[tracing::instrument(skip(self))]
    pub async fn begin_upload(&self, username: &str) -> Result<UploadTicket, UploadError> {
        require("username", username)?;
        validate_segment(username)?;

        let video_key = generate_video_key();
        let key = ObjectKey::upload_target(username, &video_key)?;
        let capability = self
            .issuer
            .issue(&key, Operation::Write, self.upload_lifetime)
            .await?;

        tracing::info!(
            key = %capability.key,
            expires_at = %capability.expires_at,
            "Upload capability issued"
        );

        Ok(UploadTicket {
            url: capability.url,
            key: capability.key,
            video_key,
            expires_at: capability.expires_at,
        })
    }

    /// Record a finished upload and queue it for encoding.
    ///
    /// `object_key` is either the bare video key from [`begin_upload`](Self::begin_upload)
    /// or the full upload target `users/<username>/videos/<video_key>/vid`.
    ///
    /// Nothing is rolled back: if the queue rejects the task, the video
    /// record stays and the failure is reported as [`UploadError::Queue`].
    #[tracing::instrument(skip(self, object_key))]
    pub async fn confirm_upload(
        &self,
        username: &str,
        display_name: &str,
        object_key: &str,
    ) -> Result<ConfirmedUpload, UploadError> {
        require("username", username)?;
        require("display name", display_name)?;
        require("video key", object_key)?;
        validate_segment(username)?;
        let video_key = resolve_video_key(username, object_key)?;

        let owner = self
            .metadata
            .get_user_by_name(username)
            .await
            .map_err(|e| UploadError::Metadata(e.to_string()))?
            .ok_or_else(|| UploadError::Metadata(format!("unknown user: {}", username)))?;

        let video = self
            .metadata
            .create_video(display_name, &video_key, owner.id)
            .await
            .map_err(|e| UploadError::Metadata(e.to_string()))?;

        tracing::info!(video_id = %video.id, "Video record created");

        let task = EncodeTask::new(username, video_key.as_str());
        let info = self.queue.enqueue(task).await.map_err(|e| {
            tracing::error!(
                video_id = %video.id,
                error = %e,
                "Encode task submission failed; video record exists without an encode task"
            );
            UploadError::Queue(e.to_string())
        })?;

        tracing::info!(video_id = %video.id, task_id = %info.id, "Encode task queued");

        Ok(ConfirmedUpload {
            video_id: video.id,
            video_key,
            task: info,
        })
    }
}

/// Bare video key from either accepted confirmation form.
fn resolve_video_key(username: &str, raw: &str) -> Result<String, UploadError> {
    if !raw.contains('/') {
        validate_segment(raw)?;
        return Ok(raw.to_string());
    }

    let key = ObjectKey::parse(raw)?;
    key.upload_video_key(username)
        .map(str::to_string)
        .ok_or_else(|| {
            UploadError::BadRequest(format!("{} is not an upload target of {}", key, username))
        })
}

fn require(field: &str, value: &str) -> Result<(), UploadError> {
    if value.trim().is_empty() {
        return Err(UploadError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{FakeMetadataStore, FakeQueue, MemoryStorage};
    use toktik_storage::keys::is_video_key;

    fn coordinator(
        metadata: Arc<FakeMetadataStore>,
        queue: Arc<FakeQueue>,
    ) -> UploadCoordinator {
        UploadCoordinator::new(
            CapabilityIssuer::new(Arc::new(MemoryStorage::new())),
            metadata,
            queue,
            Duration::from_secs(86_400),
        )
    }

    #[tokio::test]
    async fn test_begin_upload_issues_write_capability() {
        let coordinator = coordinator(
            Arc::new(FakeMetadataStore::default()),
            Arc::new(FakeQueue::default()),
        );

        let ticket = coordinator.begin_upload("alice").await.unwrap();

        assert!(is_video_key(&ticket.video_key));
        assert_eq!(
            ticket.key.as_str(),
            format!("users/alice/videos/{}/vid", ticket.video_key)
        );
        assert_eq!(
            ticket.url,
            MemoryStorage::expected_url(ticket.key.as_str(), Operation::Write)
        );
    }

    #[tokio::test]
    async fn test_begin_upload_generates_fresh_keys() {
        let coordinator = coordinator(
            Arc::new(FakeMetadataStore::default()),
            Arc::new(FakeQueue::default()),
        );

        let first = coordinator.begin_upload("alice").await.unwrap();
        let second = coordinator.begin_upload("alice").await.unwrap();
        assert_ne!(first.video_key, second.video_key);
    }

    #[tokio::test]
    async fn test_begin_upload_rejects_unsafe_username() {
        let coordinator = coordinator(
            Arc::new(FakeMetadataStore::default()),
            Arc::new(FakeQueue::default()),
        );

        for username in ["", "  ", "../bob", "a/b", ".."] {
            let err = coordinator.begin_upload(username).await.unwrap_err();
            assert!(
                matches!(err, UploadError::BadRequest(_)),
                "{:?} accepted",
                username
            );
        }
    }

    #[tokio::test]
    async fn test_confirm_upload_records_and_enqueues() {
        let metadata = Arc::new(FakeMetadataStore::with_user("alice"));
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata.clone(), queue.clone());

        let confirmed = coordinator
            .confirm_upload("alice", "myclip", "abc123")
            .await
            .unwrap();

        assert_eq!(confirmed.task.task_type, "video:save");
        assert_eq!(confirmed.video_key, "abc123");
        assert_eq!(metadata.video_count(), 1);
        assert_eq!(queue.submitted(), vec![EncodeTask::new("alice", "abc123")]);
    }

    #[tokio::test]
    async fn test_confirm_upload_metadata_failure_skips_queue() {
        let metadata = Arc::new(FakeMetadataStore::failing());
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata, queue.clone());

        let err = coordinator
            .confirm_upload("alice", "myclip", "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Metadata(_)));
        assert!(queue.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_upload_with_object_key_and_failing_metadata() {
        let metadata = Arc::new(FakeMetadataStore::failing());
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata, queue.clone());

        let err = coordinator
            .confirm_upload("alice", "myclip", "users/alice/videos/xyz/vid")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Metadata(_)));
        assert!(queue.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_upload_accepts_full_object_key() {
        let metadata = Arc::new(FakeMetadataStore::with_user("alice"));
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata.clone(), queue.clone());

        let confirmed = coordinator
            .confirm_upload("alice", "myclip", "users/alice/videos/xyz/vid")
            .await
            .unwrap();

        assert_eq!(confirmed.video_key, "xyz");
        assert_eq!(metadata.video_count(), 1);
        assert_eq!(queue.submitted(), vec![EncodeTask::new("alice", "xyz")]);
    }

    #[tokio::test]
    async fn test_confirm_upload_rejects_foreign_object_key() {
        let metadata = Arc::new(FakeMetadataStore::with_user("alice"));
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata.clone(), queue.clone());

        for key in [
            "users/bob/videos/xyz/vid",
            "users/alice/videos/xyz/thumbnail",
            "users/alice/videos/../vid",
        ] {
            let err = coordinator
                .confirm_upload("alice", "myclip", key)
                .await
                .unwrap_err();
            assert!(matches!(err, UploadError::BadRequest(_)), "{key}");
        }
        assert_eq!(metadata.video_count(), 0);
        assert!(queue.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_upload_unknown_user_is_metadata_error() {
        let metadata = Arc::new(FakeMetadataStore::with_user("alice"));
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata.clone(), queue.clone());

        let err = coordinator
            .confirm_upload("bob", "myclip", "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Metadata(_)));
        assert_eq!(metadata.video_count(), 0);
        assert!(queue.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_upload_queue_failure_keeps_record() {
        let metadata = Arc::new(FakeMetadataStore::with_user("alice"));
        let queue = Arc::new(FakeQueue::failing());
        let coordinator = coordinator(metadata.clone(), queue.clone());

        let err = coordinator
            .confirm_upload("alice", "myclip", "abc123")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Queue(_)));
        assert_eq!(metadata.video_count(), 1);
        assert_eq!(queue.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_upload_validates_inputs() {
        let metadata = Arc::new(FakeMetadataStore::with_user("alice"));
        let queue = Arc::new(FakeQueue::default());
        let coordinator = coordinator(metadata.clone(), queue.clone());

        for (user, name, key) in [
            ("", "myclip", "abc"),
            ("alice", "", "abc"),
            ("alice", "myclip", ""),
            ("alice", "myclip", "../abc"),
        ] {
            let err = coordinator.confirm_upload(user, name, key).await.unwrap_err();
            assert!(matches!(err, UploadError::BadRequest(_)));
        }
        assert_eq!(metadata.video_count(), 0);
        assert!(queue.submitted().is_empty());
    }
}
