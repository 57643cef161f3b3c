//! Types used by the upload pipeline

use chrono::{DateTime, Utc};
use thiserror::Error;
use toktik_core::models::{KeyError, ObjectKey, TaskInfo};
use toktik_core::AppError;
use toktik_storage::CapabilityError;
use uuid::Uuid;

/// Write capability handed to a client that wants to upload a video.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    /// Signed PUT URL
    pub url: String,
    /// Full object key the URL writes to (`users/<user>/videos/<video_key>/vid`)
    pub key: ObjectKey,
    /// Random 100-character key the client presents again on confirmation
    pub video_key: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a confirmed upload.
#[derive(Debug, Clone)]
pub struct ConfirmedUpload {
    pub video_id: Uuid,
    /// Bare video key, also when the client confirmed with the full object key
    pub video_key: String,
    pub task: TaskInfo,
}

/// Failures of the upload pipeline.
///
/// `Metadata` and `Queue` are kept apart: a `Queue` failure means the video
/// record already exists without an encode task.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("metadata store failure: {0}")]
    Metadata(String),

    #[error("encode task submission failed: {0}")]
    Queue(String),
}

impl From<KeyError> for UploadError {
    fn from(err: KeyError) -> Self {
        UploadError::BadRequest(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::BadRequest(msg) => AppError::BadRequest(msg),
            UploadError::Capability(e) => AppError::from(e),
            UploadError::Metadata(msg) => AppError::Metadata(msg),
            UploadError::Queue(msg) => AppError::Queue(msg),
        }
    }
}
