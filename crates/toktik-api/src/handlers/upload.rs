use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlResponse {
    /// Signed PUT URL for the raw video
    pub url: String,
    /// Random video key to present to `/save` once the upload finished
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveVideoRequest {
    /// Display name of the video
    pub file_name: String,
    /// Key returned by `/upload`, or the full object key
    /// `users/<user>/videos/<key>/vid` the upload was written to
    pub video_key: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveVideoResponse {
    pub task_id: Uuid,
    #[serde(rename = "type")]
    pub task_type: String,
    pub user: String,
    pub video: String,
    pub queued_at: DateTime<Utc>,
}

/// Issue a write capability for a new video upload
#[utoipa::path(
    get,
    path = "/upload",
    tag = "uploads",
    params(
        ("x-username" = String, Header, description = "Caller, injected by the authenticating proxy")
    ),
    responses(
        (status = 200, description = "Write capability issued", body = UploadUrlResponse),
        (status = 400, description = "Missing or unsafe username", body = ErrorResponse),
        (status = 500, description = "Signing backend misconfigured", body = ErrorResponse),
        (status = 502, description = "Signing rejected", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(username = %identity.username))]
pub async fn get_upload_url(
    identity: UserIdentity,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let ticket = state.videos.uploads.begin_upload(&identity.username).await?;

    Ok(Json(UploadUrlResponse {
        url: ticket.url,
        key: ticket.video_key,
        expires_at: ticket.expires_at,
    }))
}

/// Confirm an upload: record the video and queue it for encoding
#[utoipa::path(
    post,
    path = "/save",
    tag = "uploads",
    request_body = SaveVideoRequest,
    params(
        ("x-username" = String, Header, description = "Caller, injected by the authenticating proxy")
    ),
    responses(
        (status = 200, description = "Video recorded and encode task queued", body = SaveVideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Metadata store failure", body = ErrorResponse),
        (status = 503, description = "Video recorded but encode task not queued", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(username = %identity.username, file_name = %request.file_name))]
pub async fn save_video(
    identity: UserIdentity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SaveVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let confirmed = state
        .videos
        .uploads
        .confirm_upload(&identity.username, &request.file_name, &request.video_key)
        .await?;

    Ok(Json(SaveVideoResponse {
        task_id: confirmed.task.id,
        task_type: confirmed.task.task_type,
        user: identity.username,
        video: confirmed.video_key,
        queued_at: confirmed.task.queued_at,
    }))
}
