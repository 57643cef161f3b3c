use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use toktik_core::models::ObjectKey;
use toktik_core::AppError;

use crate::constants::{MANIFEST_CACHE_CONTROL, MANIFEST_CONTENT_TYPE};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::VideoState;

/// Playable HLS playlist with every segment replaced by a short-lived URL
#[utoipa::path(
    get,
    path = "/users/{user}/videos/{video}",
    tag = "videos",
    params(
        ("user" = String, Path, description = "Owner username (case-insensitive)"),
        ("video" = String, Path, description = "Video key")
    ),
    responses(
        (status = 200, description = "Rewritten HLS playlist", content_type = "application/vnd.apple.mpegurl"),
        (status = 400, description = "Unsafe path segment", body = ErrorResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse),
        (status = 502, description = "Storage or segment signing failure", body = ErrorResponse),
        (status = 504, description = "Signing deadline exceeded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(videos))]
pub async fn stream_manifest(
    State(videos): State<VideoState>,
    Path((user, video)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = user.to_lowercase();
    let root = ObjectKey::video_root(&user, &video).map_err(AppError::from)?;

    let playlist = videos.manifests.rewrite(&root).await?;

    Ok((
        [
            (header::CONTENT_TYPE, MANIFEST_CONTENT_TYPE),
            (header::CACHE_CONTROL, MANIFEST_CACHE_CONTROL),
        ],
        playlist,
    ))
}
