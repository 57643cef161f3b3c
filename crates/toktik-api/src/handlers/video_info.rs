use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::VideoEntry;
use crate::state::VideoState;

#[utoipa::path(
    get,
    path = "/videos/{user}/{video}",
    tag = "videos",
    params(
        ("user" = String, Path, description = "Owner username"),
        ("video" = String, Path, description = "Video key")
    ),
    responses(
        (status = 200, description = "Video with thumbnail URL", body = VideoEntry),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(videos))]
pub async fn get_video_info(
    State(videos): State<VideoState>,
    Path((user, video)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entry = videos.catalogue.video_info(&user, &video).await?;
    Ok(Json(entry))
}

/// Same as video info, counting one view
#[utoipa::path(
    get,
    path = "/watch/{user}/{video}",
    tag = "videos",
    params(
        ("user" = String, Path, description = "Owner username"),
        ("video" = String, Path, description = "Video key")
    ),
    responses(
        (status = 200, description = "Video with thumbnail URL, view counted", body = VideoEntry),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(videos))]
pub async fn watch_video(
    State(videos): State<VideoState>,
    Path((user, video)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entry = videos.catalogue.watch(&user, &video).await?;
    Ok(Json(entry))
}
