use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use toktik_core::models::VideoWithOwner;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::services::VideoEntry;
use crate::state::VideoState;

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedResponse {
    pub entries: Vec<VideoEntry>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserVideosResponse {
    pub videos: Vec<VideoWithOwner>,
}

/// Most viewed videos, newest first among equals
#[utoipa::path(
    get,
    path = "/feed/{page}/{amount}",
    tag = "videos",
    params(
        ("page" = i64, Path, description = "0-based page"),
        ("amount" = i64, Path, description = "Page size, capped by FEED_MAX_PAGE_SIZE")
    ),
    responses(
        (status = 200, description = "Feed page", body = FeedResponse),
        (status = 400, description = "Invalid page or amount", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(videos))]
pub async fn get_feed(
    State(videos): State<VideoState>,
    Path((page, amount)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entries = videos.catalogue.feed(page, amount).await?;
    Ok(Json(FeedResponse { entries }))
}

#[utoipa::path(
    get,
    path = "/rank/{rank}",
    tag = "videos",
    params(("rank" = i64, Path, description = "1-based popularity rank")),
    responses(
        (status = 200, description = "Video at rank", body = VideoEntry),
        (status = 400, description = "Rank below 1", body = ErrorResponse),
        (status = 404, description = "No video at rank", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(videos))]
pub async fn get_video_by_rank(
    State(videos): State<VideoState>,
    Path(rank): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let entry = videos.catalogue.by_rank(rank).await?;
    Ok(Json(entry))
}

#[utoipa::path(
    get,
    path = "/users/{user}/videos",
    tag = "videos",
    params(("user" = String, Path, description = "Owner username")),
    responses(
        (status = 200, description = "The user's videos", body = UserVideosResponse),
        (status = 400, description = "Unsafe username", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(videos))]
pub async fn list_user_videos(
    State(videos): State<VideoState>,
    Path(user): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let listing = videos.catalogue.user_videos(&user).await?;
    Ok(Json(UserVideosResponse { videos: listing }))
}
