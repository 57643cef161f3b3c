//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services;
use toktik_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TokTik API",
        version = "0.1.0",
        description = "Video hosting API: direct uploads through write capabilities, encode task submission, and HLS playlists whose segments are served through short-lived signed URLs."
    ),
    paths(
        // Uploads
        handlers::upload::get_upload_url,
        handlers::upload::save_video,
        // Videos
        handlers::video_stream::stream_manifest,
        handlers::video_info::get_video_info,
        handlers::video_info::watch_video,
        handlers::feed::get_feed,
        handlers::feed::get_video_by_rank,
        handlers::feed::list_user_videos,
        // Local backend objects
        handlers::local_object::get_object,
        handlers::local_object::put_object,
    ),
    components(
        schemas(
            error::ErrorResponse,
            handlers::upload::UploadUrlResponse,
            handlers::upload::SaveVideoRequest,
            handlers::upload::SaveVideoResponse,
            handlers::feed::FeedResponse,
            handlers::feed::UserVideosResponse,
            services::VideoEntry,
            models::VideoWithOwner,
            models::Capability,
            models::Operation,
            models::ObjectKey,
            models::TaskInfo,
        )
    ),
    tags(
        (name = "uploads", description = "Upload capabilities and confirmation"),
        (name = "videos", description = "Playlists, video info and feeds"),
        (name = "objects", description = "Self-served capability URLs (local storage backend)")
    )
)]
pub struct ApiDoc;
