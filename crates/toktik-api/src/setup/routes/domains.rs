//! Domain route groups.

use crate::constants::OBJECTS_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", get(handlers::upload::get_upload_url))
        .route("/save", axum::routing::post(handlers::upload::save_video))
}

pub fn video_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/users/{user}/videos/{video}",
            get(handlers::video_stream::stream_manifest),
        )
        .route(
            "/users/{user}/videos",
            get(handlers::feed::list_user_videos),
        )
        .route(
            "/videos/{user}/{video}",
            get(handlers::video_info::get_video_info),
        )
        .route(
            "/watch/{user}/{video}",
            get(handlers::video_info::watch_video),
        )
        .route("/feed/{page}/{amount}", get(handlers::feed::get_feed))
        .route("/rank/{rank}", get(handlers::feed::get_video_by_rank))
}

/// Only mounted when the backend issues self-served URLs.
pub fn object_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        &format!("{}/{{*key}}", OBJECTS_PREFIX),
        get(handlers::local_object::get_object).put(handlers::local_object::put_object),
    )
}
