//! Video info, views, feed, rank and per-user listings.
//!
//! Run with: `cargo test -p toktik-api --test catalogue_test`

mod helpers;

use helpers::{setup_test_app, TestApp};

async fn seeded_app() -> TestApp {
    let app = setup_test_app().await;
    app.metadata.add_user("alice");
    app.metadata.add_user("bob");
    app.metadata.add_video("alice", "low", 1, 50);
    app.metadata.add_video("alice", "top", 90, 40);
    app.metadata.add_video("bob", "tie_old", 10, 30);
    app.metadata.add_video("bob", "tie_new", 10, 20);
    app.metadata.add_video("bob", "mid", 5, 10);
    app.metadata.add_video("alice", "fresh", 0, 0);
    app.metadata.add_video("bob", "zero_old", 0, 60);
    app
}

fn video_keys(entries: &serde_json::Value) -> Vec<String> {
    entries
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| entry["video"]["video_key"].as_str().expect("key").to_string())
        .collect()
}

#[tokio::test]
async fn test_video_info_carries_thumbnail_capability() {
    let app = seeded_app().await;

    let response = app.client().get("/videos/alice/top").await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["video"]["username"], "alice");
    assert_eq!(json["video"]["view_count"], 90);
    assert_eq!(json["thumbnail"]["key"], "users/alice/videos/top/thumbnail");
    assert_eq!(json["thumbnail"]["operation"], "read");

    let thumbnail_url = json["thumbnail"]["url"].as_str().expect("url");
    assert!(thumbnail_url.starts_with(&format!(
        "{}/users/alice/videos/top/thumbnail?",
        helpers::OBJECTS_BASE_URL
    )));
}

#[tokio::test]
async fn test_video_info_does_not_count_views() {
    let app = seeded_app().await;

    app.client().get("/videos/alice/top").await;
    let json = app
        .client()
        .get("/videos/alice/top")
        .await
        .json::<serde_json::Value>();

    assert_eq!(json["video"]["view_count"], 90);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = seeded_app().await;

    let response = app.client().get("/videos/alice/nope").await;

    assert_eq!(response.status_code(), 404);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_watch_counts_one_view() {
    let app = seeded_app().await;

    let first = app
        .client()
        .get("/watch/bob/mid")
        .await
        .json::<serde_json::Value>();
    assert_eq!(first["video"]["view_count"], 6);

    let second = app
        .client()
        .get("/watch/bob/mid")
        .await
        .json::<serde_json::Value>();
    assert_eq!(second["video"]["view_count"], 7);

    let stored = app
        .metadata
        .videos()
        .into_iter()
        .find(|video| video.video_key == "mid")
        .expect("video");
    assert_eq!(stored.view_count, 7);
}

#[tokio::test]
async fn test_feed_orders_by_views_then_recency() {
    let app = seeded_app().await;

    let response = app.client().get("/feed/0/3").await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<serde_json::Value>();
    assert_eq!(video_keys(&json["entries"]), ["top", "tie_new", "tie_old"]);

    let next = app
        .client()
        .get("/feed/1/3")
        .await
        .json::<serde_json::Value>();
    assert_eq!(video_keys(&next["entries"]), ["mid", "low", "fresh"]);
}

#[tokio::test]
async fn test_feed_page_size_is_capped() {
    let app = seeded_app().await;

    let json = app
        .client()
        .get("/feed/0/500")
        .await
        .json::<serde_json::Value>();

    assert_eq!(json["entries"].as_array().expect("array").len(), 5);
}

#[tokio::test]
async fn test_feed_past_the_end_is_empty() {
    let app = seeded_app().await;

    let json = app
        .client()
        .get("/feed/9/5")
        .await
        .json::<serde_json::Value>();

    assert!(json["entries"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_feed_rejects_invalid_paging() {
    let app = seeded_app().await;

    assert_eq!(app.client().get("/feed/-1/5").await.status_code(), 400);
    assert_eq!(app.client().get("/feed/0/0").await.status_code(), 400);
}

#[tokio::test]
async fn test_rank_is_one_based() {
    let app = seeded_app().await;

    let first = app
        .client()
        .get("/rank/1")
        .await
        .json::<serde_json::Value>();
    assert_eq!(first["video"]["video_key"], "top");

    let third = app
        .client()
        .get("/rank/3")
        .await
        .json::<serde_json::Value>();
    assert_eq!(third["video"]["video_key"], "tie_old");
}

#[tokio::test]
async fn test_rank_bounds() {
    let app = seeded_app().await;

    assert_eq!(app.client().get("/rank/0").await.status_code(), 400);
    assert_eq!(app.client().get("/rank/100").await.status_code(), 404);
}

#[tokio::test]
async fn test_user_videos_lists_only_that_user() {
    let app = seeded_app().await;

    let response = app.client().get("/users/alice/videos").await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<serde_json::Value>();
    let videos = json["videos"].as_array().expect("array");
    assert_eq!(videos.len(), 3);
    assert!(videos.iter().all(|video| video["username"] == "alice"));
}

#[tokio::test]
async fn test_metadata_outage_is_reported() {
    let app = seeded_app().await;
    app.metadata.set_failing(true);

    let response = app.client().get("/feed/0/5").await;

    assert_eq!(response.status_code(), 500);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], "METADATA_ERROR");
}

#[tokio::test]
async fn test_health_without_database() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "not_configured");
    assert_eq!(json["storage"], "healthy");

    let live = app.client().get("/live").await;
    assert_eq!(live.status_code(), 200);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let json = response.json::<serde_json::Value>();
    assert!(json["paths"]["/feed/{page}/{amount}"].is_object());
}
