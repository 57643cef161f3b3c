//! Metadata store abstraction
//!
//! The API depends on [`MetadataStore`] rather than on concrete repositories
//! so services can be exercised without a database.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use toktik_core::models::{User, VideoRecord, VideoWithOwner};

use crate::db::{UserRepository, VideoRepository};

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Look up a user by exact username.
    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>>;

    /// Record a confirmed upload.
    async fn create_video(
        &self,
        display_name: &str,
        video_key: &str,
        owner_id: Uuid,
    ) -> Result<VideoRecord>;

    async fn get_user_video(
        &self,
        username: &str,
        video_key: &str,
    ) -> Result<Option<VideoWithOwner>>;

    async fn increment_view_count(&self, video_id: Uuid) -> Result<()>;

    /// Most viewed first; `page` is 0-based.
    async fn top_popular_videos(&self, page: i64, amount: i64) -> Result<Vec<VideoWithOwner>>;

    /// 1-based popularity rank.
    async fn video_by_rank(&self, rank: i64) -> Result<Option<VideoWithOwner>>;

    async fn user_videos(&self, username: &str) -> Result<Vec<VideoWithOwner>>;
}

/// PostgreSQL-backed [`MetadataStore`].
#[derive(Clone)]
pub struct PgMetadataStore {
    users: UserRepository,
    videos: VideoRepository,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            videos: VideoRepository::new(pool),
        }
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>> {
        self.users.get_by_username(username).await
    }

    async fn create_video(
        &self,
        display_name: &str,
        video_key: &str,
        owner_id: Uuid,
    ) -> Result<VideoRecord> {
        self.videos.create(display_name, video_key, owner_id).await
    }

    async fn get_user_video(
        &self,
        username: &str,
        video_key: &str,
    ) -> Result<Option<VideoWithOwner>> {
        self.videos.get_user_video(username, video_key).await
    }

    async fn increment_view_count(&self, video_id: Uuid) -> Result<()> {
        self.videos.increment_view_count(video_id).await
    }

    async fn top_popular_videos(&self, page: i64, amount: i64) -> Result<Vec<VideoWithOwner>> {
        self.videos.top_popular(page, amount).await
    }

    async fn video_by_rank(&self, rank: i64) -> Result<Option<VideoWithOwner>> {
        self.videos.by_rank(rank).await
    }

    async fn user_videos(&self, username: &str) -> Result<Vec<VideoWithOwner>> {
        self.videos.list_by_username(username).await
    }
}
