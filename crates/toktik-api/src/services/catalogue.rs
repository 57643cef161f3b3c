//! Video catalogue: info, watch, feed, rank and per-user listings.
//!
//! Every single-video response carries a fresh read capability for the
//! video's thumbnail.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use toktik_core::models::{validate_segment, Capability, ObjectKey, Operation, VideoWithOwner};
use toktik_core::AppError;
use toktik_db::MetadataStore;
use toktik_storage::CapabilityIssuer;
use utoipa::ToSchema;

/// A video together with a read capability for its thumbnail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoEntry {
    pub video: VideoWithOwner,
    pub thumbnail: Capability,
}

#[derive(Clone)]
pub struct CatalogueService {
    metadata: Arc<dyn MetadataStore>,
    issuer: CapabilityIssuer,
    download_lifetime: Duration,
    max_page_size: i64,
}

impl CatalogueService {
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        issuer: CapabilityIssuer,
        download_lifetime: Duration,
        max_page_size: i64,
    ) -> Self {
        Self {
            metadata,
            issuer,
            download_lifetime,
            max_page_size,
        }
    }

    pub async fn video_info(
        &self,
        username: &str,
        video_key: &str,
    ) -> Result<VideoEntry, AppError> {
        validate_segment(username)?;
        validate_segment(video_key)?;

        let video = self
            .metadata
            .get_user_video(username, video_key)
            .await
            .map_err(metadata_error)?
            .ok_or_else(|| {
                AppError::NotFound(format!("Video {}/{} not found", username, video_key))
            })?;

        self.with_thumbnail(video).await
    }

    /// Same as [`video_info`](Self::video_info), counting one view.
    pub async fn watch(&self, username: &str, video_key: &str) -> Result<VideoEntry, AppError> {
        let mut entry = self.video_info(username, video_key).await?;

        self.metadata
            .increment_view_count(entry.video.id)
            .await
            .map_err(metadata_error)?;
        entry.video.view_count += 1;

        tracing::debug!(
            video_id = %entry.video.id,
            views = entry.video.view_count,
            "View counted"
        );
        Ok(entry)
    }

    /// Most viewed videos. `amount` is capped at the configured page size;
    /// entries whose thumbnail cannot be signed are skipped.
    pub async fn feed(&self, page: i64, amount: i64) -> Result<Vec<VideoEntry>, AppError> {
        if page < 0 {
            return Err(AppError::BadRequest("page must not be negative".to_string()));
        }
        if amount < 1 {
            return Err(AppError::BadRequest("amount must be at least 1".to_string()));
        }
        let amount = amount.min(self.max_page_size);

        let videos = self
            .metadata
            .top_popular_videos(page, amount)
            .await
            .map_err(metadata_error)?;

        let mut entries = Vec::with_capacity(videos.len());
        for video in videos {
            let video_id = video.id;
            match self.with_thumbnail(video).await {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(
                        video_id = %video_id,
                        error = %e,
                        "Skipping feed entry without thumbnail"
                    );
                }
            }
        }
        Ok(entries)
    }

    /// Video at 1-based popularity `rank`.
    pub async fn by_rank(&self, rank: i64) -> Result<VideoEntry, AppError> {
        if rank < 1 {
            return Err(AppError::BadRequest("rank must be at least 1".to_string()));
        }

        let video = self
            .metadata
            .video_by_rank(rank)
            .await
            .map_err(metadata_error)?
            .ok_or_else(|| AppError::NotFound(format!("No video at rank {}", rank)))?;

        self.with_thumbnail(video).await
    }

    pub async fn user_videos(&self, username: &str) -> Result<Vec<VideoWithOwner>, AppError> {
        validate_segment(username)?;
        self.metadata
            .user_videos(username)
            .await
            .map_err(metadata_error)
    }

    async fn with_thumbnail(&self, video: VideoWithOwner) -> Result<VideoEntry, AppError> {
        let key = ObjectKey::thumbnail(&video.username, &video.video_key)?;
        let thumbnail = self
            .issuer
            .issue(&key, Operation::Read, self.download_lifetime)
            .await?;
        Ok(VideoEntry { video, thumbnail })
    }
}

fn metadata_error(err: anyhow::Error) -> AppError {
    AppError::Metadata(err.to_string())
}
