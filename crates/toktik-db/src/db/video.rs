use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use toktik_core::models::{VideoRecord, VideoWithOwner};

/// Columns selected for `VideoWithOwner` rows.
const VIDEO_WITH_OWNER_COLUMNS: &str = r#"
    v.id,
    v.owner_id,
    u.username,
    v.display_name,
    v.video_key,
    v.view_count,
    v.created_at
"#;

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(video_key_len = video_key.len()))]
    pub async fn create(
        &self,
        display_name: &str,
        video_key: &str,
        owner_id: Uuid,
    ) -> Result<VideoRecord> {
        let video = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            INSERT INTO videos (owner_id, display_name, video_key)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, display_name, video_key, view_count, created_at
            "#,
        )
        .bind(owner_id)
        .bind(display_name)
        .bind(video_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                owner_id = %owner_id,
                "Failed to insert video into database"
            );
            anyhow::anyhow!("Failed to insert video into database: {}", e)
        })?;

        tracing::info!(
            video_id = %video.id,
            owner_id = %owner_id,
            "Video record created"
        );

        Ok(video)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_video(
        &self,
        username: &str,
        video_key: &str,
    ) -> Result<Option<VideoWithOwner>> {
        let query = format!(
            r#"
            SELECT {VIDEO_WITH_OWNER_COLUMNS}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE u.username = $1 AND v.video_key = $2
            "#
        );
        sqlx::query_as::<Postgres, VideoWithOwner>(&query)
            .bind(username)
            .bind(video_key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch video")
    }

    #[tracing::instrument(skip(self))]
    pub async fn increment_view_count(&self, video_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE videos SET view_count = view_count + 1 WHERE id = $1")
            .bind(video_id)
            .execute(&self.pool)
            .await
            .context("Failed to increment view count")?;
        Ok(())
    }

    /// Most viewed first, newest first among equal view counts. `page` is 0-based.
    #[tracing::instrument(skip(self))]
    pub async fn top_popular(&self, page: i64, amount: i64) -> Result<Vec<VideoWithOwner>> {
        let query = format!(
            r#"
            SELECT {VIDEO_WITH_OWNER_COLUMNS}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            ORDER BY v.view_count DESC, v.created_at DESC
            LIMIT $1 OFFSET $2
            "#
        );
        sqlx::query_as::<Postgres, VideoWithOwner>(&query)
            .bind(amount)
            .bind(page_offset(page, amount))
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch popular videos")
    }

    /// 1-based popularity rank, same ordering as [`Self::top_popular`].
    #[tracing::instrument(skip(self))]
    pub async fn by_rank(&self, rank: i64) -> Result<Option<VideoWithOwner>> {
        if rank < 1 {
            return Ok(None);
        }
        let query = format!(
            r#"
            SELECT {VIDEO_WITH_OWNER_COLUMNS}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            ORDER BY v.view_count DESC, v.created_at DESC
            LIMIT 1 OFFSET $1
            "#
        );
        sqlx::query_as::<Postgres, VideoWithOwner>(&query)
            .bind(rank - 1)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch video by rank")
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_by_username(&self, username: &str) -> Result<Vec<VideoWithOwner>> {
        let query = format!(
            r#"
            SELECT {VIDEO_WITH_OWNER_COLUMNS}
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE u.username = $1
            ORDER BY v.created_at DESC
            "#
        );
        sqlx::query_as::<Postgres, VideoWithOwner>(&query)
            .bind(username)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch user videos")
    }
}

fn page_offset(page: i64, amount: i64) -> i64 {
    page.max(0).saturating_mul(amount.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(3, 10), 30);
        assert_eq!(page_offset(-1, 10), 0);
        assert_eq!(page_offset(i64::MAX, 2), i64::MAX);
    }
}
