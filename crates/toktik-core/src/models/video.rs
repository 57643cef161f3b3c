use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// A confirmed upload. `video_key` is the random key under the owner's video root.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub display_name: String,
    pub video_key: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoWithOwner {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub video_key: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl VideoWithOwner {
    pub fn from_record(record: VideoRecord, username: impl Into<String>) -> Self {
        Self {
            id: record.id,
            owner_id: record.owner_id,
            username: username.into(),
            display_name: record.display_name,
            video_key: record.video_key,
            view_count: record.view_count,
            created_at: record.created_at,
        }
    }
}
