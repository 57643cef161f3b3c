use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::ENCODE_TASK_TYPE;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "text", rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
        }
    }
}

/// Message consumed by the external encoder: which raw upload to segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeTask {
    pub owner_username: String,
    pub video_key: String,
}

impl EncodeTask {
    pub fn new(owner_username: impl Into<String>, video_key: impl Into<String>) -> Self {
        Self {
            owner_username: owner_username.into(),
            video_key: video_key.into(),
        }
    }

    pub fn task_type(&self) -> &'static str {
        ENCODE_TASK_TYPE
    }

    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "owner_username": self.owner_username,
            "video_key": self.video_key,
        })
    }
}

/// Receipt returned by the queue on submit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskInfo {
    pub id: Uuid,
    pub task_type: String,
    pub queued_at: DateTime<Utc>,
}
