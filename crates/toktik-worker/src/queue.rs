//! Task queue submission.
//!
//! Delivery is at-least-once from the encoder's point of view: a submitted
//! row stays `pending` until a worker claims it.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use toktik_core::models::{EncodeTask, TaskInfo};
use toktik_db::TaskRepository;

/// Opaque submission boundary used by the upload pipeline.
#[async_trait]
pub trait EncodeQueue: Send + Sync {
    async fn enqueue(&self, task: EncodeTask) -> Result<TaskInfo>;
}

#[derive(Clone, Debug)]
pub struct TaskQueueConfig {
    pub default_timeout_seconds: i32,
    pub max_retries: i32,
}

impl Default for TaskQueueConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: 3600,
            max_retries: 3,
        }
    }
}

impl TaskQueueConfig {
    pub fn from_config(config: &toktik_core::Config) -> Self {
        Self {
            default_timeout_seconds: config.task_timeout_seconds(),
            max_retries: config.task_max_retries(),
        }
    }
}

#[derive(Clone)]
pub struct TaskQueue {
    repository: TaskRepository,
    config: TaskQueueConfig,
}

impl TaskQueue {
    pub fn new(repository: TaskRepository, config: TaskQueueConfig) -> Self {
        Self { repository, config }
    }

    /// Submit a task of any type; returns its id and queue timestamp.
    #[tracing::instrument(skip(self, payload))]
    pub async fn submit_task(&self, task_type: &str, payload: JsonValue) -> Result<TaskInfo> {
        let task = self
            .repository
            .create_task(
                task_type,
                payload,
                self.config.max_retries,
                self.config.default_timeout_seconds,
            )
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    task_type = %task_type,
                    "Failed to create task in repository"
                );
                anyhow::anyhow!("Failed to create task in repository: {}", e)
            })?;

        tracing::info!(
            task_id = %task.id,
            task_type = %task_type,
            "Task submitted to queue"
        );

        Ok(TaskInfo {
            id: task.id,
            task_type: task.task_type,
            queued_at: task.created_at,
        })
    }
}

#[async_trait]
impl EncodeQueue for TaskQueue {
    async fn enqueue(&self, task: EncodeTask) -> Result<TaskInfo> {
        self.submit_task(task.task_type(), task.payload()).await
    }
}
