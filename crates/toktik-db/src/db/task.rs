use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use toktik_core::models::TaskStatus;

/// Channel the encoder listens on for new work.
pub const NEW_TASK_CHANNEL: &str = "toktik_new_task";

/// Row returned when a task is queued.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueuedTask {
    pub id: Uuid,
    pub task_type: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending task and wake listening workers.
    #[tracing::instrument(skip(self, payload))]
    pub async fn create_task(
        &self,
        task_type: &str,
        payload: serde_json::Value,
        max_retries: i32,
        timeout_seconds: i32,
    ) -> Result<QueuedTask> {
        let task = sqlx::query_as::<Postgres, QueuedTask>(
            r#"
            INSERT INTO tasks (task_type, status, payload, max_retries, timeout_seconds)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, task_type, status, created_at
            "#,
        )
        .bind(task_type)
        .bind(TaskStatus::Pending)
        .bind(payload)
        .bind(max_retries)
        .bind(timeout_seconds)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                task_type = %task_type,
                "Failed to insert task into database"
            );
            anyhow::anyhow!("Failed to insert task into database: {}", e)
        })?;

        // Non-fatal: workers also poll the table.
        if let Err(e) = sqlx::query("SELECT pg_notify($1, $2)")
            .bind(NEW_TASK_CHANNEL)
            .bind(task.id.to_string())
            .execute(&self.pool)
            .await
        {
            tracing::warn!(
                error = %e,
                task_id = %task.id,
                "Failed to send pg_notify for new task, workers will discover task via polling"
            );
        }

        tracing::info!(
            task_id = %task.id,
            task_type = %task_type,
            "Task created"
        );

        Ok(task)
    }
}
