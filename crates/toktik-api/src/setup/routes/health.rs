//! Health check handler and response type.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use toktik_core::models::ObjectKey;

const TIMEOUT: Duration = Duration::from_secs(5);
const STORAGE_PROBE_KEY: &str = "health-check/non-existent-key";

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

/// Database and storage reachability. Storage trouble only degrades the
/// status; an unreachable database makes the service unhealthy.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    let database = match state.pool.clone() {
        Some(pool) => {
            run_check(
                TIMEOUT,
                async move { sqlx::query("SELECT 1").execute(&pool).await.map(drop) },
                "unhealthy",
            )
            .await
        }
        None => "not_configured".to_string(),
    };

    let storage = state.storage.storage.clone();
    let storage = run_check(
        TIMEOUT,
        async move {
            let probe = ObjectKey::parse(STORAGE_PROBE_KEY).map_err(|e| e.to_string())?;
            storage
                .exists(&probe)
                .await
                .map(drop)
                .map_err(|e| e.to_string())
        },
        "degraded",
    )
    .await;

    let database_ok = database == "healthy" || database == "not_configured";
    let status = if !database_ok {
        "unhealthy"
    } else if storage != "healthy" {
        "degraded"
    } else {
        "healthy"
    };

    let status_code = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: status.to_string(),
            database,
            storage,
        }),
    )
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}
