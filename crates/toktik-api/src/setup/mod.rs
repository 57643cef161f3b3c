//! Application setup and initialization
//!
//! Everything `main` needs to go from a validated [`Config`] to a served
//! router: telemetry, database, storage, services and routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use toktik_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let (storage, url_signer) = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, pool, storage, url_signer);
    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
