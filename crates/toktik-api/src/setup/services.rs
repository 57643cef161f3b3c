//! Service wiring over the production backends

use sqlx::PgPool;
use std::sync::Arc;
use toktik_core::Config;
use toktik_db::{PgMetadataStore, TaskRepository};
use toktik_storage::{Storage, UrlSigner};
use toktik_worker::{TaskQueue, TaskQueueConfig};

use crate::state::AppState;

/// Build the application state on PostgreSQL metadata and the tasks queue.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
    url_signer: Option<UrlSigner>,
) -> Arc<AppState> {
    let metadata = Arc::new(PgMetadataStore::new(pool.clone()));
    let queue = Arc::new(TaskQueue::new(
        TaskRepository::new(pool.clone()),
        TaskQueueConfig::from_config(config),
    ));

    let lifetimes = config.capability_lifetimes();
    tracing::info!(
        upload_ttl_secs = lifetimes.upload.as_secs(),
        download_ttl_secs = lifetimes.download.as_secs(),
        manifest_timeout_secs = config.manifest_signing_timeout().as_secs(),
        "Services initialized"
    );

    Arc::new(AppState::new(
        config.clone(),
        Some(pool),
        storage,
        url_signer,
        metadata,
        queue,
    ))
}
