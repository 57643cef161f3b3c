//! Storage setup and initialization

use anyhow::Result;
use std::sync::Arc;
use toktik_core::Config;
use toktik_storage::factory::url_signer;
use toktik_storage::{create_storage, Storage, UrlSigner};

/// Build the configured backend. The signer is only returned for the local
/// backend, whose capability URLs this service verifies itself.
pub async fn setup_storage(config: &Config) -> Result<(Arc<dyn Storage>, Option<UrlSigner>)> {
    tracing::info!("Initializing storage backend...");
    let storage = create_storage(config).await?;
    let signer = url_signer(config)?;

    tracing::info!(
        backend = %storage.backend_type(),
        self_served_urls = signer.is_some(),
        "Storage backend initialized"
    );

    Ok((storage, signer))
}
