//! Application state and sub-state extractors.
//!
//! Handlers take `State<Arc<AppState>>`, or a sub-state through `FromRef`
//! when they only need one part of it.

use std::sync::Arc;

use sqlx::PgPool;
use toktik_core::Config;
use toktik_db::MetadataStore;
use toktik_storage::{CapabilityIssuer, Storage, UrlSigner};
use toktik_worker::EncodeQueue;

use crate::services::{CatalogueService, ManifestRewriter, UploadCoordinator};

/// Storage backend, the capability issuer built on it, and the signer used
/// to check self-served capability URLs (local backend only).
#[derive(Clone)]
pub struct StorageState {
    pub storage: Arc<dyn Storage>,
    pub issuer: CapabilityIssuer,
    pub url_signer: Option<UrlSigner>,
}

/// Video-facing services.
#[derive(Clone)]
pub struct VideoState {
    pub manifests: ManifestRewriter,
    pub uploads: UploadCoordinator,
    pub catalogue: CatalogueService,
}

pub struct AppState {
    /// `None` when running without a database (tests).
    pub pool: Option<PgPool>,
    pub storage: StorageState,
    pub videos: VideoState,
    pub config: Config,
}

impl AppState {
    /// Wire services from configuration and injected backends.
    pub fn new(
        config: Config,
        pool: Option<PgPool>,
        storage: Arc<dyn Storage>,
        url_signer: Option<UrlSigner>,
        metadata: Arc<dyn MetadataStore>,
        queue: Arc<dyn EncodeQueue>,
    ) -> Self {
        let lifetimes = config.capability_lifetimes();
        let issuer = CapabilityIssuer::new(storage.clone());

        let videos = VideoState {
            manifests: ManifestRewriter::new(
                storage.clone(),
                issuer.clone(),
                lifetimes.download,
                config.manifest_signing_timeout(),
            ),
            uploads: UploadCoordinator::new(
                issuer.clone(),
                metadata.clone(),
                queue,
                lifetimes.upload,
            ),
            catalogue: CatalogueService::new(
                metadata,
                issuer.clone(),
                lifetimes.download,
                config.feed_max_page_size(),
            ),
        };

        Self {
            pool,
            storage: StorageState {
                storage,
                issuer,
                url_signer,
            },
            videos,
            config,
        }
    }
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for StorageState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.storage.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for VideoState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.videos.clone()
    }
}
