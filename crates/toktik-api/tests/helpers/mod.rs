//! Test helpers: build AppState and router for integration tests.
//!
//! The real router runs over the local storage backend in a temp directory
//! and in-memory fakes for PostgreSQL, so no database is needed:
//! `cargo test -p toktik-api`.

#![allow(dead_code)]

pub mod fakes;

use axum_test::{TestResponse, TestServer};
use std::sync::Arc;
use tempfile::TempDir;
use toktik_api::setup::routes;
use toktik_api::state::AppState;
use toktik_core::{BaseConfig, Config, ServiceConfig, StorageBackend};
use toktik_storage::{LocalStorage, Storage, UrlSigner};

use fakes::{FakeMetadataStore, FakeQueue};

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-0123456789abcdef";
pub const OBJECTS_BASE_URL: &str = "http://localhost:7000/objects";
const SERVER_ORIGIN: &str = "http://localhost:7000";

/// Test application: server, backends and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<LocalStorage>,
    pub metadata: Arc<FakeMetadataStore>,
    pub queue: Arc<FakeQueue>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Store an object directly, bypassing capabilities.
    pub async fn put_object(&self, key: &str, contents: impl Into<bytes::Bytes>) {
        let key = toktik_core::models::ObjectKey::parse(key).expect("valid key");
        self.storage
            .upload(&key, contents.into())
            .await
            .expect("Failed to seed object");
    }

    /// GET a capability URL issued by the local backend.
    pub async fn follow_get(&self, url: &str) -> TestResponse {
        let (path, params) = split_capability_url(url);
        let mut request = self.server.get(&path);
        for (name, value) in params {
            request = request.add_query_param(&name, value);
        }
        request.await
    }

    /// PUT `body` to a capability URL issued by the local backend.
    pub async fn follow_put(&self, url: &str, body: &'static [u8]) -> TestResponse {
        let (path, params) = split_capability_url(url);
        let mut request = self.server.put(&path);
        for (name, value) in params {
            request = request.add_query_param(&name, value);
        }
        request.bytes(bytes::Bytes::from_static(body)).await
    }
}

/// Split an absolute capability URL into a server-relative path and its query pairs.
pub fn split_capability_url(url: &str) -> (String, Vec<(String, String)>) {
    let relative = url
        .strip_prefix(SERVER_ORIGIN)
        .unwrap_or_else(|| panic!("unexpected capability origin: {}", url));
    let (path, query) = relative.split_once('?').unwrap_or((relative, ""));
    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (name.to_string(), value.to_string())
        })
        .collect();
    (path.to_string(), params)
}

/// Setup test app with local storage and in-memory metadata/queue.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(&temp_dir);

    let signer = UrlSigner::new(TEST_SIGNING_SECRET).expect("Failed to create signer");
    let storage = Arc::new(
        LocalStorage::new(
            temp_dir.path().to_path_buf(),
            OBJECTS_BASE_URL.to_string(),
            signer.clone(),
        )
        .await
        .expect("Failed to create local storage"),
    );
    let metadata = Arc::new(FakeMetadataStore::default());
    let queue = Arc::new(FakeQueue::default());

    let state = Arc::new(AppState::new(
        config.clone(),
        None,
        storage.clone(),
        Some(signer),
        metadata.clone(),
        queue.clone(),
    ));

    let app = routes::setup_routes(&config, state)
        .await
        .expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        storage,
        metadata,
        queue,
        _temp_dir: temp_dir,
    }
}

fn create_test_config(temp_dir: &TempDir) -> Config {
    let base = BaseConfig {
        server_port: 7000,
        cors_origins: vec!["*".to_string()],
        db_max_connections: 5,
        db_timeout_seconds: 30,
        environment: "test".to_string(),
    };

    Config(Box::new(ServiceConfig {
        base,
        database_url: "postgresql://localhost/toktik_test".to_string(),
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: String::new(),
        s3_region: String::new(),
        s3_endpoint: None,
        local_storage_path: Some(temp_dir.path().display().to_string()),
        local_storage_base_url: Some(OBJECTS_BASE_URL.to_string()),
        url_signing_secret: Some(TEST_SIGNING_SECRET.to_string()),
        upload_url_ttl_secs: 86_400,
        download_url_ttl_secs: 3_600,
        manifest_signing_timeout_secs: 30,
        task_max_retries: 3,
        task_timeout_seconds: 3600,
        feed_max_page_size: 5,
    }))
}
