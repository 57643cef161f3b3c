//! Configuration module
//!
//! Environment-driven configuration for the API: server, database, storage
//! backend, capability lifetimes and encoder queue settings.

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_BUCKET, DEFAULT_REGION};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 7000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_TTL_SECS: u64 = 86_400;
const DOWNLOAD_URL_TTL_SECS: u64 = 3_600;
const MANIFEST_SIGNING_TIMEOUT_SECS: u64 = 30;
const TASK_MAX_RETRIES: i32 = 3;
const TASK_TIMEOUT_SECONDS: i32 = 3600;
const FEED_MAX_PAGE_SIZE: i64 = 50;
const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Full service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // S3-compatible providers (DigitalOcean Spaces, MinIO)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub url_signing_secret: Option<String>,
    // Capability lifetimes
    pub upload_url_ttl_secs: u64,
    pub download_url_ttl_secs: u64,
    pub manifest_signing_timeout_secs: u64,
    // Encoder queue
    pub task_max_retries: i32,
    pub task_timeout_seconds: i32,
    pub feed_max_page_size: i64,
}

/// Lifetimes granted to issued capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapabilityLifetimes {
    pub upload: Duration,
    pub download: Duration,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_service().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn database_url(&self) -> &str {
        &self.as_service().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_service().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_service().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_service()
            .storage_backend
            .unwrap_or(StorageBackend::S3)
    }

    pub fn s3_bucket(&self) -> &str {
        &self.as_service().s3_bucket
    }

    pub fn s3_region(&self) -> &str {
        &self.as_service().s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_service().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_service().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_service().local_storage_base_url.as_deref()
    }

    pub fn url_signing_secret(&self) -> Option<&str> {
        self.as_service().url_signing_secret.as_deref()
    }

    pub fn capability_lifetimes(&self) -> CapabilityLifetimes {
        CapabilityLifetimes {
            upload: Duration::from_secs(self.as_service().upload_url_ttl_secs),
            download: Duration::from_secs(self.as_service().download_url_ttl_secs),
        }
    }

    pub fn manifest_signing_timeout(&self) -> Duration {
        Duration::from_secs(self.as_service().manifest_signing_timeout_secs)
    }

    pub fn task_max_retries(&self) -> i32 {
        self.as_service().task_max_retries
    }

    pub fn task_timeout_seconds(&self) -> i32 {
        self.as_service().task_timeout_seconds
    }

    pub fn feed_max_page_size(&self) -> i64 {
        self.as_service().feed_max_page_size
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str =
            env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:8000".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(value.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let s3_region = env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
        // Unset means DigitalOcean Spaces in the configured region; empty means AWS.
        let s3_endpoint = match env::var("S3_ENDPOINT") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value),
            Err(_) => Some(format!("https://{}.digitaloceanspaces.com", s3_region)),
        };

        let config = ServiceConfig {
            base: BaseConfig {
                server_port: env::var("PORT")
                    .unwrap_or_else(|_| SERVER_PORT.to_string())
                    .parse()
                    .unwrap_or(SERVER_PORT),
                cors_origins: cors_origins_str
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                db_max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                    .parse()
                    .unwrap_or(MAX_CONNECTIONS),
                db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(CONNECTION_TIMEOUT_SECS),
                environment,
            },
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            s3_region,
            s3_endpoint,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .ok()
                .filter(|s| !s.is_empty()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            url_signing_secret: env::var("URL_SIGNING_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            upload_url_ttl_secs: env::var("UPLOAD_URL_TTL_SECS")
                .unwrap_or_else(|_| UPLOAD_URL_TTL_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_URL_TTL_SECS),
            download_url_ttl_secs: env::var("DOWNLOAD_URL_TTL_SECS")
                .unwrap_or_else(|_| DOWNLOAD_URL_TTL_SECS.to_string())
                .parse()
                .unwrap_or(DOWNLOAD_URL_TTL_SECS),
            manifest_signing_timeout_secs: env::var("MANIFEST_SIGNING_TIMEOUT_SECS")
                .unwrap_or_else(|_| MANIFEST_SIGNING_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(MANIFEST_SIGNING_TIMEOUT_SECS),
            task_max_retries: env::var("TASK_MAX_RETRIES")
                .unwrap_or_else(|_| TASK_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(TASK_MAX_RETRIES),
            task_timeout_seconds: env::var("TASK_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| TASK_TIMEOUT_SECONDS.to_string())
                .parse()
                .unwrap_or(TASK_TIMEOUT_SECONDS),
            feed_max_page_size: env::var("FEED_MAX_PAGE_SIZE")
                .unwrap_or_else(|_| FEED_MAX_PAGE_SIZE.to_string())
                .parse()
                .unwrap_or(FEED_MAX_PAGE_SIZE),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.upload_url_ttl_secs == 0 || self.download_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_TTL_SECS and DOWNLOAD_URL_TTL_SECS must be greater than zero"
            ));
        }

        if self.manifest_signing_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "MANIFEST_SIGNING_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.feed_max_page_size < 1 {
            return Err(anyhow::anyhow!("FEED_MAX_PAGE_SIZE must be at least 1"));
        }

        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                match self.url_signing_secret.as_deref() {
                    Some(secret) if secret.len() >= MIN_SIGNING_SECRET_LEN => {}
                    _ => {
                        return Err(anyhow::anyhow!(
                            "URL_SIGNING_SECRET must be at least {} characters long when using local storage backend",
                            MIN_SIGNING_SECRET_LEN
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
