//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use toktik_core::Config;

/// Validate critical configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();
    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    let lifetimes = config.capability_lifetimes();
    if lifetimes.download > lifetimes.upload {
        tracing::warn!(
            upload_ttl_secs = lifetimes.upload.as_secs(),
            download_ttl_secs = lifetimes.download.as_secs(),
            "Read capabilities outlive write capabilities"
        );
    }

    Ok(())
}
