//! Capability issuance
//!
//! Turns `(key, operation, lifetime)` into a short-lived signed URL through
//! whichever [`Storage`] backend is configured.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use toktik_core::models::{Capability, KeyError, ObjectKey, Operation};
use toktik_core::AppError;

use crate::{Storage, StorageError};

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("capability lifetime must be greater than zero")]
    InvalidLifetime,

    #[error("signing backend misconfigured: {0}")]
    Configuration(String),

    #[error("signing rejected: {0}")]
    Signing(String),
}

impl From<KeyError> for CapabilityError {
    fn from(err: KeyError) -> Self {
        CapabilityError::InvalidKey(err.to_string())
    }
}

impl From<StorageError> for CapabilityError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => CapabilityError::InvalidKey(msg),
            StorageError::ConfigError(msg) => CapabilityError::Configuration(msg),
            other => CapabilityError::Signing(other.to_string()),
        }
    }
}

impl From<CapabilityError> for AppError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::InvalidKey(msg) => AppError::InvalidInput(msg),
            CapabilityError::InvalidLifetime => AppError::InvalidInput(
                "Capability lifetime must be greater than zero".to_string(),
            ),
            CapabilityError::Configuration(msg) => AppError::Configuration(msg),
            CapabilityError::Signing(msg) => AppError::Signing(msg),
        }
    }
}

/// Issues single-operation, time-bounded capabilities. Cheap to clone.
#[derive(Clone)]
pub struct CapabilityIssuer {
    storage: Arc<dyn Storage>,
}

impl CapabilityIssuer {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Issue a capability granting `operation` on `key` for `lifetime`.
    ///
    /// No retries; the only side effect is the signing call itself.
    #[tracing::instrument(
        skip_all,
        fields(key = %key, operation = %operation, backend = %self.storage.backend_type())
    )]
    pub async fn issue(
        &self,
        key: &ObjectKey,
        operation: Operation,
        lifetime: Duration,
    ) -> Result<Capability, CapabilityError> {
        if lifetime.is_zero() {
            return Err(CapabilityError::InvalidLifetime);
        }
        let chrono_lifetime =
            chrono::Duration::from_std(lifetime).map_err(|_| CapabilityError::InvalidLifetime)?;
        let expires_at = Utc::now()
            .checked_add_signed(chrono_lifetime)
            .ok_or(CapabilityError::InvalidLifetime)?;

        let url = self
            .storage
            .signed_url(key, operation, lifetime)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Capability issuance failed");
                CapabilityError::from(e)
            })?;

        tracing::debug!(expires_at = %expires_at, "Capability issued");

        Ok(Capability {
            url,
            key: key.clone(),
            operation,
            expires_at,
        })
    }
}
