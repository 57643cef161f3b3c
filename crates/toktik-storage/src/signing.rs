//! HMAC-signed capability URLs for backends that cannot presign natively.
//!
//! Signature = base64url(HMAC-SHA256(secret, "{operation}\n{key}\n{expires}")),
//! where `expires` is a unix timestamp in seconds. The URL query carries
//! `op`, `expires` and `sig`; only the key is part of the path.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use toktik_core::models::{ObjectKey, Operation};

use crate::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature")]
    Malformed,

    #[error("signature does not match")]
    Mismatch,

    #[error("capability expired")]
    Expired,
}

/// Query parameters of a signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    pub operation: Operation,
    pub expires: i64,
    pub signature: String,
}

impl SignedQuery {
    pub fn to_query_string(&self) -> String {
        format!(
            "op={}&expires={}&sig={}",
            self.operation, self.expires, self.signature
        )
    }
}

#[derive(Clone)]
pub struct UrlSigner {
    secret: Arc<[u8]>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> StorageResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(StorageError::ConfigError(
                "URL signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    fn mac(&self) -> StorageResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StorageError::ConfigError(format!("Invalid signing secret: {}", e)))
    }

    fn tag(&self, key: &str, operation: Operation, expires: i64) -> StorageResult<HmacSha256> {
        let mut mac = self.mac()?;
        mac.update(operation.to_string().as_bytes());
        mac.update(b"\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Sign `(key, operation)` until `now + expires_in`.
    pub fn sign(
        &self,
        key: &ObjectKey,
        operation: Operation,
        expires_in: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<SignedQuery> {
        let lifetime = chrono::Duration::from_std(expires_in)
            .map_err(|e| StorageError::SigningFailed(format!("Invalid lifetime: {}", e)))?;
        let expires = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| StorageError::SigningFailed("Lifetime out of range".to_string()))?
            .timestamp();

        let tag = self.tag(key.as_str(), operation, expires)?.finalize().into_bytes();
        Ok(SignedQuery {
            operation,
            expires,
            signature: base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag),
        })
    }

    /// Check a presented capability against the requested key and operation.
    pub fn verify(
        &self,
        key: &str,
        query: &SignedQuery,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let presented = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&query.signature)
            .map_err(|_| SignatureError::Malformed)?;

        let mac = self
            .tag(key, query.operation, query.expires)
            .map_err(|_| SignatureError::Malformed)?;
        mac.verify_slice(&presented)
            .map_err(|_| SignatureError::Mismatch)?;

        if now.timestamp() > query.expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}
