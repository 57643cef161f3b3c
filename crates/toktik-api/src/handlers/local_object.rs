//! Self-served capability URLs for the local filesystem backend.
//!
//! URLs issued by the local backend point here; every request must carry a
//! signature that covers its exact key and the operation matching its method.

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use toktik_core::models::{ObjectKey, Operation};
use toktik_core::AppError;
use toktik_storage::SignedQuery;
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::StorageState;

/// Query string of a signed URL
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CapabilityQuery {
    /// Operation the capability grants
    pub op: Operation,
    /// Expiry as unix seconds
    pub expires: i64,
    /// Signature over operation, key and expiry
    pub sig: String,
}

fn authorize(
    storage: &StorageState,
    raw_key: &str,
    expected: Operation,
    query: CapabilityQuery,
) -> Result<ObjectKey, HttpAppError> {
    let signer = storage
        .url_signer
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Object route is not enabled".to_string()))?;
    let key = ObjectKey::parse(raw_key).map_err(AppError::from)?;

    if query.op != expected {
        return Err(AppError::Forbidden(format!("Capability does not grant {}", expected)).into());
    }

    let presented = SignedQuery {
        operation: query.op,
        expires: query.expires,
        signature: query.sig,
    };
    signer
        .verify(key.as_str(), &presented, Utc::now())
        .map_err(|e| {
            tracing::debug!(key = %key, error = %e, "Capability rejected");
            HttpAppError::from(e)
        })?;

    Ok(key)
}

fn content_type_for(key: &ObjectKey) -> &'static str {
    let key = key.as_str();
    if key.ends_with(".m3u8") {
        "application/vnd.apple.mpegurl"
    } else if key.ends_with(".ts") {
        "video/mp2t"
    } else {
        "application/octet-stream"
    }
}

/// Read an object through a signed GET capability
#[utoipa::path(
    get,
    path = "/objects/{key}",
    tag = "objects",
    params(
        ("key" = String, Path, description = "Object key"),
        CapabilityQuery
    ),
    responses(
        (status = 200, description = "Object bytes"),
        (status = 403, description = "Signature invalid, expired or for another operation", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(storage, query))]
pub async fn get_object(
    State(storage): State<StorageState>,
    Path(key): Path<String>,
    Query(query): Query<CapabilityQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let key = authorize(&storage, &key, Operation::Read, query)?;
    let stream = storage.storage.download_stream(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&key))],
        Body::from_stream(stream),
    ))
}

/// Write an object through a signed PUT capability
#[utoipa::path(
    put,
    path = "/objects/{key}",
    tag = "objects",
    params(
        ("key" = String, Path, description = "Object key"),
        CapabilityQuery
    ),
    request_body(content = String, content_type = "application/octet-stream", description = "Raw object bytes"),
    responses(
        (status = 200, description = "Object stored"),
        (status = 403, description = "Signature invalid, expired or for another operation", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(storage, query, body), fields(size = body.len()))]
pub async fn put_object(
    State(storage): State<StorageState>,
    Path(key): Path<String>,
    Query(query): Query<CapabilityQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let key = authorize(&storage, &key, Operation::Write, query)?;
    storage.storage.upload(&key, body).await?;
    Ok(StatusCode::OK)
}
