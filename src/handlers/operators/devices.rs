use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::id::{CredentialId, DeviceId};
use crate::middleware::OperatorContext;
use crate::models::{CredentialRecord, Device};
use crate::util::RequestMeta;

pub async fn get_device(
    State(state): State<AppState>,
    Path(device_id): Path<DeviceId>,
) -> Result<Json<Device>> {
    let device = state
        .with_conn(move |conn| {
            queries::get_device_by_id(conn, &device_id)?.ok_or(AppError::DeviceNotFound)
        })
        .await?;
    Ok(Json(device))
}

/// Credential records only; tokens themselves are never stored.
pub async fn list_device_credentials(
    State(state): State<AppState>,
    Path(device_id): Path<DeviceId>,
) -> Result<Json<Vec<CredentialRecord>>> {
    let records = state
        .with_conn(move |conn| {
            queries::get_device_by_id(conn, &device_id)?.ok_or(AppError::DeviceNotFound)?;
            queries::list_credentials_for_device(conn, &device_id)
        })
        .await?;
    Ok(Json(records))
}

#[derive(Serialize)]
pub struct CredentialsRevoked {
    pub credentials_revoked: usize,
}

/// POST /operators/devices/{device_id}/revoke-credentials
///
/// Forces the device to re-activate without freeing its seat.
pub async fn revoke_device_credentials(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    Path(device_id): Path<DeviceId>,
    headers: HeaderMap,
) -> Result<Json<CredentialsRevoked>> {
    let meta = RequestMeta::from_headers(&headers);
    let lifecycle = state.lifecycle.clone();
    let credentials_revoked = state
        .with_conn(move |conn| {
            lifecycle.revoke_device_credentials(conn, &device_id, &ctx.operator.id, &meta)
        })
        .await?;
    Ok(Json(CredentialsRevoked { credentials_revoked }))
}

/// DELETE /operators/devices/{device_id}
///
/// Hard delete: frees the seat, drops credentials and the device's audit history.
pub async fn delete_device(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    Path(device_id): Path<DeviceId>,
    headers: HeaderMap,
) -> Result<Json<Device>> {
    let meta = RequestMeta::from_headers(&headers);
    let lifecycle = state.lifecycle.clone();
    let device = state
        .with_conn(move |conn| lifecycle.delete_device(conn, &device_id, &ctx.operator.id, &meta))
        .await?;
    Ok(Json(device))
}

#[derive(Serialize)]
pub struct CredentialRevoked {
    /// False when the credential was unknown or already revoked
    pub revoked: bool,
}

/// POST /operators/credentials/{credential_id}/revoke
pub async fn revoke_credential(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    Path(credential_id): Path<CredentialId>,
    headers: HeaderMap,
) -> Result<Json<CredentialRevoked>> {
    let meta = RequestMeta::from_headers(&headers);
    let lifecycle = state.lifecycle.clone();
    let revoked = state
        .with_conn(move |conn| {
            lifecycle.revoke_credential(conn, &credential_id, &ctx.operator.id, &meta)
        })
        .await?;
    Ok(Json(CredentialRevoked { revoked }))
}
