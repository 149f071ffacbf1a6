use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::lifecycle::RefreshResult;
use crate::util::RequestMeta;

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
    /// Must match the device identifier inside the presented credential
    pub device_id: String,
}

/// POST /refresh
///
/// Accepts the current credential in the Authorization header, even if it
/// expired within the refresh grace window. License and device state are
/// re-checked before a new credential is issued.
pub async fn refresh(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    headers: HeaderMap,
    Json(body): Json<RefreshBody>,
) -> Result<Json<RefreshResult>> {
    let TypedHeader(auth) = auth.ok_or(AppError::Unauthorized)?;
    let token = auth.token().to_string();
    let meta = RequestMeta::from_headers(&headers);

    let lifecycle = state.lifecycle.clone();
    let result = state
        .with_conn(move |conn| lifecycle.refresh(conn, &body.device_id, &token, &meta))
        .await?;

    Ok(Json(result))
}
