use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::lifecycle::ValidationResult;
use crate::util::extract_bearer_token;

#[derive(Debug, Default, Deserialize)]
pub struct ValidateBody {
    #[serde(default)]
    pub token: Option<String>,
}

/// POST /validate
///
/// Token in the JSON body (`{"token": "..."}`) or as a Bearer header.
/// An invalid credential is a normal `{"valid": false}` response.
pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ValidationResult>> {
    let from_body = if body.is_empty() {
        ValidateBody::default()
    } else {
        serde_json::from_slice::<ValidateBody>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?
    };

    let token = from_body
        .token
        .or_else(|| extract_bearer_token(&headers).map(String::from))
        .ok_or_else(|| AppError::BadRequest("token is required".into()))?;

    let lifecycle = state.lifecycle.clone();
    let result = state
        .with_conn(move |conn| lifecycle.validate(conn, &token))
        .await?;

    Ok(Json(result))
}
