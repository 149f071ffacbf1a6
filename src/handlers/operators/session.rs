use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::lifecycle::OperatorSession;
use crate::util::{RequestMeta, extract_bearer_token};

#[derive(Debug, Deserialize)]
pub struct OpenSessionBody {
    pub api_key: String,
}

/// POST /operators/session - exchange an API key for a short-lived operator credential
pub async fn open_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<OpenSessionBody>,
) -> Result<Json<OperatorSession>> {
    let meta = RequestMeta::from_headers(&headers);
    let lifecycle = state.lifecycle.clone();
    let session = state
        .with_conn(move |conn| lifecycle.open_operator_session(conn, body.api_key.trim(), &meta))
        .await?;
    Ok(Json(session))
}

#[derive(Serialize)]
pub struct SessionClosed {
    pub success: bool,
}

/// DELETE /operators/session - revoke the presented operator credential
pub async fn close_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionClosed>> {
    let token = extract_bearer_token(&headers)
        .map(String::from)
        .ok_or(AppError::Unauthorized)?;
    let meta = RequestMeta::from_headers(&headers);

    let lifecycle = state.lifecycle.clone();
    state
        .with_conn(move |conn| {
            let ctx = lifecycle.authenticate_operator(conn, &token)?;
            lifecycle.close_operator_session(conn, &ctx, &meta)
        })
        .await?;

    Ok(Json(SessionClosed { success: true }))
}
