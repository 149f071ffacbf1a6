use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::lifecycle::{ActivateRequest, ActivationResult};
use crate::models::ApplicationKind;
use crate::util::RequestMeta;

#[derive(Debug, Deserialize)]
pub struct ActivateBody {
    pub license_key: String,
    /// Client-supplied device identifier
    pub device_id: String,
    pub application_kind: ApplicationKind,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub os_info: Option<String>,
}

/// POST /activate
///
/// Admits the device against the license's seat pool for its application kind
/// and returns a signed credential. Re-activating an already active device
/// returns a fresh credential without consuming another seat.
pub async fn activate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivateBody>,
) -> Result<Json<ActivationResult>> {
    let meta = RequestMeta::from_headers(&headers);
    let request = ActivateRequest {
        license_key: body.license_key,
        device_identifier: body.device_id,
        application_kind: body.application_kind,
        device_name: body.device_name,
        os_info: body.os_info,
    };

    let lifecycle = state.lifecycle.clone();
    let result = state
        .with_conn(move |conn| lifecycle.activate(conn, &request, &meta))
        .await?;

    Ok(Json(result))
}
