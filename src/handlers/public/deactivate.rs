use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::lifecycle::DeactivationResult;
use crate::models::ApplicationKind;
use crate::util::RequestMeta;

#[derive(Debug, Deserialize)]
pub struct DeactivateBody {
    pub license_key: String,
    pub device_id: String,
    /// Narrow to one application kind; otherwise every active row for the identifier
    #[serde(default)]
    pub application_kind: Option<ApplicationKind>,
}

/// POST /deactivate
///
/// Frees the device's seat and revokes every credential it holds.
/// Already-deactivated devices succeed with `deactivated: 0`.
pub async fn deactivate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DeactivateBody>,
) -> Result<Json<DeactivationResult>> {
    let meta = RequestMeta::from_headers(&headers);

    let lifecycle = state.lifecycle.clone();
    let result = state
        .with_conn(move |conn| {
            lifecycle.deactivate(
                conn,
                &body.license_key,
                &body.device_id,
                body.application_kind,
                &meta,
            )
        })
        .await?;

    Ok(Json(result))
}
