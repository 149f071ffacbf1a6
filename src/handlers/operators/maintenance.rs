use axum::extract::{Extension, State};
use serde::Serialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::middleware::OperatorContext;

#[derive(Serialize)]
pub struct PurgeResult {
    pub purged: usize,
}

/// Drop credential records that expired before the refresh grace window.
/// Also runs periodically in the background.
pub async fn purge_credentials(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
) -> Result<Json<PurgeResult>> {
    let lifecycle = state.lifecycle.clone();
    let purged = state
        .with_conn(move |conn| lifecycle.purge_expired(conn, Some(&ctx.operator.id)))
        .await?;
    Ok(Json(PurgeResult { purged }))
}
