mod activate;
mod deactivate;
mod refresh;
mod validate;

pub use activate::*;
pub use deactivate::*;
pub use refresh::*;
pub use validate::*;

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;
use crate::extractors::Json;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct PublicKeyResponse {
    pub alg: &'static str,
    /// Base64 Ed25519 public key
    pub public_key: String,
}

/// GET /public-key - lets external verifiers check credentials without signing authority
async fn public_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        alg: state.codec.algorithm(),
        public_key: state.codec.public_key_b64().to_string(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/public-key", get(public_key))
        .route("/activate", post(activate))
        .route("/validate", post(validate))
        .route("/refresh", post(refresh))
        .route("/deactivate", post(deactivate))
}
