//! Seatcheck - license and device entitlement service
//!
//! Seat-limited device activation against license keys, signed short-lived
//! device credentials with server-side revocation, and an audit trail of
//! every security-relevant action.

pub mod admission;
pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod crypto;
pub mod db;
pub mod entitlements;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod jwt;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod util;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::audit::AuditTrail;
use crate::config::{Config, ConfigError};
use crate::db::{AppState, DbPool};
use crate::entitlements::Entitlements;
use crate::jwt::CredentialCodec;
use crate::lifecycle::{Lifecycle, LifecyclePolicy};

/// Assemble shared state from configuration and already-initialised pools.
///
/// Fails if the signing key cannot build a codec or the entitlement table is inconsistent.
pub fn build_state(
    config: &Config,
    db: DbPool,
    audit_pool: DbPool,
    entitlements: Entitlements,
) -> Result<AppState, ConfigError> {
    entitlements.validate()?;

    let codec = Arc::new(CredentialCodec::from_config(config)?);
    let audit = AuditTrail::new(audit_pool, config.audit_log_enabled);
    let lifecycle = Arc::new(Lifecycle::new(
        codec.clone(),
        entitlements,
        LifecyclePolicy::from_config(config),
        audit.clone(),
    ));

    Ok(AppState {
        db,
        audit,
        codec,
        lifecycle,
        audit_default_limit: config.audit_query_default_limit,
        audit_max_limit: config.audit_query_max_limit,
        request_timeout: config.request_timeout,
    })
}

/// Slack between the store deadline and the HTTP layer's own timeout, so a
/// stalled store call surfaces as `unavailable` rather than a bare 408.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// The full HTTP surface: device-facing routes plus the operator API.
pub fn app(state: AppState) -> Router {
    let timeout = state.request_timeout + HTTP_TIMEOUT_MARGIN;

    Router::new()
        .merge(handlers::public::router())
        .merge(handlers::operators::router(state.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
