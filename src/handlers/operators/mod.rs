mod audit_logs;
mod devices;
mod licenses;
mod maintenance;
mod operators;
mod organizations;
mod session;

pub use audit_logs::*;
pub use devices::*;
pub use licenses::*;
pub use maintenance::*;
pub use operators::*;
pub use organizations::*;
pub use session::*;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::db::AppState;
use crate::middleware::{operator_auth, require_admin_role, require_owner_role};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // Operator management (owner only)
        .route("/operators", post(create_operator))
        .route("/operators", get(list_operators))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_owner_role,
        ))
        .merge(
            Router::new()
                .route("/operators/organizations", post(create_organization))
                .route("/operators/organizations/{org_id}", put(update_organization))
                .route("/operators/licenses", post(create_license))
                .route("/operators/licenses/{license_id}", put(update_license))
                .route("/operators/devices/{device_id}", delete(delete_device))
                .route(
                    "/operators/devices/{device_id}/revoke-credentials",
                    post(revoke_device_credentials),
                )
                .route(
                    "/operators/credentials/{credential_id}/revoke",
                    post(revoke_credential),
                )
                .route(
                    "/operators/maintenance/purge-credentials",
                    post(purge_credentials),
                )
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_admin_role,
                )),
        )
        .merge(
            Router::new()
                // Read access (any role)
                .route("/operators/organizations", get(list_organizations))
                .route("/operators/organizations/{org_id}", get(get_organization))
                .route("/operators/licenses", get(list_licenses))
                .route("/operators/licenses/{license_id}", get(get_license))
                .route(
                    "/operators/licenses/{license_id}/devices",
                    get(list_license_devices),
                )
                .route("/operators/devices/{device_id}", get(get_device))
                .route(
                    "/operators/devices/{device_id}/credentials",
                    get(list_device_credentials),
                )
                .route("/operators/audit-logs", get(query_audit_logs))
                .route("/operators/audit-logs/text", get(query_audit_logs_text))
                .route("/operators/audit-logs/summary", get(audit_summary))
                .layer(middleware::from_fn_with_state(state.clone(), operator_auth)),
        )
        .merge(
            // Unauthenticated; closing authenticates with the session's own credential
            Router::new().route("/operators/session", post(open_session).delete(close_session)),
        )
}
