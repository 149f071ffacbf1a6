use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::db::AppState;
use crate::error::{AppError, Result, msg};
use crate::models::OperatorRole;
use crate::util::extract_bearer_token;

pub use crate::lifecycle::OperatorContext;

/// Verify the bearer operator credential (signature, audience, expiry,
/// revocation) and load the operator it belongs to.
async fn authenticate(state: &AppState, token: Option<String>) -> Result<OperatorContext> {
    let token = token.ok_or(AppError::Unauthorized)?;

    let lifecycle = state.lifecycle.clone();
    state
        .with_conn(move |conn| lifecycle.authenticate_operator(conn, &token))
        .await
}

async fn authorize(
    state: AppState,
    mut request: Request,
    next: Next,
    allowed: fn(OperatorRole) -> bool,
) -> Result<Response> {
    let token = extract_bearer_token(request.headers()).map(String::from);
    let ctx = authenticate(&state, token).await?;

    if !allowed(ctx.operator.role) {
        return Err(AppError::Forbidden(msg::INSUFFICIENT_PERMISSIONS.into()));
    }

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Any operator role (read access).
pub async fn operator_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    authorize(state, request, next, |_| true).await
}

pub async fn require_admin_role(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    authorize(state, request, next, |role| role.can_write()).await
}

pub async fn require_owner_role(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    authorize(state, request, next, |role| role.can_manage_operators()).await
}
