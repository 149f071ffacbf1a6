use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::json;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::middleware::OperatorContext;
use crate::models::{ActorType, AuditAction, CreateOperator, Operator};
use crate::pagination::{Paginated, PaginationQuery};
use crate::util::RequestMeta;

#[derive(Serialize)]
pub struct OperatorCreated {
    pub operator: Operator,
    /// Shown once; only its hash is stored
    pub api_key: String,
}

pub async fn create_operator(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    headers: HeaderMap,
    Json(input): Json<CreateOperator>,
) -> Result<Json<OperatorCreated>> {
    let email = input.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".into()));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    let input = CreateOperator {
        email,
        name: input.name.trim().to_string(),
        role: input.role,
    };

    let meta = RequestMeta::from_headers(&headers);
    let audit = state.audit.clone();
    let created = state
        .with_conn(move |conn| {
            let (operator, api_key) =
                queries::create_operator(conn, &input, Some(&ctx.operator.id))?;

            audit
                .event(AuditAction::OperatorCreate)
                .actor(ActorType::Operator, Some(ctx.operator.id.as_str()))
                .details(json!({
                    "operator_id": operator.id,
                    "email": operator.email,
                    "role": operator.role,
                }))
                .request(&meta)
                .save();

            Ok(OperatorCreated { operator, api_key })
        })
        .await?;

    Ok(Json(created))
}

pub async fn list_operators(
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Paginated<Operator>>> {
    let (limit, offset) = (page.limit(), page.offset());
    let (items, total) = state
        .with_conn(move |conn| queries::list_operators_paginated(conn, limit, offset))
        .await?;
    Ok(Json(Paginated::new(items, total, limit, offset)))
}
