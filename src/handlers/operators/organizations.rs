use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use serde_json::json;

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path, Query};
use crate::id::OrganizationId;
use crate::middleware::OperatorContext;
use crate::models::{
    ActorType, AuditAction, CreateOrganization, Organization, UpdateOrganization,
};
use crate::pagination::{Paginated, PaginationQuery};
use crate::util::RequestMeta;

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    Ok(name.to_string())
}

pub async fn create_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    headers: HeaderMap,
    Json(input): Json<CreateOrganization>,
) -> Result<Json<Organization>> {
    let input = CreateOrganization {
        name: clean_name(&input.name)?,
    };
    let meta = RequestMeta::from_headers(&headers);
    let audit = state.audit.clone();

    let organization = state
        .with_conn(move |conn| {
            let organization = queries::create_organization(conn, &input)?;
            audit
                .event(AuditAction::OrganizationCreate)
                .actor(ActorType::Operator, Some(ctx.operator.id.as_str()))
                .details(json!({
                    "organization_id": organization.id,
                    "name": organization.name,
                }))
                .request(&meta)
                .save();
            Ok(organization)
        })
        .await?;

    Ok(Json(organization))
}

pub async fn list_organizations(
    State(state): State<AppState>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<Paginated<Organization>>> {
    let (limit, offset) = (page.limit(), page.offset());
    let (items, total) = state
        .with_conn(move |conn| queries::list_organizations_paginated(conn, limit, offset))
        .await?;
    Ok(Json(Paginated::new(items, total, limit, offset)))
}

pub async fn get_organization(
    State(state): State<AppState>,
    Path(org_id): Path<OrganizationId>,
) -> Result<Json<Organization>> {
    let organization = state
        .with_conn(move |conn| {
            queries::get_organization_by_id(conn, &org_id)?
                .or_not_found(msg::ORGANIZATION_NOT_FOUND)
        })
        .await?;
    Ok(Json(organization))
}

pub async fn update_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    Path(org_id): Path<OrganizationId>,
    headers: HeaderMap,
    Json(input): Json<UpdateOrganization>,
) -> Result<Json<Organization>> {
    let input = UpdateOrganization {
        name: clean_name(&input.name)?,
    };
    let meta = RequestMeta::from_headers(&headers);
    let audit = state.audit.clone();

    let organization = state
        .with_conn(move |conn| {
            let organization = queries::update_organization(conn, &org_id, &input)?
                .or_not_found(msg::ORGANIZATION_NOT_FOUND)?;
            audit
                .event(AuditAction::OrganizationUpdate)
                .actor(ActorType::Operator, Some(ctx.operator.id.as_str()))
                .details(json!({
                    "organization_id": organization.id,
                    "name": organization.name,
                }))
                .request(&meta)
                .save();
            Ok(organization)
        })
        .await?;

    Ok(Json(organization))
}
