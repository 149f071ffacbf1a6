use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use serde_json::json;

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path, Query};
use crate::id::LicenseId;
use crate::middleware::OperatorContext;
use crate::models::{
    ActorType, AuditAction, CreateLicense, Device, DeviceListQuery, License, LicenseListQuery,
    LicenseWithUsage, UpdateLicense,
};
use crate::pagination::{Paginated, PaginationQuery};
use crate::util::RequestMeta;

/// POST /operators/licenses
///
/// The license key is generated here and returned in the response; it is the
/// secret a customer enters on their devices.
pub async fn create_license(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    headers: HeaderMap,
    Json(input): Json<CreateLicense>,
) -> Result<Json<License>> {
    let meta = RequestMeta::from_headers(&headers);
    let audit = state.audit.clone();

    let license = state
        .with_conn(move |conn| {
            let license = queries::create_license(conn, &input)?;
            tracing::info!(license_id = %license.id, plan = %license.plan, "License created");
            audit
                .event(AuditAction::LicenseCreate)
                .actor(ActorType::Operator, Some(ctx.operator.id.as_str()))
                .license(&license.id)
                .details(json!({
                    "organization_id": license.organization_id,
                    "plan": license.plan,
                    "seats_editor": license.seats_editor,
                    "seats_player": license.seats_player,
                    "valid_until": license.valid_until,
                }))
                .request(&meta)
                .save();
            Ok(license)
        })
        .await?;

    Ok(Json(license))
}

pub async fn list_licenses(
    State(state): State<AppState>,
    Query(query): Query<LicenseListQuery>,
) -> Result<Json<Paginated<License>>> {
    let page = PaginationQuery::new(query.limit, query.offset);
    let (limit, offset) = (page.limit(), page.offset());

    let (items, total) = state
        .with_conn(move |conn| {
            queries::list_licenses_paginated(
                conn,
                query.organization_id.as_ref(),
                query.status,
                limit,
                offset,
            )
        })
        .await?;

    Ok(Json(Paginated::new(items, total, limit, offset)))
}

/// GET /operators/licenses/{license_id} - includes live seat usage per kind
pub async fn get_license(
    State(state): State<AppState>,
    Path(license_id): Path<LicenseId>,
) -> Result<Json<LicenseWithUsage>> {
    let license = state
        .with_conn(move |conn| {
            queries::get_license_with_usage(conn, &license_id)?.or_not_found(msg::LICENSE_NOT_FOUND)
        })
        .await?;
    Ok(Json(license))
}

/// PUT /operators/licenses/{license_id}
///
/// Lowering a seat capacity below current usage is allowed; existing devices
/// keep their seats and new activations are refused until usage drops.
pub async fn update_license(
    State(state): State<AppState>,
    Extension(ctx): Extension<OperatorContext>,
    Path(license_id): Path<LicenseId>,
    headers: HeaderMap,
    Json(input): Json<UpdateLicense>,
) -> Result<Json<License>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    let meta = RequestMeta::from_headers(&headers);
    let audit = state.audit.clone();

    let license = state
        .with_conn(move |conn| {
            let license = queries::update_license(conn, &license_id, &input)?
                .or_not_found(msg::LICENSE_NOT_FOUND)?;
            audit
                .event(AuditAction::LicenseUpdate)
                .actor(ActorType::Operator, Some(ctx.operator.id.as_str()))
                .license(&license.id)
                .details(json!({
                    "plan": input.plan,
                    "status": input.status,
                    "seats_editor": input.seats_editor,
                    "seats_player": input.seats_player,
                    "valid_from": input.valid_from,
                    "valid_until": input.valid_until,
                }))
                .request(&meta)
                .save();
            Ok(license)
        })
        .await?;

    Ok(Json(license))
}

pub async fn list_license_devices(
    State(state): State<AppState>,
    Path(license_id): Path<LicenseId>,
    Query(query): Query<DeviceListQuery>,
) -> Result<Json<Paginated<Device>>> {
    let page = PaginationQuery::new(query.limit, query.offset);
    let (limit, offset) = (page.limit(), page.offset());

    let (items, total) = state
        .with_conn(move |conn| {
            queries::get_license_by_id(conn, &license_id)?.or_not_found(msg::LICENSE_NOT_FOUND)?;
            queries::list_devices_for_license_paginated(
                conn,
                &license_id,
                query.status,
                limit,
                offset,
            )
        })
        .await?;

    Ok(Json(Paginated::new(items, total, limit, offset)))
}
