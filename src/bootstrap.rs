//! One-off startup tasks: first operator and dev data.

use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

use crate::audit::AuditTrail;
use crate::db::queries;
use crate::error::Result;
use crate::models::{
    ActorType, AuditAction, CreateLicense, CreateOperator, CreateOrganization, License, Operator,
    OperatorRole, Organization, Plan,
};

/// Create an Owner operator if none exist yet.
///
/// Returns the operator and its API key, or `None` when operators already exist.
pub fn bootstrap_first_operator(
    conn: &Connection,
    audit: &AuditTrail,
    email: &str,
) -> Result<Option<(Operator, String)>> {
    if queries::count_operators(conn)? > 0 {
        tracing::info!("Operators already exist, skipping bootstrap");
        return Ok(None);
    }

    let input = CreateOperator {
        email: email.trim().to_lowercase(),
        name: "Bootstrap Operator".to_string(),
        role: OperatorRole::Owner,
    };
    let (operator, api_key) = queries::create_operator(conn, &input, None)?;

    audit
        .event(AuditAction::OperatorBootstrap)
        .actor(ActorType::System, None)
        .details(json!({
            "operator_id": operator.id,
            "email": operator.email,
            "role": operator.role,
        }))
        .save();

    Ok(Some((operator, api_key)))
}

pub struct DevData {
    pub operator: Operator,
    pub operator_api_key: String,
    pub organization: Organization,
    pub license: License,
}

/// Seed an owner operator, an organization and a Basic license.
/// Skipped when the store already has operators.
pub fn seed_dev_data(conn: &Connection, audit: &AuditTrail) -> Result<Option<DevData>> {
    if queries::count_operators(conn)? > 0 {
        tracing::info!("Database already has data, skipping seed");
        return Ok(None);
    }

    let (operator, operator_api_key) = queries::create_operator(
        conn,
        &CreateOperator {
            email: "dev@seatcheck.local".to_string(),
            name: "Dev Operator".to_string(),
            role: OperatorRole::Owner,
        },
        None,
    )?;

    let organization = queries::create_organization(
        conn,
        &CreateOrganization {
            name: "Dev Org".to_string(),
        },
    )?;

    let license = queries::create_license(
        conn,
        &CreateLicense {
            organization_id: organization.id.clone(),
            plan: Plan::Basic,
            status: None,
            seats_editor: 2,
            seats_player: 5,
            valid_from: None,
            valid_until: Utc::now().timestamp() + 365 * 86400,
        },
    )?;

    audit
        .event(AuditAction::DevDataSeed)
        .actor(ActorType::System, None)
        .license(&license.id)
        .details(json!({
            "operator_id": operator.id,
            "organization_id": organization.id,
        }))
        .save();

    Ok(Some(DevData {
        operator,
        operator_api_key,
        organization,
        license,
    }))
}
