use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params, types::Value};

use crate::crypto::{generate_api_key, hash_secret};
use crate::error::{AppError, Result, msg};
use crate::id::{CredentialId, DeviceId, EntityType, LicenseId, OperatorId, OrganizationId};
use crate::models::*;

use super::from_row::{
    AUDIT_EVENT_COLS, CREDENTIAL_COLS, DEVICE_COLS, LICENSE_COLS, OPERATOR_COLS,
    ORGANIZATION_COLS, query_all, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// True if the error is a UNIQUE constraint violation.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Builder for dynamic UPDATE statements with optional fields.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
    track_updated_at: bool,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
            track_updated_at: false,
        }
    }

    fn with_updated_at(mut self) -> Self {
        self.track_updated_at = true;
        self
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Execute the update and return the updated entity using RETURNING clause.
    /// Returns None if no rows matched.
    fn execute_returning<T: super::from_row::FromRow>(
        mut self,
        conn: &Connection,
        returning_cols: &str,
    ) -> Result<Option<T>> {
        if self.fields.is_empty() {
            return Ok(None);
        }
        if self.track_updated_at {
            self.fields.push(("updated_at", now().into()));
        }
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? RETURNING {}",
            self.table,
            sets.join(", "),
            returning_cols
        );
        conn.query_row(&sql, rusqlite::params_from_iter(values), T::from_row)
            .optional()
            .map_err(Into::into)
    }
}

// ============ Organizations ============

pub fn create_organization(conn: &Connection, input: &CreateOrganization) -> Result<Organization> {
    let id = OrganizationId::generate();
    let now = now();

    conn.execute(
        "INSERT INTO organizations (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        params![&id, &input.name, now, now],
    )?;

    Ok(Organization {
        id,
        name: input.name.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_organization_by_id(
    conn: &Connection,
    id: &OrganizationId,
) -> Result<Option<Organization>> {
    query_one(
        conn,
        &format!("SELECT {} FROM organizations WHERE id = ?1", ORGANIZATION_COLS),
        &[id],
    )
}

pub fn list_organizations_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Organization>, i64)> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM organizations", [], |row| row.get(0))?;

    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM organizations ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
            ORGANIZATION_COLS
        ),
        params![limit, offset],
    )?;

    Ok((items, total))
}

pub fn update_organization(
    conn: &Connection,
    id: &OrganizationId,
    input: &UpdateOrganization,
) -> Result<Option<Organization>> {
    UpdateBuilder::new("organizations", id.as_str())
        .with_updated_at()
        .set("name", input.name.clone())
        .execute_returning(conn, ORGANIZATION_COLS)
}

// ============ Operators ============

/// Create an operator. Returns the operator and its plaintext API key, which is never stored.
pub fn create_operator(
    conn: &Connection,
    input: &CreateOperator,
    created_by: Option<&OperatorId>,
) -> Result<(Operator, String)> {
    let id = OperatorId::generate();
    let api_key = generate_api_key();
    let api_key_hash = hash_secret(&api_key);
    let now = now();

    conn.execute(
        "INSERT INTO operators (id, email, name, role, api_key_hash, created_at, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &input.email,
            &input.name,
            input.role.as_ref(),
            &api_key_hash,
            now,
            created_by
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Operator with email {} already exists", input.email))
        } else {
            e.into()
        }
    })?;

    let operator = Operator {
        id,
        email: input.email.clone(),
        name: input.name.clone(),
        role: input.role,
        api_key_hash,
        created_at: now,
        created_by: created_by.cloned(),
    };

    Ok((operator, api_key))
}

pub fn get_operator_by_id(conn: &Connection, id: &OperatorId) -> Result<Option<Operator>> {
    query_one(
        conn,
        &format!("SELECT {} FROM operators WHERE id = ?1", OPERATOR_COLS),
        &[id],
    )
}

pub fn get_operator_by_api_key(conn: &Connection, api_key: &str) -> Result<Option<Operator>> {
    let hash = hash_secret(api_key);
    query_one(
        conn,
        &format!("SELECT {} FROM operators WHERE api_key_hash = ?1", OPERATOR_COLS),
        &[&hash],
    )
}

pub fn list_operators_paginated(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Operator>, i64)> {
    let total = count_operators(conn)?;
    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM operators ORDER BY created_at, id LIMIT ?1 OFFSET ?2",
            OPERATOR_COLS
        ),
        params![limit, offset],
    )?;
    Ok((items, total))
}

pub fn count_operators(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM operators", [], |row| row.get(0))
        .map_err(Into::into)
}

// ============ Licenses ============

/// Attempts at drawing an unused license key before giving up.
const LICENSE_KEY_ATTEMPTS: usize = 5;

pub fn create_license(conn: &Connection, input: &CreateLicense) -> Result<License> {
    let now = now();
    let valid_from = input.valid_from.unwrap_or(now);

    if input.seats_editor < 1 || input.seats_player < 1 {
        return Err(AppError::BadRequest(msg::INVALID_SEAT_COUNT.into()));
    }
    if input.valid_until <= valid_from {
        return Err(AppError::BadRequest(msg::INVALID_VALIDITY_WINDOW.into()));
    }
    if get_organization_by_id(conn, &input.organization_id)?.is_none() {
        return Err(AppError::NotFound(msg::ORGANIZATION_NOT_FOUND.into()));
    }

    let id = LicenseId::generate();
    let status = input.status.unwrap_or(LicenseStatus::Active);

    for _ in 0..LICENSE_KEY_ATTEMPTS {
        let license_key = generate_license_key();
        let inserted = conn.execute(
            "INSERT INTO licenses (id, license_key, organization_id, plan, status, seats_editor, seats_player, valid_from, valid_until, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                &id,
                &license_key,
                &input.organization_id,
                input.plan.as_ref(),
                status.as_ref(),
                input.seats_editor,
                input.seats_player,
                valid_from,
                input.valid_until,
                now,
                now
            ],
        );

        match inserted {
            Ok(_) => {
                return Ok(License {
                    id,
                    license_key,
                    organization_id: input.organization_id.clone(),
                    plan: input.plan,
                    status,
                    seats_editor: input.seats_editor,
                    seats_player: input.seats_player,
                    valid_from,
                    valid_until: input.valid_until,
                    created_at: now,
                    updated_at: now,
                });
            }
            Err(e) if is_unique_violation(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "Could not generate a unique license key".into(),
    ))
}

pub fn get_license_by_id(conn: &Connection, id: &LicenseId) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLS),
        &[id],
    )
}

/// Look up by a normalized license key.
pub fn get_license_by_key(conn: &Connection, license_key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE license_key = ?1", LICENSE_COLS),
        &[&license_key],
    )
}

pub fn list_licenses_paginated(
    conn: &Connection,
    organization_id: Option<&OrganizationId>,
    status: Option<LicenseStatus>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<License>, i64)> {
    let mut where_clause = String::from("WHERE 1=1");
    let mut filter_params: Vec<Value> = Vec::new();
    if let Some(org) = organization_id {
        where_clause.push_str(" AND organization_id = ?");
        filter_params.push(org.as_str().to_string().into());
    }
    if let Some(status) = status {
        where_clause.push_str(" AND status = ?");
        filter_params.push(status.as_ref().to_string().into());
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM licenses {}", where_clause),
        rusqlite::params_from_iter(filter_params.iter()),
        |row| row.get(0),
    )?;

    let mut select_params = filter_params;
    select_params.push(limit.into());
    select_params.push(offset.into());

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM licenses {} ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
        LICENSE_COLS, where_clause
    ))?;
    let items = stmt
        .query_map(
            rusqlite::params_from_iter(select_params.iter()),
            <License as super::from_row::FromRow>::from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((items, total))
}

/// Apply an administrative update. Validates the merged result before writing.
pub fn update_license(
    conn: &Connection,
    id: &LicenseId,
    input: &UpdateLicense,
) -> Result<Option<License>> {
    let Some(existing) = get_license_by_id(conn, id)? else {
        return Ok(None);
    };
    if input.is_empty() {
        return Ok(Some(existing));
    }

    let seats_editor = input.seats_editor.unwrap_or(existing.seats_editor);
    let seats_player = input.seats_player.unwrap_or(existing.seats_player);
    if seats_editor < 1 || seats_player < 1 {
        return Err(AppError::BadRequest(msg::INVALID_SEAT_COUNT.into()));
    }
    let valid_from = input.valid_from.unwrap_or(existing.valid_from);
    let valid_until = input.valid_until.unwrap_or(existing.valid_until);
    if valid_until <= valid_from {
        return Err(AppError::BadRequest(msg::INVALID_VALIDITY_WINDOW.into()));
    }

    UpdateBuilder::new("licenses", id.as_str())
        .with_updated_at()
        .set_opt("plan", input.plan.map(|p| p.as_ref().to_string()))
        .set_opt("status", input.status.map(|s| s.as_ref().to_string()))
        .set_opt("seats_editor", input.seats_editor)
        .set_opt("seats_player", input.seats_player)
        .set_opt("valid_from", input.valid_from)
        .set_opt("valid_until", input.valid_until)
        .execute_returning(conn, LICENSE_COLS)
}

/// Seats currently consumed: derived from active device rows, never a stored counter.
pub fn count_active_seats(
    conn: &Connection,
    license_id: &LicenseId,
    kind: ApplicationKind,
) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM devices WHERE license_id = ?1 AND application_kind = ?2 AND status = 'active'",
        params![license_id, kind.as_ref()],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

pub fn get_license_with_usage(
    conn: &Connection,
    id: &LicenseId,
) -> Result<Option<LicenseWithUsage>> {
    let Some(license) = get_license_by_id(conn, id)? else {
        return Ok(None);
    };
    let editor_seats_in_use = count_active_seats(conn, id, ApplicationKind::Editor)?;
    let player_seats_in_use = count_active_seats(conn, id, ApplicationKind::Player)?;
    Ok(Some(LicenseWithUsage {
        license,
        editor_seats_in_use,
        player_seats_in_use,
    }))
}

// ============ Devices ============

pub fn insert_device(
    conn: &Connection,
    license_id: &LicenseId,
    device_identifier: &str,
    kind: ApplicationKind,
    info: &DeviceInfo,
    now: i64,
) -> Result<Device> {
    let id = DeviceId::generate();

    conn.execute(
        "INSERT INTO devices (id, device_identifier, license_id, application_kind, name, os_info, status, activated_at, deactivated_at, last_seen_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'active', ?7, NULL, ?8)",
        params![
            &id,
            device_identifier,
            license_id,
            kind.as_ref(),
            &info.name,
            &info.os_info,
            now,
            now
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Device is already active on this license".into())
        } else {
            e.into()
        }
    })?;

    Ok(Device {
        id,
        device_identifier: device_identifier.to_string(),
        license_id: license_id.clone(),
        application_kind: kind,
        name: info.name.clone(),
        os_info: info.os_info.clone(),
        status: DeviceStatus::Active,
        activated_at: now,
        deactivated_at: None,
        last_seen_at: now,
    })
}

/// Refresh an existing active device on re-activation. Supplied metadata overwrites, absent keeps.
pub fn renew_device(
    conn: &Connection,
    id: &DeviceId,
    info: &DeviceInfo,
    now: i64,
) -> Result<Option<Device>> {
    query_one(
        conn,
        &format!(
            "UPDATE devices SET name = COALESCE(?1, name), os_info = COALESCE(?2, os_info), last_seen_at = ?3
             WHERE id = ?4 AND status = 'active' RETURNING {}",
            DEVICE_COLS
        ),
        params![&info.name, &info.os_info, now, id],
    )
}

pub fn get_device_by_id(conn: &Connection, id: &DeviceId) -> Result<Option<Device>> {
    query_one(
        conn,
        &format!("SELECT {} FROM devices WHERE id = ?1", DEVICE_COLS),
        &[id],
    )
}

pub fn get_active_device(
    conn: &Connection,
    license_id: &LicenseId,
    device_identifier: &str,
    kind: ApplicationKind,
) -> Result<Option<Device>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM devices
             WHERE license_id = ?1 AND device_identifier = ?2 AND application_kind = ?3 AND status = 'active'",
            DEVICE_COLS
        ),
        params![license_id, device_identifier, kind.as_ref()],
    )
}

/// All rows (any status) for an identifier under a license, newest first.
pub fn list_devices_by_identifier(
    conn: &Connection,
    license_id: &LicenseId,
    device_identifier: &str,
    kind: Option<ApplicationKind>,
) -> Result<Vec<Device>> {
    match kind {
        Some(kind) => query_all(
            conn,
            &format!(
                "SELECT {} FROM devices WHERE license_id = ?1 AND device_identifier = ?2 AND application_kind = ?3
                 ORDER BY activated_at DESC",
                DEVICE_COLS
            ),
            params![license_id, device_identifier, kind.as_ref()],
        ),
        None => query_all(
            conn,
            &format!(
                "SELECT {} FROM devices WHERE license_id = ?1 AND device_identifier = ?2
                 ORDER BY activated_at DESC",
                DEVICE_COLS
            ),
            params![license_id, device_identifier],
        ),
    }
}

pub fn list_devices_for_license_paginated(
    conn: &Connection,
    license_id: &LicenseId,
    status: Option<DeviceStatus>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Device>, i64)> {
    // NULL status filter matches everything
    let status = status.map(|s| s.as_ref().to_string());

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM devices WHERE license_id = ?1 AND (?2 IS NULL OR status = ?2)",
        params![license_id, &status],
        |row| row.get(0),
    )?;

    let items = query_all(
        conn,
        &format!(
            "SELECT {} FROM devices WHERE license_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY activated_at DESC, id LIMIT ?3 OFFSET ?4",
            DEVICE_COLS
        ),
        params![license_id, &status, limit, offset],
    )?;

    Ok((items, total))
}

/// Mark an active device deactivated. Returns false if it was not active.
pub fn deactivate_device(conn: &Connection, id: &DeviceId, now: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE devices SET status = 'deactivated', deactivated_at = ?1 WHERE id = ?2 AND status = 'active'",
        params![now, id],
    )?;
    Ok(updated > 0)
}

pub fn update_device_last_seen(conn: &Connection, id: &DeviceId, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE devices SET last_seen_at = ?1 WHERE id = ?2",
        params![now, id],
    )?;
    Ok(())
}

/// Hard delete. Credentials go with it via ON DELETE CASCADE.
pub fn delete_device(conn: &Connection, id: &DeviceId) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM devices WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Credentials (revocation store) ============

pub fn record_credential(
    conn: &Connection,
    credential_id: &CredentialId,
    owner: CredentialOwner<'_>,
    content_hash: &str,
    issued_at: i64,
    expires_at: i64,
) -> Result<()> {
    let (device_id, operator_id) = match owner {
        CredentialOwner::Device(id) => (Some(id), None),
        CredentialOwner::Operator(id) => (None, Some(id)),
    };

    conn.execute(
        "INSERT INTO credentials (credential_id, device_id, operator_id, content_hash, issued_at, expires_at, revoked, revoked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, NULL)",
        params![credential_id, device_id, operator_id, content_hash, issued_at, expires_at],
    )?;
    Ok(())
}

/// Fail closed: unknown (never recorded or already purged) counts as unusable.
pub fn is_credential_usable(conn: &Connection, credential_id: &CredentialId) -> Result<bool> {
    let revoked: Option<i32> = conn
        .query_row(
            "SELECT revoked FROM credentials WHERE credential_id = ?1",
            params![credential_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(revoked == Some(0))
}

pub fn get_credential(
    conn: &Connection,
    credential_id: &CredentialId,
) -> Result<Option<CredentialRecord>> {
    query_one(
        conn,
        &format!("SELECT {} FROM credentials WHERE credential_id = ?1", CREDENTIAL_COLS),
        &[credential_id],
    )
}

/// Idempotent. Returns true only if this call flipped the flag.
pub fn revoke_credential(
    conn: &Connection,
    credential_id: &CredentialId,
    now: i64,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE credentials SET revoked = 1, revoked_at = ?1 WHERE credential_id = ?2 AND revoked = 0",
        params![now, credential_id],
    )?;
    Ok(updated > 0)
}

pub fn revoke_all_for_device(conn: &Connection, device_id: &DeviceId, now: i64) -> Result<usize> {
    let updated = conn.execute(
        "UPDATE credentials SET revoked = 1, revoked_at = ?1 WHERE device_id = ?2 AND revoked = 0",
        params![now, device_id],
    )?;
    Ok(updated)
}

pub fn list_credentials_for_device(
    conn: &Connection,
    device_id: &DeviceId,
) -> Result<Vec<CredentialRecord>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM credentials WHERE device_id = ?1 ORDER BY issued_at DESC",
            CREDENTIAL_COLS
        ),
        &[device_id],
    )
}

/// Storage reclamation only. Safe to run at any time, at any frequency.
pub fn purge_expired_credentials(conn: &Connection, before: i64) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM credentials WHERE expires_at < ?1",
        params![before],
    )?;
    Ok(deleted)
}

// ============ Audit Events ============

pub fn insert_audit_event(conn: &Connection, event: &AuditEvent) -> Result<()> {
    let details_str = event.details.as_ref().map(|d| d.to_string());

    conn.execute(
        "INSERT INTO audit_events (id, created_at, action, actor_type, actor_id, device_id, license_id, details, ip_address, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            &event.id,
            event.created_at,
            &event.action,
            event.actor_type.as_ref(),
            &event.actor_id,
            &event.device_id,
            &event.license_id,
            &details_str,
            &event.ip_address,
            &event.user_agent
        ],
    )?;
    Ok(())
}

pub fn new_audit_event_id() -> String {
    EntityType::AuditEvent.gen_id()
}

/// Filtered audit query, newest first. Returns the page and the total match count.
pub fn query_audit_events(
    conn: &Connection,
    query: &AuditEventQuery,
    limit: i64,
    offset: i64,
) -> Result<(Vec<AuditEvent>, i64)> {
    let mut where_clause = String::from("WHERE 1=1");
    let mut filter_params: Vec<Value> = Vec::new();

    if let Some(ref v) = query.action {
        where_clause.push_str(" AND action = ?");
        filter_params.push(v.clone().into());
    }
    if let Some(ref v) = query.actor_id {
        where_clause.push_str(" AND actor_id = ?");
        filter_params.push(v.clone().into());
    }
    if let Some(ref v) = query.device_id {
        where_clause.push_str(" AND device_id = ?");
        filter_params.push(v.clone().into());
    }
    if let Some(ref v) = query.license_id {
        where_clause.push_str(" AND license_id = ?");
        filter_params.push(v.clone().into());
    }
    if let Some(v) = query.from_timestamp {
        where_clause.push_str(" AND created_at >= ?");
        filter_params.push(v.into());
    }
    if let Some(v) = query.to_timestamp {
        where_clause.push_str(" AND created_at <= ?");
        filter_params.push(v.into());
    }

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM audit_events {}", where_clause),
        rusqlite::params_from_iter(filter_params.iter()),
        |row| row.get(0),
    )?;

    let mut select_params = filter_params;
    select_params.push(limit.into());
    select_params.push(offset.into());

    // rowid breaks ties between events written in the same second
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM audit_events {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        AUDIT_EVENT_COLS, where_clause
    ))?;
    let events = stmt
        .query_map(
            rusqlite::params_from_iter(select_params.iter()),
            <AuditEvent as super::from_row::FromRow>::from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((events, total))
}

pub fn count_audit_events_by_action(conn: &Connection, since: i64) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT action, COUNT(*) FROM audit_events WHERE created_at >= ?1 GROUP BY action ORDER BY action",
    )?;
    let rows = stmt
        .query_map(params![since], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_audit_events_for_device(conn: &Connection, device_id: &DeviceId) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM audit_events WHERE device_id = ?1",
        params![device_id],
    )?;
    Ok(deleted)
}
