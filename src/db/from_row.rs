//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Models implement `FromRow` to define how they are built from a row; the
//! `*_COLS` constants fix the column order each implementation expects.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// A corrupt enum value surfaces as a row error instead of a panic.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const ORGANIZATION_COLS: &str = "id, name, created_at, updated_at";

pub const OPERATOR_COLS: &str = "id, email, name, role, api_key_hash, created_at, created_by";

pub const LICENSE_COLS: &str = "id, license_key, organization_id, plan, status, seats_editor, seats_player, valid_from, valid_until, created_at, updated_at";

pub const DEVICE_COLS: &str = "id, device_identifier, license_id, application_kind, name, os_info, status, activated_at, deactivated_at, last_seen_at";

pub const CREDENTIAL_COLS: &str =
    "credential_id, device_id, operator_id, content_hash, issued_at, expires_at, revoked, revoked_at";

pub const AUDIT_EVENT_COLS: &str = "id, created_at, action, actor_type, actor_id, device_id, license_id, details, ip_address, user_agent";

// ============ FromRow Implementations ============

impl FromRow for Organization {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Organization {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}

impl FromRow for Operator {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Operator {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: parse_enum(row, 3, "role")?,
            api_key_hash: row.get(4)?,
            created_at: row.get(5)?,
            created_by: row.get(6)?,
        })
    }
}

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            license_key: row.get(1)?,
            organization_id: row.get(2)?,
            plan: parse_enum(row, 3, "plan")?,
            status: parse_enum(row, 4, "status")?,
            seats_editor: row.get(5)?,
            seats_player: row.get(6)?,
            valid_from: row.get(7)?,
            valid_until: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

impl FromRow for Device {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Device {
            id: row.get(0)?,
            device_identifier: row.get(1)?,
            license_id: row.get(2)?,
            application_kind: parse_enum(row, 3, "application_kind")?,
            name: row.get(4)?,
            os_info: row.get(5)?,
            status: parse_enum(row, 6, "status")?,
            activated_at: row.get(7)?,
            deactivated_at: row.get(8)?,
            last_seen_at: row.get(9)?,
        })
    }
}

impl FromRow for CredentialRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(CredentialRecord {
            credential_id: row.get(0)?,
            device_id: row.get(1)?,
            operator_id: row.get(2)?,
            content_hash: row.get(3)?,
            issued_at: row.get(4)?,
            expires_at: row.get(5)?,
            revoked: row.get::<_, i32>(6)? != 0,
            revoked_at: row.get(7)?,
        })
    }
}

impl FromRow for AuditEvent {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        // Details are stored as JSON text; unparseable payloads are kept as a string
        let details = row.get::<_, Option<String>>(7)?.map(|raw| {
            serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
        });
        Ok(AuditEvent {
            id: row.get(0)?,
            created_at: row.get(1)?,
            action: row.get(2)?,
            actor_type: parse_enum(row, 3, "actor_type")?,
            actor_id: row.get(4)?,
            device_id: row.get(5)?,
            license_id: row.get(6)?,
            details,
            ip_address: row.get(8)?,
            user_agent: row.get(9)?,
        })
    }
}
