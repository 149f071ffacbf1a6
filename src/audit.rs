//! Audit trail: best-effort append, filtered query, per-action rollup.
//!
//! Writes never fail the operation that triggered them. A failed append is
//! logged at `warn` and dropped.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::db::{DbPool, queries};
use crate::error::Result;
use crate::id::{DeviceId, LicenseId};
use crate::models::{ActorType, AuditAction, AuditEvent, AuditEventQuery};
use crate::util::RequestMeta;

#[derive(Clone)]
pub struct AuditTrail {
    pool: DbPool,
    enabled: bool,
}

impl AuditTrail {
    pub fn new(pool: DbPool, enabled: bool) -> Self {
        Self { pool, enabled }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start building an event for `action`. Nothing is written until `save`.
    pub fn event(&self, action: AuditAction) -> AuditEventBuilder<'_> {
        AuditEventBuilder {
            trail: self,
            action,
            actor_type: ActorType::System,
            actor_id: None,
            device_id: None,
            license_id: None,
            details: None,
            meta: RequestMeta::default(),
        }
    }

    /// Persist an event. Failures are logged and swallowed.
    pub fn append(&self, event: &AuditEvent) {
        if !self.enabled {
            return;
        }

        let result = self
            .pool
            .get()
            .map_err(crate::error::AppError::from)
            .and_then(|conn| queries::insert_audit_event(&conn, event));

        if let Err(e) = result {
            tracing::warn!(
                action = %event.action,
                error = %e,
                "Failed to write audit event; continuing"
            );
        }
    }

    /// Newest-first page of events plus the total match count.
    /// `limit` is defaulted and clamped to `max_limit`.
    pub fn query(
        &self,
        query: &AuditEventQuery,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<(Vec<AuditEvent>, i64)> {
        let conn = self.pool.get()?;
        queries::query_audit_events(
            &conn,
            query,
            query.limit(default_limit, max_limit),
            query.offset(),
        )
    }

    /// Count of events per action since `since` (unix seconds).
    pub fn aggregate_by_action(&self, since: i64) -> Result<BTreeMap<String, i64>> {
        let conn = self.pool.get()?;
        let rows = queries::count_audit_events_by_action(&conn, since)?;
        Ok(rows.into_iter().collect())
    }

    /// Remove a deleted device's history.
    pub fn delete_for_device(&self, device_id: &DeviceId) -> Result<usize> {
        let conn = self.pool.get()?;
        queries::delete_audit_events_for_device(&conn, device_id)
    }
}

/// Fluent construction of audit events.
///
/// ```ignore
/// audit
///     .event(AuditAction::DeviceActivate)
///     .actor(ActorType::Device, Some(&device.device_identifier))
///     .device(&device.id)
///     .license(&license.id)
///     .details(serde_json::json!({ "renewed": false }))
///     .request(&meta)
///     .save();
/// ```
pub struct AuditEventBuilder<'a> {
    trail: &'a AuditTrail,
    action: AuditAction,
    actor_type: ActorType,
    actor_id: Option<String>,
    device_id: Option<String>,
    license_id: Option<String>,
    details: Option<serde_json::Value>,
    meta: RequestMeta,
}

impl AuditEventBuilder<'_> {
    pub fn actor(mut self, actor_type: ActorType, actor_id: Option<&str>) -> Self {
        self.actor_type = actor_type;
        self.actor_id = actor_id.map(String::from);
        self
    }

    pub fn device(mut self, device_id: &DeviceId) -> Self {
        self.device_id = Some(device_id.to_string());
        self
    }

    pub fn license(mut self, license_id: &LicenseId) -> Self {
        self.license_id = Some(license_id.to_string());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn request(mut self, meta: &RequestMeta) -> Self {
        self.meta = meta.clone();
        self
    }

    pub fn build(self) -> AuditEvent {
        AuditEvent {
            id: queries::new_audit_event_id(),
            created_at: Utc::now().timestamp(),
            action: self.action.as_ref().to_string(),
            actor_type: self.actor_type,
            actor_id: self.actor_id,
            device_id: self.device_id,
            license_id: self.license_id,
            details: self.details,
            ip_address: self.meta.ip_address,
            user_agent: self.meta.user_agent,
        }
    }

    /// Best-effort write; see `AuditTrail::append`.
    pub fn save(self) {
        let trail = self.trail;
        trail.append(&self.build());
    }
}
