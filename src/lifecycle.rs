//! Device and credential lifecycle: activate, validate, refresh, deactivate,
//! administrative revocation, and operator sessions.
//!
//! Every operation that mints a credential records it in the same transaction
//! as the business write it belongs to. Audit events are written after commit
//! and never affect the outcome.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use serde_json::json;

use crate::admission::{self, Admission};
use crate::audit::AuditTrail;
use crate::config::Config;
use crate::db::queries;
use crate::entitlements::Entitlements;
use crate::error::{AppError, CredentialError, Result, msg};
use crate::id::{CredentialId, DeviceId, OperatorId};
use crate::jwt::{CredentialCodec, DeviceClaims, OperatorClaims, VerifiedCredential};
use crate::models::{
    ActorType, ApplicationKind, AuditAction, CredentialOwner, Device, DeviceInfo, LicenseSummary,
    Operator, is_valid_device_identifier, normalize_license_key,
};
use crate::util::RequestMeta;

const DEVICE_METADATA_MAX_LEN: usize = 256;

/// Behaviour switches taken from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    pub seat_limit_enforced: bool,
    pub revoke_on_refresh: bool,
    pub refresh_grace_secs: u64,
}

impl LifecyclePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seat_limit_enforced: config.seat_limit_enforced,
            revoke_on_refresh: config.revoke_on_refresh,
            refresh_grace_secs: config.refresh_grace_secs,
        }
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            seat_limit_enforced: true,
            revoke_on_refresh: true,
            refresh_grace_secs: 7 * 86400,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivateRequest {
    pub license_key: String,
    pub device_identifier: String,
    pub application_kind: ApplicationKind,
    pub device_name: Option<String>,
    pub os_info: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivationResult {
    pub token: String,
    pub expires_at: i64,
    /// True when an already-active device was re-activated without consuming a seat
    pub renewed: bool,
    pub device: Device,
    pub license: LicenseSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<VerifiedCredential<DeviceClaims>>,
}

impl ValidationResult {
    fn invalid() -> Self {
        Self {
            valid: false,
            claims: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResult {
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeactivationResult {
    pub success: bool,
    /// Device rows moved to deactivated by this call (0 when already deactivated)
    pub deactivated: usize,
    pub credentials_revoked: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperatorSession {
    pub token: String,
    pub expires_at: i64,
    pub operator: Operator,
}

/// An operator authenticated by a usable operator credential.
#[derive(Debug, Clone)]
pub struct OperatorContext {
    pub operator: Operator,
    pub credential_id: CredentialId,
}

pub struct Lifecycle {
    codec: Arc<CredentialCodec>,
    entitlements: Entitlements,
    policy: LifecyclePolicy,
    audit: AuditTrail,
}

impl Lifecycle {
    pub fn new(
        codec: Arc<CredentialCodec>,
        entitlements: Entitlements,
        policy: LifecyclePolicy,
        audit: AuditTrail,
    ) -> Self {
        Self {
            codec,
            entitlements,
            policy,
            audit,
        }
    }

    /// Admit a device against a license key and issue it a credential.
    ///
    /// Input format is checked before any store access. Admission, the device
    /// upsert and the credential record commit together or not at all.
    pub fn activate(
        &self,
        conn: &mut Connection,
        req: &ActivateRequest,
        meta: &RequestMeta,
    ) -> Result<ActivationResult> {
        let license_key = normalize_license_key(&req.license_key)
            .ok_or_else(|| AppError::BadRequest(msg::INVALID_LICENSE_KEY.into()))?;
        if !is_valid_device_identifier(&req.device_identifier) {
            return Err(AppError::BadRequest(msg::INVALID_DEVICE_ID.into()));
        }
        let info = DeviceInfo {
            name: clean_metadata("device_name", req.device_name.as_deref())?,
            os_info: clean_metadata("os_info", req.os_info.as_deref())?,
        };
        let kind = req.application_kind;
        let now = Utc::now().timestamp();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let decision = admission::admit(
            &tx,
            &license_key,
            &req.device_identifier,
            kind,
            now,
            self.policy.seat_limit_enforced,
        )?;
        let renewed = decision.is_renewal();
        let license = decision.license;

        let device = match decision.outcome {
            Admission::Renew(existing) => queries::renew_device(&tx, &existing.id, &info, now)?
                .ok_or(AppError::DeviceNotFound)?,
            Admission::NewSeat { .. } => queries::insert_device(
                &tx,
                &license.id,
                &req.device_identifier,
                kind,
                &info,
                now,
            )?,
        };

        let claims = DeviceClaims {
            license_id: license.id.clone(),
            organization_id: license.organization_id.clone(),
            device_identifier: device.device_identifier.clone(),
            plan: license.plan,
            application_kind: kind,
            features: self.entitlements.features_for(license.plan, kind),
        };
        let minted = self.codec.mint_device(&device.id, claims)?;
        queries::record_credential(
            &tx,
            &minted.credential_id,
            CredentialOwner::Device(&device.id),
            &minted.content_hash,
            minted.issued_at,
            minted.expires_at,
        )?;

        tx.commit()?;

        tracing::info!(
            device_id = %device.id,
            license_id = %license.id,
            kind = %kind,
            renewed,
            credential_id = %minted.credential_id,
            "Device activated"
        );

        self.audit
            .event(AuditAction::DeviceActivate)
            .actor(ActorType::Device, Some(&device.device_identifier))
            .device(&device.id)
            .license(&license.id)
            .details(json!({
                "application_kind": kind,
                "renewed": renewed,
                "credential_id": minted.credential_id,
            }))
            .request(meta)
            .save();

        Ok(ActivationResult {
            token: minted.token,
            expires_at: minted.expires_at,
            renewed,
            device,
            license: license.summary(),
        })
    }

    /// Check signature, expiry and revocation. Never touches licenses or devices.
    ///
    /// An invalid credential is a normal result, not an error. Only store
    /// failures surface as `Err`.
    pub fn validate(&self, conn: &Connection, token: &str) -> Result<ValidationResult> {
        let verified = match self.codec.verify_device(token) {
            Ok(verified) => verified,
            Err(reason) => {
                tracing::debug!(%reason, "Device credential rejected");
                return Ok(ValidationResult::invalid());
            }
        };

        if !queries::is_credential_usable(conn, &verified.credential_id)? {
            tracing::debug!(
                credential_id = %verified.credential_id,
                "Device credential revoked or unknown"
            );
            return Ok(ValidationResult::invalid());
        }

        Ok(ValidationResult {
            valid: true,
            claims: Some(verified),
        })
    }

    /// Exchange a current (or recently expired) credential for a new one.
    ///
    /// License status, license expiry and device status are re-checked. The
    /// new credential carries the current feature set.
    pub fn refresh(
        &self,
        conn: &mut Connection,
        device_identifier: &str,
        token: &str,
        meta: &RequestMeta,
    ) -> Result<RefreshResult> {
        if !is_valid_device_identifier(device_identifier) {
            return Err(AppError::BadRequest(msg::INVALID_DEVICE_ID.into()));
        }

        let verified = self
            .codec
            .verify_device_for_refresh(token, self.policy.refresh_grace_secs)?;
        if verified.claims.device_identifier != device_identifier {
            return Err(CredentialError::WrongScope.into());
        }
        let device_id = DeviceId::new(verified.subject.clone());
        let now = Utc::now().timestamp();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !queries::is_credential_usable(&tx, &verified.credential_id)? {
            return Err(CredentialError::Revoked.into());
        }

        let device = queries::get_device_by_id(&tx, &device_id)?.ok_or(AppError::DeviceNotFound)?;
        if !device.is_active() {
            return Err(AppError::DeviceDeactivated);
        }
        let license = queries::get_license_by_id(&tx, &device.license_id)?
            .ok_or(AppError::LicenseNotFound)?;
        admission::check_license_usable(&license, now)?;

        let claims = DeviceClaims {
            license_id: license.id.clone(),
            organization_id: license.organization_id.clone(),
            device_identifier: device.device_identifier.clone(),
            plan: license.plan,
            application_kind: device.application_kind,
            features: self
                .entitlements
                .features_for(license.plan, device.application_kind),
        };
        let minted = self.codec.mint_device(&device.id, claims)?;
        queries::record_credential(
            &tx,
            &minted.credential_id,
            CredentialOwner::Device(&device.id),
            &minted.content_hash,
            minted.issued_at,
            minted.expires_at,
        )?;

        let predecessor_revoked = self.policy.revoke_on_refresh
            && queries::revoke_credential(&tx, &verified.credential_id, now)?;
        queries::update_device_last_seen(&tx, &device.id, now)?;

        tx.commit()?;

        tracing::info!(
            device_id = %device.id,
            credential_id = %minted.credential_id,
            previous = %verified.credential_id,
            predecessor_revoked,
            "Device credential refreshed"
        );

        self.audit
            .event(AuditAction::DeviceRefresh)
            .actor(ActorType::Device, Some(&device.device_identifier))
            .device(&device.id)
            .license(&license.id)
            .details(json!({
                "credential_id": minted.credential_id,
                "previous_credential_id": verified.credential_id,
                "predecessor_revoked": predecessor_revoked,
            }))
            .request(meta)
            .save();

        Ok(RefreshResult {
            token: minted.token,
            expires_at: minted.expires_at,
        })
    }

    /// Deactivate a device and revoke all of its credentials.
    ///
    /// Without `kind`, every active row for the identifier under the license is
    /// deactivated. Deactivating an already-deactivated device succeeds with
    /// `deactivated == 0`.
    pub fn deactivate(
        &self,
        conn: &mut Connection,
        license_key: &str,
        device_identifier: &str,
        kind: Option<ApplicationKind>,
        meta: &RequestMeta,
    ) -> Result<DeactivationResult> {
        let license_key = normalize_license_key(license_key)
            .ok_or_else(|| AppError::BadRequest(msg::INVALID_LICENSE_KEY.into()))?;
        if !is_valid_device_identifier(device_identifier) {
            return Err(AppError::BadRequest(msg::INVALID_DEVICE_ID.into()));
        }
        let now = Utc::now().timestamp();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let license =
            queries::get_license_by_key(&tx, &license_key)?.ok_or(AppError::LicenseNotFound)?;
        let rows = queries::list_devices_by_identifier(&tx, &license.id, device_identifier, kind)?;
        if rows.is_empty() {
            return Err(AppError::DeviceNotFound);
        }

        let mut deactivated: Vec<(Device, usize)> = Vec::new();
        for device in rows.into_iter().filter(Device::is_active) {
            if queries::deactivate_device(&tx, &device.id, now)? {
                let revoked = queries::revoke_all_for_device(&tx, &device.id, now)?;
                deactivated.push((device, revoked));
            }
        }

        tx.commit()?;

        let credentials_revoked: usize = deactivated.iter().map(|(_, n)| n).sum();

        if deactivated.is_empty() {
            tracing::debug!(license_id = %license.id, "Device already deactivated");
        }

        for (device, revoked) in &deactivated {
            tracing::info!(
                device_id = %device.id,
                license_id = %license.id,
                credentials_revoked = revoked,
                "Device deactivated"
            );
            self.audit
                .event(AuditAction::DeviceDeactivate)
                .actor(ActorType::Device, Some(&device.device_identifier))
                .device(&device.id)
                .license(&license.id)
                .details(json!({
                    "application_kind": device.application_kind,
                    "credentials_revoked": revoked,
                }))
                .request(meta)
                .save();
        }

        Ok(DeactivationResult {
            success: true,
            deactivated: deactivated.len(),
            credentials_revoked,
        })
    }

    /// Revoke one credential. Unknown or already-revoked ids are a no-op success.
    /// Returns whether this call changed anything.
    pub fn revoke_credential(
        &self,
        conn: &Connection,
        credential_id: &CredentialId,
        operator_id: &OperatorId,
        meta: &RequestMeta,
    ) -> Result<bool> {
        let now = Utc::now().timestamp();
        let record = queries::get_credential(conn, credential_id)?;
        let changed = queries::revoke_credential(conn, credential_id, now)?;

        if changed {
            tracing::info!(%credential_id, "Credential revoked");
            let mut event = self
                .audit
                .event(AuditAction::CredentialRevoke)
                .actor(ActorType::Operator, Some(operator_id.as_str()))
                .details(json!({ "credential_id": credential_id }))
                .request(meta);
            if let Some(device_id) = record.and_then(|r| r.device_id) {
                event = event.device(&device_id);
            }
            event.save();
        }

        Ok(changed)
    }

    /// Revoke every active credential of a device without changing its status.
    pub fn revoke_device_credentials(
        &self,
        conn: &Connection,
        device_id: &DeviceId,
        operator_id: &OperatorId,
        meta: &RequestMeta,
    ) -> Result<usize> {
        let device = queries::get_device_by_id(conn, device_id)?.ok_or(AppError::DeviceNotFound)?;
        let revoked = queries::revoke_all_for_device(conn, &device.id, Utc::now().timestamp())?;

        tracing::info!(device_id = %device.id, revoked, "Device credentials revoked");
        self.audit
            .event(AuditAction::DeviceCredentialsRevoke)
            .actor(ActorType::Operator, Some(operator_id.as_str()))
            .device(&device.id)
            .license(&device.license_id)
            .details(json!({ "credentials_revoked": revoked }))
            .request(meta)
            .save();

        Ok(revoked)
    }

    /// Hard-delete a device, its credentials and its audit history.
    pub fn delete_device(
        &self,
        conn: &Connection,
        device_id: &DeviceId,
        operator_id: &OperatorId,
        meta: &RequestMeta,
    ) -> Result<Device> {
        let device = queries::get_device_by_id(conn, device_id)?.ok_or(AppError::DeviceNotFound)?;
        queries::delete_device(conn, &device.id)?;

        if self.audit.is_enabled()
            && let Err(e) = self.audit.delete_for_device(&device.id)
        {
            tracing::warn!(
                device_id = %device.id,
                error = %e,
                "Failed to delete device audit history"
            );
        }

        tracing::info!(device_id = %device.id, "Device deleted");
        self.audit
            .event(AuditAction::DeviceDelete)
            .actor(ActorType::Operator, Some(operator_id.as_str()))
            .license(&device.license_id)
            .details(json!({
                "device_id": device.id,
                "device_identifier": device.device_identifier,
                "application_kind": device.application_kind,
            }))
            .request(meta)
            .save();

        Ok(device)
    }

    /// Drop credentials that expired before the refresh grace window.
    pub fn purge_expired(
        &self,
        conn: &Connection,
        operator_id: Option<&OperatorId>,
    ) -> Result<usize> {
        let grace = i64::try_from(self.policy.refresh_grace_secs).unwrap_or(i64::MAX);
        let cutoff = Utc::now().timestamp().saturating_sub(grace);
        let purged = queries::purge_expired_credentials(conn, cutoff)?;

        if purged > 0 {
            tracing::info!(purged, cutoff, "Purged expired credentials");
            let actor = match operator_id {
                Some(id) => (ActorType::Operator, Some(id.as_str())),
                None => (ActorType::System, None),
            };
            self.audit
                .event(AuditAction::CredentialPurge)
                .actor(actor.0, actor.1)
                .details(json!({ "purged": purged, "expired_before": cutoff }))
                .save();
        }

        Ok(purged)
    }

    /// Exchange an operator API key for an operator credential.
    pub fn open_operator_session(
        &self,
        conn: &Connection,
        api_key: &str,
        meta: &RequestMeta,
    ) -> Result<OperatorSession> {
        let operator =
            queries::get_operator_by_api_key(conn, api_key)?.ok_or(AppError::Unauthorized)?;

        let minted = self
            .codec
            .mint_operator(&operator.id, OperatorClaims { role: operator.role })?;
        queries::record_credential(
            conn,
            &minted.credential_id,
            CredentialOwner::Operator(&operator.id),
            &minted.content_hash,
            minted.issued_at,
            minted.expires_at,
        )?;

        self.audit
            .event(AuditAction::OperatorLogin)
            .actor(ActorType::Operator, Some(operator.id.as_str()))
            .details(json!({ "credential_id": minted.credential_id }))
            .request(meta)
            .save();

        Ok(OperatorSession {
            token: minted.token,
            expires_at: minted.expires_at,
            operator,
        })
    }

    pub fn close_operator_session(
        &self,
        conn: &Connection,
        session: &OperatorContext,
        meta: &RequestMeta,
    ) -> Result<()> {
        queries::revoke_credential(conn, &session.credential_id, Utc::now().timestamp())?;

        self.audit
            .event(AuditAction::OperatorLogout)
            .actor(ActorType::Operator, Some(session.operator.id.as_str()))
            .details(json!({ "credential_id": session.credential_id }))
            .request(meta)
            .save();
        Ok(())
    }

    /// Verify an operator credential the same way device credentials are
    /// verified, then load the operator. The role comes from the store, not the token.
    pub fn authenticate_operator(
        &self,
        conn: &Connection,
        token: &str,
    ) -> Result<OperatorContext> {
        let verified = self.codec.verify_operator(token)?;

        if !queries::is_credential_usable(conn, &verified.credential_id)? {
            return Err(CredentialError::Revoked.into());
        }

        let operator = queries::get_operator_by_id(conn, &OperatorId::new(verified.subject))?
            .ok_or(AppError::Unauthorized)?;

        Ok(OperatorContext {
            operator,
            credential_id: verified.credential_id,
        })
    }
}

fn clean_metadata(field: &str, value: Option<&str>) -> Result<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > DEVICE_METADATA_MAX_LEN {
        return Err(AppError::BadRequest(format!(
            "{} must be at most {} characters",
            field, DEVICE_METADATA_MAX_LEN
        )));
    }
    Ok(Some(value.to_string()))
}
