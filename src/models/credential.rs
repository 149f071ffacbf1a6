use serde::{Deserialize, Serialize};

use crate::id::{CredentialId, DeviceId, OperatorId};

/// Revocation-store entry for one issued credential.
///
/// The store is the only revocation authority: a token whose entry is missing
/// is treated exactly like a revoked one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub credential_id: CredentialId,
    pub device_id: Option<DeviceId>,
    pub operator_id: Option<OperatorId>,
    /// SHA-256 of the signed token, for audit/debug only
    pub content_hash: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub revoked: bool,
    pub revoked_at: Option<i64>,
}

/// Who a credential was issued to.
#[derive(Debug, Clone, Copy)]
pub enum CredentialOwner<'a> {
    Device(&'a DeviceId),
    Operator(&'a OperatorId),
}
