use serde::{Deserialize, Serialize};

use crate::id::{CredentialId, LicenseId, OrganizationId};
use crate::models::{ApplicationKind, OperatorRole, Plan};

/// Audience for credentials held by devices.
pub const DEVICE_AUDIENCE: &str = "device";
/// Audience for credentials held by operators.
pub const OPERATOR_AUDIENCE: &str = "operator";

/// Custom claims carried by a device credential.
/// Standard claims (sub, aud, jti, iat, exp) are handled by jwt-simple; `sub` is the device row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceClaims {
    pub license_id: LicenseId,
    pub organization_id: OrganizationId,
    pub device_identifier: String,
    pub plan: Plan,
    pub application_kind: ApplicationKind,
    /// Resolved at mint time and never re-resolved
    pub features: Vec<String>,
}

impl DeviceClaims {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Custom claims carried by an operator session credential. `sub` is the operator id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorClaims {
    pub role: OperatorRole,
}

/// A freshly signed credential plus the facts the revocation store needs.
#[derive(Debug, Clone)]
pub struct MintedCredential {
    pub token: String,
    pub credential_id: CredentialId,
    pub issued_at: i64,
    pub expires_at: i64,
    /// SHA-256 of the token, hex encoded
    pub content_hash: String,
}

/// Claims recovered from a token whose signature, algorithm, audience and
/// expiry all checked out. Revocation is NOT checked here.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedCredential<C> {
    pub credential_id: CredentialId,
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
    #[serde(flatten)]
    pub claims: C,
}
