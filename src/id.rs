//! Prefixed ID generation and typed identifiers.
//!
//! Entity IDs use a `sc_` brand prefix: `sc_{entity}_{uuid_simple}` (32 hex chars,
//! no hyphens). Credential IDs are bare v4 UUIDs because they travel inside
//! signed tokens as the `jti` claim.
//!
//! Each identifier kind gets its own newtype so a `DeviceId` can never be passed
//! where a `CredentialId` is expected.

use std::fmt;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["sc_org_", "sc_lic_", "sc_dev_", "sc_aud_", "sc_op_"];

/// Validate that a string is a well-formed prefixed ID.
///
/// This is a cheap check to reject garbage before hitting the database.
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Entity types that have prefixed IDs.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    Organization,
    License,
    Device,
    AuditEvent,
    Operator,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Organization => "sc_org",
            Self::License => "sc_lic",
            Self::Device => "sc_dev",
            Self::AuditEvent => "sc_aud",
            Self::Operator => "sc_op",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().simple())
    }
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                self.0.to_sql()
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                String::column_result(value).map(Self)
            }
        }
    };
}

typed_id!(
    /// Organization (tenant) identifier.
    OrganizationId
);
typed_id!(
    /// License identifier (not the human-entered license key).
    LicenseId
);
typed_id!(
    /// Internal device row identifier (not the client-supplied device identifier).
    DeviceId
);
typed_id!(
    /// Operator identifier.
    OperatorId
);
typed_id!(
    /// Credential identifier; the revocation key carried as the token's `jti`.
    CredentialId
);

impl OrganizationId {
    pub fn generate() -> Self {
        Self(EntityType::Organization.gen_id())
    }
}

impl LicenseId {
    pub fn generate() -> Self {
        Self(EntityType::License.gen_id())
    }
}

impl DeviceId {
    pub fn generate() -> Self {
        Self(EntityType::Device.gen_id())
    }
}

impl OperatorId {
    pub fn generate() -> Self {
        Self(EntityType::Operator.gen_id())
    }
}

impl CredentialId {
    /// Fresh random identifier, never derived from token content.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Cheap format check before touching the revocation store.
    pub fn is_well_formed(s: &str) -> bool {
        Uuid::parse_str(s).is_ok()
    }
}
