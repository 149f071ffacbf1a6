use serde::{Deserialize, Serialize};

use crate::id::OrganizationId;

/// Tenant boundary. Only the name is mutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrganization {
    pub name: String,
}
