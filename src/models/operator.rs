use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::id::OperatorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperatorRole {
    Owner,
    Admin,
    View,
}

impl OperatorRole {
    /// Owner and Admin may mutate licenses, devices and credentials.
    pub fn can_write(&self) -> bool {
        matches!(self, OperatorRole::Owner | OperatorRole::Admin)
    }

    /// Only an Owner may manage other operators.
    pub fn can_manage_operators(&self) -> bool {
        matches!(self, OperatorRole::Owner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub id: OperatorId,
    pub email: String,
    pub name: String,
    pub role: OperatorRole,
    #[serde(skip_serializing, default)]
    pub api_key_hash: String,
    pub created_at: i64,
    pub created_by: Option<OperatorId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOperator {
    pub email: String,
    pub name: String,
    pub role: OperatorRole,
}
