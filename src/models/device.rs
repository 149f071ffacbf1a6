use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::id::{DeviceId, LicenseId};

pub const DEVICE_IDENTIFIER_MIN_LEN: usize = 10;
pub const DEVICE_IDENTIFIER_MAX_LEN: usize = 256;

/// Category of client consuming a seat.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationKind {
    Editor,
    Player,
}

impl ApplicationKind {
    pub const ALL: [ApplicationKind; 2] = [ApplicationKind::Editor, ApplicationKind::Player];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Deactivated,
}

/// One activated client instance.
///
/// Deactivation is terminal for the row: activating the same identifier again
/// creates a fresh row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// Client-supplied, opaque
    pub device_identifier: String,
    pub license_id: LicenseId,
    pub application_kind: ApplicationKind,
    pub name: Option<String>,
    pub os_info: Option<String>,
    pub status: DeviceStatus,
    pub activated_at: i64,
    pub deactivated_at: Option<i64>,
    pub last_seen_at: i64,
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }
}

/// Client-reported details stored alongside the device row.
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    pub name: Option<String>,
    pub os_info: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceListQuery {
    pub status: Option<DeviceStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn is_valid_device_identifier(identifier: &str) -> bool {
    let len = identifier.chars().count();
    (DEVICE_IDENTIFIER_MIN_LEN..=DEVICE_IDENTIFIER_MAX_LEN).contains(&len)
}
