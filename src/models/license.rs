use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::id::{LicenseId, OrganizationId};

use super::ApplicationKind;

/// Alphabet for human-entered keys: no 0/O or 1/I/L lookalikes.
const LICENSE_KEY_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const LICENSE_KEY_GROUPS: usize = 4;
const LICENSE_KEY_GROUP_LEN: usize = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Plan {
    Basic,
    Pro,
    Max,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Basic, Plan::Pro, Plan::Max];
}

/// Administrative status. Independent of the validity window: an `Active`
/// license past `valid_until` is still rejected at use time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Suspended,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,
    pub license_key: String,
    pub organization_id: OrganizationId,
    pub plan: Plan,
    pub status: LicenseStatus,
    pub seats_editor: i64,
    pub seats_player: i64,
    pub valid_from: i64,
    pub valid_until: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl License {
    pub fn seat_capacity(&self, kind: ApplicationKind) -> i64 {
        match kind {
            ApplicationKind::Editor => self.seats_editor,
            ApplicationKind::Player => self.seats_player,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.valid_until
    }

    pub fn summary(&self) -> LicenseSummary {
        LicenseSummary {
            id: self.id.clone(),
            organization_id: self.organization_id.clone(),
            plan: self.plan,
            status: self.status,
            seats_editor: self.seats_editor,
            seats_player: self.seats_player,
            valid_until: self.valid_until,
        }
    }
}

/// What a device gets to see about its license. Never includes the key itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub id: LicenseId,
    pub organization_id: OrganizationId,
    pub plan: Plan,
    pub status: LicenseStatus,
    pub seats_editor: i64,
    pub seats_player: i64,
    pub valid_until: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseWithUsage {
    #[serde(flatten)]
    pub license: License,
    pub editor_seats_in_use: i64,
    pub player_seats_in_use: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLicense {
    pub organization_id: OrganizationId,
    pub plan: Plan,
    #[serde(default)]
    pub status: Option<LicenseStatus>,
    pub seats_editor: i64,
    pub seats_player: i64,
    /// Defaults to now
    #[serde(default)]
    pub valid_from: Option<i64>,
    pub valid_until: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLicense {
    pub plan: Option<Plan>,
    pub status: Option<LicenseStatus>,
    pub seats_editor: Option<i64>,
    pub seats_player: Option<i64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
}

impl UpdateLicense {
    pub fn is_empty(&self) -> bool {
        self.plan.is_none()
            && self.status.is_none()
            && self.seats_editor.is_none()
            && self.seats_player.is_none()
            && self.valid_from.is_none()
            && self.valid_until.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct LicenseListQuery {
    pub organization_id: Option<OrganizationId>,
    pub status: Option<LicenseStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Generate a license key in `XXXXX-XXXXX-XXXXX-XXXXX` form (~98 bits of entropy).
pub fn generate_license_key() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    (0..LICENSE_KEY_GROUPS)
        .map(|_| {
            (0..LICENSE_KEY_GROUP_LEN)
                .map(|_| LICENSE_KEY_ALPHABET[rng.gen_range(0..LICENSE_KEY_ALPHABET.len())] as char)
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonicalize a human-entered key (trim, uppercase) and check its format.
///
/// Returns `None` if the key cannot possibly exist, so callers can reject it
/// without a store lookup.
pub fn normalize_license_key(input: &str) -> Option<String> {
    let key = input.trim().to_ascii_uppercase();
    let groups: Vec<&str> = key.split('-').collect();

    let well_formed = groups.len() == LICENSE_KEY_GROUPS
        && groups.iter().all(|g| {
            g.len() == LICENSE_KEY_GROUP_LEN && g.bytes().all(|b| LICENSE_KEY_ALPHABET.contains(&b))
        });

    well_formed.then_some(key)
}
