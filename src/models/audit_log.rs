use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActorType {
    Operator,
    Device,
    System,
}

/// Every security-relevant action the core records.
///
/// Tags are `{subject}_{verb}`; the stored string is the snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditAction {
    DeviceActivate,
    DeviceRefresh,
    DeviceDeactivate,
    DeviceDelete,
    DeviceCredentialsRevoke,
    CredentialRevoke,
    CredentialPurge,
    LicenseCreate,
    LicenseUpdate,
    OrganizationCreate,
    OrganizationUpdate,
    OperatorCreate,
    OperatorBootstrap,
    OperatorLogin,
    OperatorLogout,
    DevDataSeed,
}

/// Append-only audit fact. Never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub created_at: i64,
    pub action: String,
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub device_id: Option<String>,
    pub license_id: Option<String>,
    /// Free-form per-action payload
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditEventQuery {
    pub action: Option<String>,
    pub actor_id: Option<String>,
    pub device_id: Option<String>,
    pub license_id: Option<String>,
    pub from_timestamp: Option<i64>,
    pub to_timestamp: Option<i64>,
    /// Clamped to the configured maximum page size
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditEventQuery {
    /// Get the limit, defaulted and clamped to `1..=max`
    pub fn limit(&self, default: i64, max: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, max.max(1))
    }

    /// Get the offset, minimum 0
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

impl AuditEvent {
    /// Format as a human-readable line.
    ///
    /// Format: `[TIMESTAMP] [ActorType] Actor VERB SUBJECT [device ID] [license ID]`
    ///
    /// Example:
    /// - `[2024-01-15 14:32:05] [Device]   (kiosk-lobby-01) activated device sc_dev_... license sc_lic_...`
    pub fn formatted(&self) -> String {
        use chrono::{TimeZone, Utc};

        let timestamp = Utc
            .timestamp_opt(self.created_at, 0)
            .single()
            .map(|dt| format!("[{}]", dt.format("%Y-%m-%d %H:%M:%S")))
            .unwrap_or_else(|| format!("[{}]", self.created_at));

        // Fixed width for alignment; [Operator] is the longest
        let actor_type = match self.actor_type {
            ActorType::Operator => "[Operator]",
            ActorType::Device => "[Device]  ",
            ActorType::System => "[System]  ",
        };

        let actor_display = self
            .actor_id
            .as_ref()
            .map(|id| format!(" ({})", id))
            .unwrap_or_default();

        let mut line = format!(
            "{} {}{} {}",
            timestamp,
            actor_type,
            actor_display,
            Self::action_to_verb_phrase(&self.action)
        );

        if let Some(ref device_id) = self.device_id {
            line.push_str(&format!(" {}", device_id));
        }
        if let Some(ref license_id) = self.license_id {
            line.push_str(&format!(" license {}", license_id));
        }

        line
    }

    /// Convert a `{subject}_{verb}` action tag to a past-tense phrase.
    /// e.g., "device_credentials_revoke" -> "revoked device credentials"
    fn action_to_verb_phrase(action: &str) -> String {
        match action.rsplit_once('_') {
            Some((subject, verb)) => {
                format!("{} {}", Self::to_past_tense(verb), subject.replace('_', " "))
            }
            None => action.to_string(),
        }
    }

    fn to_past_tense(verb: &str) -> &str {
        match verb {
            "activate" => "activated",
            "refresh" => "refreshed",
            "deactivate" => "deactivated",
            "delete" => "deleted",
            "revoke" => "revoked",
            "purge" => "purged",
            "create" => "created",
            "update" => "updated",
            "bootstrap" => "bootstrapped",
            "login" => "logged in",
            "logout" => "logged out",
            "seed" => "seeded",
            other => other,
        }
    }
}

/// Wrapper that adds the human-readable line to JSON responses.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEventResponse {
    #[serde(flatten)]
    pub event: AuditEvent,
    pub formatted: String,
}

impl From<AuditEvent> for AuditEventResponse {
    fn from(event: AuditEvent) -> Self {
        let formatted = event.formatted();
        Self { event, formatted }
    }
}
