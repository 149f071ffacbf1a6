//! Plan and application-kind to feature-tag resolution.
//!
//! Features are resolved once at mint time and embedded in the credential.
//! Changing this table only affects credentials minted afterwards.

use std::collections::HashMap;

use crate::config::ConfigError;
use crate::models::{ApplicationKind, Plan};

const BASIC_FEATURES: &[&str] = &["playback", "templates", "single_zone"];
const PRO_FEATURES: &[&str] = &[
    "playback",
    "templates",
    "premium_templates",
    "multi_zone",
    "scheduling",
];
const MAX_FEATURES: &[&str] = &[
    "playback",
    "templates",
    "premium_templates",
    "multi_zone",
    "scheduling",
    "analytics",
    "api_access",
    "white_label",
];

/// Static plan table: base features per plan plus per-kind additions.
#[derive(Debug, Clone)]
pub struct Entitlements {
    base: HashMap<Plan, Vec<String>>,
    additions: HashMap<(Plan, ApplicationKind), Vec<String>>,
}

impl Entitlements {
    pub fn new(
        base: HashMap<Plan, Vec<String>>,
        additions: HashMap<(Plan, ApplicationKind), Vec<String>>,
    ) -> Self {
        Self { base, additions }
    }

    /// The table shipped with the service.
    pub fn standard() -> Self {
        let owned = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect::<Vec<_>>();

        let base = HashMap::from([
            (Plan::Basic, owned(BASIC_FEATURES)),
            (Plan::Pro, owned(PRO_FEATURES)),
            (Plan::Max, owned(MAX_FEATURES)),
        ]);

        let additions = HashMap::from([
            ((Plan::Pro, ApplicationKind::Player), owned(&["auto_update"])),
            ((Plan::Max, ApplicationKind::Player), owned(&["auto_update", "remote_reboot"])),
            ((Plan::Max, ApplicationKind::Editor), owned(&["advanced_export"])),
        ]);

        Self { base, additions }
    }

    /// Ordered, duplicate-free feature tags for a plan and application kind.
    ///
    /// Base features come first in table order, then kind-specific additions.
    pub fn features_for(&self, plan: Plan, kind: ApplicationKind) -> Vec<String> {
        let base = self.base.get(&plan).into_iter().flatten();
        let extra = self.additions.get(&(plan, kind)).into_iter().flatten();

        let mut features: Vec<String> = Vec::new();
        for tag in base.chain(extra) {
            if !features.contains(tag) {
                features.push(tag.clone());
            }
        }
        features
    }

    /// Startup check: every plan must have a base entry with non-empty tags.
    /// A gap here is a configuration bug, never a request-time error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for plan in Plan::ALL {
            let Some(tags) = self.base.get(&plan) else {
                return Err(ConfigError::Invalid {
                    var: "entitlements",
                    reason: format!("plan '{}' has no feature list", plan),
                });
            };
            if tags.is_empty() {
                return Err(ConfigError::Invalid {
                    var: "entitlements",
                    reason: format!("plan '{}' has an empty feature list", plan),
                });
            }
            for kind in ApplicationKind::ALL {
                if let Some(extra) = self.additions.get(&(plan, kind))
                    && extra.iter().any(|t| t.trim().is_empty())
                {
                    return Err(ConfigError::Invalid {
                        var: "entitlements",
                        reason: format!("blank feature tag for {}/{}", plan, kind),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Entitlements {
    fn default() -> Self {
        Self::standard()
    }
}
