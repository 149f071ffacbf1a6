use std::env;
use std::fmt;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::SigningKey;
use thiserror::Error;

/// The only signing algorithm the codec accepts. Not negotiable per request.
pub const SIGNING_ALGORITHM: &str = "EdDSA";

/// Upper bound for every configured duration (ten years). Credential expiry
/// timestamps must stay representable when this is added to the current time.
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 86400;

/// Startup configuration failures. All of these are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.into(),
    }
}

/// Ed25519 key pair loaded once at startup.
///
/// `Debug` is redacted; the seed never leaves this struct except to build the codec.
#[derive(Clone)]
pub struct SigningKeyMaterial {
    seed: [u8; 32],
    public_key: [u8; 32],
}

impl SigningKeyMaterial {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let public_key = SigningKey::from_bytes(&seed).verifying_key().to_bytes();
        Self { seed, public_key }
    }

    /// Generate a fresh random key pair (tests and `--generate-key`).
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_seed(signing_key.to_bytes())
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn seed_b64(&self) -> String {
        BASE64.encode(self.seed)
    }

    pub fn public_key_b64(&self) -> String {
        BASE64.encode(self.public_key)
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("seed", &"<redacted>")
            .field("public_key", &self.public_key_b64())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub audit_database_path: String,
    pub db_pool_size: u32,
    pub signing_key: SigningKeyMaterial,
    pub credential_ttl_secs: u64,
    pub operator_credential_ttl_secs: u64,
    /// How long after expiry a device credential may still be refreshed
    pub refresh_grace_secs: u64,
    pub revoke_on_refresh: bool,
    /// Migration/testing escape hatch. Defaults to enforced.
    pub seat_limit_enforced: bool,
    pub audit_log_enabled: bool,
    pub audit_query_default_limit: i64,
    pub audit_query_max_limit: i64,
    pub request_timeout: Duration,
    pub purge_interval: Duration,
    pub bootstrap_operator_email: Option<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let dev_mode = get("SEATCHECK_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|_| invalid("PORT", format!("'{}'", p)))?,
            None => 3000,
        };

        let algorithm = get("SIGNING_ALGORITHM").unwrap_or_else(|| SIGNING_ALGORITHM.to_string());
        if algorithm != SIGNING_ALGORITHM {
            return Err(invalid(
                "SIGNING_ALGORITHM",
                format!("only {} is supported, got '{}'", SIGNING_ALGORITHM, algorithm),
            ));
        }

        let signing_key = load_signing_key(&get)?;

        let credential_ttl_secs = duration_var(&get, "CREDENTIAL_TTL", "30d")?;
        let operator_credential_ttl_secs = duration_var(&get, "OPERATOR_CREDENTIAL_TTL", "12h")?;
        if credential_ttl_secs == 0 {
            return Err(invalid("CREDENTIAL_TTL", "must be greater than zero"));
        }
        if operator_credential_ttl_secs == 0 {
            return Err(invalid("OPERATOR_CREDENTIAL_TTL", "must be greater than zero"));
        }

        let audit_query_default_limit = int_var(&get, "AUDIT_QUERY_DEFAULT_LIMIT", 50)?;
        let audit_query_max_limit = int_var(&get, "AUDIT_QUERY_MAX_LIMIT", 500)?;
        if audit_query_default_limit < 1 || audit_query_max_limit < audit_query_default_limit {
            return Err(invalid(
                "AUDIT_QUERY_MAX_LIMIT",
                "must be at least AUDIT_QUERY_DEFAULT_LIMIT, which must be at least 1",
            ));
        }

        let request_timeout = duration_var(&get, "REQUEST_TIMEOUT", "30s")?;
        let purge_interval = duration_var(&get, "PURGE_INTERVAL", "1h")?;
        if request_timeout == 0 {
            return Err(invalid("REQUEST_TIMEOUT", "must be greater than zero"));
        }
        if purge_interval == 0 {
            return Err(invalid("PURGE_INTERVAL", "must be greater than zero"));
        }

        Ok(Self {
            host,
            port,
            database_path: get("DATABASE_PATH").unwrap_or_else(|| "seatcheck.db".to_string()),
            audit_database_path: get("AUDIT_DATABASE_PATH")
                .unwrap_or_else(|| "seatcheck_audit.db".to_string()),
            db_pool_size: int_var(&get, "DB_POOL_SIZE", 10)?.clamp(1, 64) as u32,
            signing_key,
            credential_ttl_secs,
            operator_credential_ttl_secs,
            refresh_grace_secs: duration_var(&get, "REFRESH_GRACE", "7d")?,
            revoke_on_refresh: bool_var(&get, "REVOKE_ON_REFRESH", true)?,
            seat_limit_enforced: bool_var(&get, "SEAT_LIMIT_ENFORCED", true)?,
            audit_log_enabled: bool_var(&get, "AUDIT_LOG_ENABLED", true)?,
            audit_query_default_limit,
            audit_query_max_limit,
            request_timeout: Duration::from_secs(request_timeout),
            purge_interval: Duration::from_secs(purge_interval),
            bootstrap_operator_email: get("BOOTSTRAP_OPERATOR_EMAIL"),
            dev_mode,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn load_signing_key<G>(get: &G) -> Result<SigningKeyMaterial, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let encoded = match (get("SIGNING_PRIVATE_KEY"), get("SIGNING_PRIVATE_KEY_FILE")) {
        (Some(key), _) => key,
        (None, Some(path)) => {
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?
        }
        (None, None) => return Err(ConfigError::Missing("SIGNING_PRIVATE_KEY")),
    };

    let seed: [u8; 32] = BASE64
        .decode(encoded.trim())
        .map_err(|e| invalid("SIGNING_PRIVATE_KEY", format!("not base64: {}", e)))?
        .try_into()
        .map_err(|_| invalid("SIGNING_PRIVATE_KEY", "must decode to 32 bytes"))?;

    let material = SigningKeyMaterial::from_seed(seed);

    if let Some(public) = get("SIGNING_PUBLIC_KEY")
        && public.trim() != material.public_key_b64()
    {
        return Err(invalid(
            "SIGNING_PUBLIC_KEY",
            "does not match SIGNING_PRIVATE_KEY",
        ));
    }

    Ok(material)
}

fn duration_var<G>(get: &G, var: &'static str, default: &str) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let raw = get(var).unwrap_or_else(|| default.to_string());
    let secs =
        parse_duration(&raw).ok_or_else(|| invalid(var, format!("'{}' is not a duration", raw)))?;
    if secs > MAX_DURATION_SECS {
        return Err(invalid(
            var,
            format!("'{}' exceeds the maximum of {}s", raw, MAX_DURATION_SECS),
        ));
    }
    Ok(secs)
}

fn int_var<G>(get: &G, var: &'static str, default: i64) -> Result<i64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(v) => v.trim().parse().map_err(|_| invalid(var, format!("'{}'", v))),
        None => Ok(default),
    }
}

fn bool_var<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(var, format!("'{}' is not a boolean", v))),
        },
    }
}

/// Parse a duration string into seconds.
///
/// Accepts bare seconds (`"3600"`) or a number with one unit suffix:
/// `s`, `m`, `h`, `d`, `w` (`"30d"`, `"12h"`).
pub fn parse_duration(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);
    let value: u64 = digits.parse().ok()?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 7 * 86400,
        _ => return None,
    };

    value.checked_mul(multiplier)
}
