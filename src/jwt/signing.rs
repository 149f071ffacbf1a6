use std::collections::HashSet;

use jwt_simple::JWTError;
use jwt_simple::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use super::{
    DEVICE_AUDIENCE, DeviceClaims, MintedCredential, OPERATOR_AUDIENCE, OperatorClaims,
    VerifiedCredential,
};
use crate::config::{Config, ConfigError, MAX_DURATION_SECS, SIGNING_ALGORITHM, SigningKeyMaterial};
use crate::error::{AppError, CredentialError, Result};
use crate::id::{CredentialId, DeviceId, OperatorId};

/// Signs and verifies credentials with one Ed25519 key pair.
///
/// Built once at startup from immutable configuration and shared behind an `Arc`.
pub struct CredentialCodec {
    key_pair: Ed25519KeyPair,
    public_key: Ed25519PublicKey,
    public_key_b64: String,
    device_ttl_secs: u64,
    operator_ttl_secs: u64,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("public_key", &self.public_key_b64)
            .field("device_ttl_secs", &self.device_ttl_secs)
            .field("operator_ttl_secs", &self.operator_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl CredentialCodec {
    pub fn new(
        key: &SigningKeyMaterial,
        device_ttl_secs: u64,
        operator_ttl_secs: u64,
    ) -> std::result::Result<Self, ConfigError> {
        for (var, ttl) in [
            ("CREDENTIAL_TTL", device_ttl_secs),
            ("OPERATOR_CREDENTIAL_TTL", operator_ttl_secs),
        ] {
            if ttl == 0 || ttl > MAX_DURATION_SECS {
                return Err(ConfigError::Invalid {
                    var,
                    reason: format!("must be between 1 and {} seconds", MAX_DURATION_SECS),
                });
            }
        }

        let signing_key = ed25519_dalek::SigningKey::from_bytes(key.seed());
        let key_pair = Ed25519KeyPair::from_bytes(&signing_key.to_keypair_bytes()).map_err(|e| {
            ConfigError::Invalid {
                var: "SIGNING_PRIVATE_KEY",
                reason: e.to_string(),
            }
        })?;
        let public_key = Ed25519PublicKey::from_bytes(key.public_key()).map_err(|e| {
            ConfigError::Invalid {
                var: "SIGNING_PUBLIC_KEY",
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            key_pair,
            public_key,
            public_key_b64: key.public_key_b64(),
            device_ttl_secs,
            operator_ttl_secs,
        })
    }

    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Self::new(
            &config.signing_key,
            config.credential_ttl_secs,
            config.operator_credential_ttl_secs,
        )
    }

    pub fn algorithm(&self) -> &'static str {
        SIGNING_ALGORITHM
    }

    pub fn public_key_b64(&self) -> &str {
        &self.public_key_b64
    }

    /// Mint a device credential with a fresh credential id.
    pub fn mint_device(
        &self,
        device_id: &DeviceId,
        claims: DeviceClaims,
    ) -> Result<MintedCredential> {
        self.mint(claims, device_id.as_str(), DEVICE_AUDIENCE, self.device_ttl_secs)
    }

    /// Mint an operator session credential with a fresh credential id.
    pub fn mint_operator(
        &self,
        operator_id: &OperatorId,
        claims: OperatorClaims,
    ) -> Result<MintedCredential> {
        self.mint(claims, operator_id.as_str(), OPERATOR_AUDIENCE, self.operator_ttl_secs)
    }

    pub fn verify_device(
        &self,
        token: &str,
    ) -> std::result::Result<VerifiedCredential<DeviceClaims>, CredentialError> {
        self.verify(token, DEVICE_AUDIENCE, 0)
    }

    /// Like `verify_device`, but accepts a credential up to `grace_secs` past its expiry.
    pub fn verify_device_for_refresh(
        &self,
        token: &str,
        grace_secs: u64,
    ) -> std::result::Result<VerifiedCredential<DeviceClaims>, CredentialError> {
        self.verify(token, DEVICE_AUDIENCE, grace_secs)
    }

    pub fn verify_operator(
        &self,
        token: &str,
    ) -> std::result::Result<VerifiedCredential<OperatorClaims>, CredentialError> {
        self.verify(token, OPERATOR_AUDIENCE, 0)
    }

    fn mint<C>(
        &self,
        custom: C,
        subject: &str,
        audience: &str,
        ttl_secs: u64,
    ) -> Result<MintedCredential>
    where
        C: Serialize + DeserializeOwned,
    {
        let credential_id = CredentialId::generate();

        let claims = Claims::with_custom_claims(custom, Duration::from_secs(ttl_secs))
            .with_subject(subject)
            .with_audience(audience)
            .with_jwt_id(credential_id.as_str());

        let (issued_at, expires_at) = match (claims.issued_at, claims.expires_at) {
            (Some(iat), Some(exp)) => (iat.as_secs() as i64, exp.as_secs() as i64),
            _ => return Err(AppError::Internal("Claims missing timestamps".into())),
        };

        let token = self
            .key_pair
            .sign(claims)
            .map_err(|e| AppError::Internal(format!("Failed to sign credential: {}", e)))?;

        Ok(MintedCredential {
            content_hash: content_hash(&token),
            token,
            credential_id,
            issued_at,
            expires_at,
        })
    }

    fn verify<C>(
        &self,
        token: &str,
        audience: &str,
        tolerance_secs: u64,
    ) -> std::result::Result<VerifiedCredential<C>, CredentialError>
    where
        C: Serialize + DeserializeOwned,
    {
        // Pin the algorithm before anything else looks at the token.
        let metadata = Token::decode_metadata(token)
            .map_err(|e| CredentialError::Malformed(e.to_string()))?;
        if metadata.algorithm() != SIGNING_ALGORITHM {
            return Err(CredentialError::Malformed(format!(
                "unexpected algorithm {}",
                metadata.algorithm()
            )));
        }

        let options = VerificationOptions {
            allowed_audiences: Some(HashSet::from([audience.to_string()])),
            time_tolerance: Some(Duration::from_secs(tolerance_secs)),
            ..Default::default()
        };

        let claims = self
            .public_key
            .verify_token::<C>(token, Some(options))
            .map_err(map_jwt_error)?;

        let credential_id = claims
            .jwt_id
            .filter(|jti| CredentialId::is_well_formed(jti))
            .map(CredentialId::new)
            .ok_or_else(|| CredentialError::Malformed("missing credential id".into()))?;
        let subject = claims
            .subject
            .ok_or_else(|| CredentialError::Malformed("missing subject".into()))?;
        let (issued_at, expires_at) = match (claims.issued_at, claims.expires_at) {
            (Some(iat), Some(exp)) => (iat.as_secs() as i64, exp.as_secs() as i64),
            _ => return Err(CredentialError::Malformed("missing timestamps".into())),
        };

        Ok(VerifiedCredential {
            credential_id,
            subject,
            issued_at,
            expires_at,
            claims: claims.custom,
        })
    }
}

fn map_jwt_error(e: jwt_simple::Error) -> CredentialError {
    match e.downcast_ref::<JWTError>() {
        Some(JWTError::TokenHasExpired) => CredentialError::Expired,
        Some(JWTError::InvalidSignature) => CredentialError::InvalidSignature,
        Some(JWTError::RequiredAudienceMismatch | JWTError::RequiredAudienceMissing) => {
            CredentialError::WrongScope
        }
        _ => CredentialError::Malformed(e.to_string()),
    }
}

/// SHA-256 of a signed token, hex encoded. Identifies a token in logs without being a capability.
pub fn content_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
