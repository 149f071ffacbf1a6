//! Operator API key generation and hashing.
//!
//! Keys are shown once at creation; only the salted SHA-256 digest is stored.

use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const API_KEY_PREFIX: &str = "sc_key_";

/// Generate an operator API key with the `sc_key_` prefix.
pub fn generate_api_key() -> String {
    format!("{}{}", API_KEY_PREFIX, Uuid::new_v4().simple())
}

/// Hash a secret for storage. Domain-separated so digests never collide with other uses of SHA-256.
pub fn hash_secret(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"seatcheck-v1:");
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
