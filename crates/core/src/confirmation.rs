//! Confirmation codes for the signup flow.
//!
//! A code is an opaque random string mailed to the user. Only its SHA-256
//! hash is persisted, so a database leak does not reveal pending codes.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::Timestamp;

/// Default lifetime of an issued code, in minutes (three days).
pub const DEFAULT_CODE_TTL_MINS: i64 = 3 * 24 * 60;

/// Generate a new confirmation code.
///
/// Returns `(plaintext_code, sha256_hex_hash)`. The plaintext is mailed to
/// the user; only the hash should be stored.
pub fn generate_code() -> (String, String) {
    let plaintext = Uuid::new_v4().simple().to_string();
    let hash = hash_code(&plaintext);
    (plaintext, hash)
}

/// Compute the SHA-256 hex digest of a confirmation code.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a submitted code against the stored hash and expiry.
///
/// Returns `false` when no code is pending, when it has expired at `now`, or
/// when the hashes differ.
pub fn verify_code(
    submitted: &str,
    stored_hash: Option<&str>,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    let Some(stored_hash) = stored_hash else {
        return false;
    };
    if expires_at.is_some_and(|exp| exp <= now) {
        return false;
    }
    hash_code(submitted.trim()) == stored_hash
}
