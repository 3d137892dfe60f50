//! Password hashing with Argon2id
//!
//! Hashes are stored as PHC strings, which carry their own salt and
//! parameters.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::sync::OnceLock;
use thiserror::Error;

/// Identifier stored alongside each hash so the scheme can be rotated later
pub const HASH_VERSION: &str = "argon2id";

/// Errors raised while hashing or verifying passwords
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Hashing the password failed
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The stored hash could not be parsed
    #[error("Failed to parse password hash: {0}")]
    MalformedHash(String),
}

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC hash
///
/// Returns `Ok(false)` for a wrong password and an error only when the stored
/// hash itself is unusable.
pub fn verify_password(password_hash: &str, password: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Throwaway hash with the same parameters as real ones, built on first use
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("civictrack-unknown-account").ok())
        .as_deref()
}

/// Spend one verification's worth of work without an account
///
/// Lets a login for an unknown identifier take as long as one with a wrong
/// password. Always returns `false`.
pub fn verify_dummy(password: &str) -> bool {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(hash, password);
    }
    false
}
