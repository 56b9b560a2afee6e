//! Password hashing and verification.
//!
//! Argon2id with a per-call random salt; the PHC string output embeds the
//! salt and work-factor parameters, so verification needs no side channel.
//! Plaintext passwords never appear in logs or in the store.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

/// Hash a plaintext password into a PHC-format string.
///
/// # Errors
/// Returns an error when the hashing primitive fails; callers treat that as
/// fatal for the request rather than degrading to a weaker hash.
pub fn hash(password: &SecretString) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("failed to hash password: {e}"))
}

/// Verify a plaintext password against a stored PHC hash in constant time.
///
/// An unparsable stored hash counts as a mismatch; it is logged nowhere to
/// avoid hinting at stored-credential state.
#[must_use]
pub fn verify(password: &SecretString, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok()
}
