//! MFA secret generation.
//!
//! Secrets are 160 bits from the operating system CSPRNG, encoded in RFC 4648
//! base32 without padding so they can be typed into an authenticator app by
//! hand. A secret is assigned to an account exactly once, at registration.

use anyhow::{Context, Result};
use data_encoding::BASE32_NOPAD;
use rand::{rngs::OsRng, RngCore};

/// Raw secret length in bytes (160 bits).
const SECRET_LEN: usize = 20;

/// Generate a new base32-encoded MFA secret.
///
/// # Errors
/// Returns an error when the operating system random source is unavailable;
/// callers treat that as fatal for the request.
pub fn generate_secret() -> Result<String> {
    let mut bytes = [0u8; SECRET_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate MFA secret")?;
    Ok(BASE32_NOPAD.encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::BASE32_NOPAD;

    #[test]
    fn secret_is_base32_and_160_bits() {
        let secret = generate_secret().unwrap();
        // 20 bytes -> 32 base32 characters, no padding
        assert_eq!(secret.len(), 32);
        let decoded = BASE32_NOPAD.decode(secret.as_bytes()).unwrap();
        assert_eq!(decoded.len(), SECRET_LEN);
    }

    #[test]
    fn secrets_are_unique() {
        let first = generate_secret().unwrap();
        let second = generate_secret().unwrap();
        assert_ne!(first, second);
    }
}
