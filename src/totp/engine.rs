//! Code generation parameters and verification for time-based one-time
//! passwords.
//!
//! Verification computes the code for the current 30-second window and
//! accepts the configured number of adjacent windows on each side to
//! tolerate clock drift. Code comparison inside `totp-rs` is constant time.
//! No used-code tracking exists: a valid code is accepted every time its
//! window matches, so replay within a window is possible. Nothing here
//! mutates state.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::debug;

const DIGITS: usize = 6;
const STEP_SECONDS: u64 = 30;

/// Number of adjacent 30-second windows accepted on each side of "now".
pub const DEFAULT_SKEW: u8 = 1;

/// Stateless TOTP parameter set shared by enrollment, login, and recovery.
#[derive(Clone, Debug)]
pub struct TotpEngine {
    issuer: String,
    skew: u8,
}

impl TotpEngine {
    #[must_use]
    pub fn new(issuer: String, skew: u8) -> Self {
        Self { issuer, skew }
    }

    /// Build the `otpauth://` provisioning URI rendered (externally) as an
    /// enrollment QR image.
    ///
    /// # Errors
    /// Returns an error when the secret is not valid base32 or too short;
    /// secrets issued by [`crate::totp::generate_secret`] always pass.
    pub fn provisioning_uri(&self, secret: &str, account_label: &str) -> Result<String> {
        let totp = self
            .build(secret, account_label)
            .map_err(|e| anyhow!("failed to build provisioning URI: {e}"))?;
        Ok(totp.get_url())
    }

    /// Verify a submitted code against a secret at the given unix time.
    ///
    /// Fails closed: a malformed secret, a code that is not exactly six
    /// digits, or an unbuildable parameter set all return `false` rather
    /// than a distinct error path.
    #[must_use]
    pub fn verify(&self, secret: &str, code: &str, now_unix: u64) -> bool {
        if code.len() != DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }

        match self.build(secret, "account") {
            Ok(totp) => totp.check(code, now_unix),
            Err(err) => {
                debug!("rejecting code against unusable secret: {err}");
                false
            }
        }
    }

    /// Verify a submitted code against the current system time.
    #[must_use]
    pub fn verify_now(&self, secret: &str, code: &str) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs());
        match now {
            Ok(now) => self.verify(secret, code, now),
            Err(_) => false,
        }
    }

    fn build(&self, secret: &str, account_label: &str) -> Result<TOTP, totp_rs::TotpUrlError> {
        let secret_bytes = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|_| totp_rs::TotpUrlError::Secret(String::new()))?;
        TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            self.skew,
            STEP_SECONDS,
            secret_bytes,
            Some(self.issuer.clone()),
            account_label.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totp::generate_secret;

    fn engine() -> TotpEngine {
        TotpEngine::new("EPL Zone".to_string(), DEFAULT_SKEW)
    }

    fn code_at(secret: &str, time: u64) -> String {
        let secret_bytes = Secret::Encoded(secret.to_string()).to_bytes().unwrap();
        let totp = TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            0,
            STEP_SECONDS,
            secret_bytes,
            Some("EPL Zone".to_string()),
            "account".to_string(),
        )
        .unwrap();
        totp.generate(time)
    }

    #[test]
    fn accepts_current_and_adjacent_windows() {
        let engine = engine();
        for _ in 0..16 {
            let secret = generate_secret().unwrap();
            let now = 1_700_000_000;
            let code = code_at(&secret, now);
            assert!(engine.verify(&secret, &code, now));
            assert!(engine.verify(&secret, &code, now - 30));
            assert!(engine.verify(&secret, &code, now + 30));
        }
    }

    #[test]
    fn rejects_code_two_windows_away() {
        let engine = engine();
        let secret = generate_secret().unwrap();
        let now = 1_700_000_010;
        let code = code_at(&secret, now);
        // Two windows ahead: outside the one-window skew on either side.
        assert!(!engine.verify(&secret, &code, now + 60));
        assert!(!engine.verify(&secret, &code, now - 60));
    }

    #[test]
    fn rejects_code_from_different_secret() {
        let engine = engine();
        let now = 1_700_000_000;
        for _ in 0..16 {
            let secret = generate_secret().unwrap();
            let other = generate_secret().unwrap();
            let code = code_at(&other, now);
            assert!(!engine.verify(&secret, &code, now));
        }
    }

    #[test]
    fn fails_closed_on_malformed_input() {
        let engine = engine();
        let secret = generate_secret().unwrap();
        let now = 1_700_000_000;

        // wrong length, non-numeric
        assert!(!engine.verify(&secret, "12345", now));
        assert!(!engine.verify(&secret, "1234567", now));
        assert!(!engine.verify(&secret, "12a456", now));
        assert!(!engine.verify(&secret, "", now));

        // secret with invalid encoding
        let code = code_at(&secret, now);
        assert!(!engine.verify("not base32!!", &code, now));
        assert!(!engine.verify("", &code, now));
    }

    #[test]
    fn provisioning_uri_is_deterministic_and_labeled() {
        let engine = engine();
        let secret = generate_secret().unwrap();
        let first = engine.provisioning_uri(&secret, "alice").unwrap();
        let second = engine.provisioning_uri(&secret, "alice").unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("otpauth://totp/"));
        assert!(first.contains("alice"));
        assert!(first.contains("EPL%20Zone"));
        assert!(first.contains(&secret));
    }

    #[test]
    fn provisioning_uri_rejects_bad_secret() {
        let engine = engine();
        assert!(engine.provisioning_uri("not base32!!", "alice").is_err());
    }
}
