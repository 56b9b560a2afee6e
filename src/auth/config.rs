//! Auth configuration, injected at process start.
//!
//! Nothing here has a hard-coded secret; every value comes from the CLI or
//! environment, and required ones abort startup when absent.

use std::time::Duration;

use crate::totp::engine::DEFAULT_SKEW;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 12 * 60 * 60;
const DEFAULT_ENROLLMENT_TTL_SECONDS: u64 = 10 * 60;
const DEFAULT_CHALLENGE_TTL_SECONDS: u64 = 5 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    issuer: String,
    totp_skew: u8,
    session_ttl: Duration,
    enrollment_ttl: Duration,
    challenge_ttl: Duration,
    secure_cookies: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(issuer: String) -> Self {
        Self {
            issuer,
            totp_skew: DEFAULT_SKEW,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            enrollment_ttl: Duration::from_secs(DEFAULT_ENROLLMENT_TTL_SECONDS),
            challenge_ttl: Duration::from_secs(DEFAULT_CHALLENGE_TTL_SECONDS),
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_totp_skew(mut self, skew: u8) -> Self {
        self.totp_skew = skew;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_enrollment_ttl(mut self, ttl: Duration) -> Self {
        self.enrollment_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_challenge_ttl(mut self, ttl: Duration) -> Self {
        self.challenge_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    #[must_use]
    pub fn totp_skew(&self) -> u8 {
        self.totp_skew
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    #[must_use]
    pub fn enrollment_ttl(&self) -> Duration {
        self.enrollment_ttl
    }

    #[must_use]
    pub fn challenge_ttl(&self) -> Duration {
        self.challenge_ttl
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = AuthConfig::new("EPL Zone".to_string());
        assert_eq!(config.issuer(), "EPL Zone");
        assert_eq!(config.totp_skew(), DEFAULT_SKEW);
        assert_eq!(
            config.session_ttl(),
            Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS)
        );
        assert!(!config.secure_cookies());

        let config = config
            .with_totp_skew(2)
            .with_session_ttl(Duration::from_secs(60))
            .with_enrollment_ttl(Duration::from_secs(30))
            .with_challenge_ttl(Duration::from_secs(15))
            .with_secure_cookies(true);

        assert_eq!(config.totp_skew(), 2);
        assert_eq!(config.session_ttl(), Duration::from_secs(60));
        assert_eq!(config.enrollment_ttl(), Duration::from_secs(30));
        assert_eq!(config.challenge_ttl(), Duration::from_secs(15));
        assert!(config.secure_cookies());
    }
}
