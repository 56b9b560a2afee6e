//! Enrollment and authentication state machines.
//!
//! Flow Overview:
//! 1) Registration creates the account with its MFA secret and a pending
//!    enrollment token; the account stays unusable for login-with-MFA until
//!    a first TOTP code is verified.
//! 2) Login verifies the password for the role-scoped route. Accounts
//!    without MFA get a full session immediately; enrolled accounts get a
//!    pending login token and must pass the TOTP challenge first.
//! 3) Recovery resets the password with a TOTP code as the sole proof of
//!    identity; it never touches sessions.
//!
//! Security boundaries:
//! - Unknown-user, wrong-password, and wrong-role failures are one error.
//! - Pending tokens unlock exactly one step and expire server-side.
//! - No step ever reveals which account a pending token referenced.

pub mod config;
pub mod error;
pub mod rate_limit;

pub use config::AuthConfig;
pub use error::AuthError;
pub use rate_limit::{NoopRateLimiter, RateLimitAction, RateLimitDecision, RateLimiter};

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{info, warn};
use uuid::Uuid;

use crate::password;
use crate::session::{SessionKind, SessionTable, SessionTtls};
use crate::store::{AccountStore, NewAccount, Role};
use crate::totp::{self, TotpEngine};

/// Authenticated user context resolved from a full session token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub account_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// A full session plus the role-routed landing path.
#[derive(Clone, Debug)]
pub struct Authenticated {
    pub token: String,
    pub landing: &'static str,
}

/// Result of a password login.
#[derive(Clone, Debug)]
pub enum LoginOutcome {
    /// No MFA on the account; the session is live.
    Authenticated(Authenticated),
    /// Password accepted, TOTP pending. The token unlocks only the
    /// challenge step.
    MfaRequired { token: String },
}

/// Material the enrollment page presents: the raw secret as a manual
/// fallback and the URI rendered (externally) as a QR image.
#[derive(Clone, Debug)]
pub struct EnrollmentChallenge {
    pub secret: String,
    pub otpauth_url: String,
}

pub struct AuthService {
    store: Arc<dyn AccountStore>,
    sessions: SessionTable,
    totp: TotpEngine,
    rate_limiter: Arc<dyn RateLimiter>,
    config: AuthConfig,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, config: AuthConfig) -> Self {
        let sessions = SessionTable::new(SessionTtls {
            full: config.session_ttl(),
            enrollment: config.enrollment_ttl(),
            challenge: config.challenge_ttl(),
        });
        let totp = TotpEngine::new(config.issuer().to_string(), config.totp_skew());
        Self {
            store,
            sessions,
            totp,
            rate_limiter: Arc::new(NoopRateLimiter),
            config,
        }
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Enrollment step 1: create the account and hand back a pending
    /// enrollment token.
    ///
    /// The MFA secret is assigned here, exactly once; `mfa_enabled` stays
    /// false until a code is verified.
    ///
    /// # Errors
    /// `Conflict` when the username is taken; `Validation` on empty fields.
    pub async fn register(
        &self,
        role: Role,
        username: &str,
        email: Option<String>,
        password: &SecretString,
    ) -> Result<String, AuthError> {
        if username.is_empty() {
            return Err(AuthError::Validation("username cannot be empty"));
        }

        let mfa_secret = totp::generate_secret()?;
        let password_hash = password::hash(password)?;

        let id = self
            .store
            .create(NewAccount {
                username: username.to_string(),
                email,
                password_hash,
                role,
                mfa_secret,
            })
            .await?;

        let token = self.sessions.insert(id, SessionKind::EnrollmentSetup).await?;
        info!(account_id = %id, role = role.as_str(), "account registered, MFA setup pending");
        Ok(token)
    }

    /// Enrollment step 2 (presentation): resolve a pending enrollment token
    /// into the secret and provisioning URI.
    ///
    /// # Errors
    /// `Unauthorized` for a missing, expired, or wrong-kind token; which
    /// account would have been targeted is never revealed.
    pub async fn enrollment_challenge(
        &self,
        token: &str,
    ) -> Result<EnrollmentChallenge, AuthError> {
        let account = self.account_for(token, SessionKind::EnrollmentSetup).await?;
        let otpauth_url = self
            .totp
            .provisioning_uri(&account.mfa_secret, &account.username)?;
        Ok(EnrollmentChallenge {
            secret: account.mfa_secret,
            otpauth_url,
        })
    }

    /// Enrollment step 2 (verification): verify the first TOTP code, enable
    /// MFA, and clear the pending token. Failure leaves the token in place
    /// so the user can retry.
    ///
    /// Returns the account role so the caller can route to the matching
    /// login entry point; enrollment itself grants no session.
    pub async fn confirm_enrollment(
        &self,
        token: &str,
        code: &str,
        ip: Option<&str>,
    ) -> Result<Role, AuthError> {
        if self
            .rate_limiter
            .check_ip(ip, RateLimitAction::EnrollmentConfirm)
            == RateLimitDecision::Limited
        {
            return Err(AuthError::RateLimited);
        }

        let account = self.account_for(token, SessionKind::EnrollmentSetup).await?;

        if !self.totp.verify_now(&account.mfa_secret, code) {
            warn!(account_id = %account.id, "enrollment code rejected");
            return Err(AuthError::InvalidCode);
        }

        self.store.set_mfa_enabled(account.id, true).await?;
        self.sessions.remove(token).await;
        info!(account_id = %account.id, "MFA enrollment complete");
        Ok(account.role)
    }

    /// Login attempt for one role-scoped entry point.
    ///
    /// # Errors
    /// `InvalidCredentials` for unknown user, wrong password, or wrong
    /// role; the three are indistinguishable by design.
    pub async fn login(
        &self,
        role: Role,
        username: &str,
        password: &SecretString,
        ip: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        if self.rate_limiter.check_ip(ip, RateLimitAction::Login) == RateLimitDecision::Limited
            || self.rate_limiter.check_username(username, RateLimitAction::Login)
                == RateLimitDecision::Limited
        {
            return Err(AuthError::RateLimited);
        }

        let Some(account) = self.store.find_by_username_and_role(username, role).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify(password, &account.password_hash) {
            warn!(account_id = %account.id, "password rejected");
            return Err(AuthError::InvalidCredentials);
        }

        if account.mfa_enabled {
            let token = self
                .sessions
                .insert(account.id, SessionKind::MfaChallenge)
                .await?;
            info!(account_id = %account.id, "password accepted, TOTP pending");
            Ok(LoginOutcome::MfaRequired { token })
        } else {
            let token = self.sessions.insert(account.id, SessionKind::Full).await?;
            info!(account_id = %account.id, "authenticated without MFA");
            Ok(LoginOutcome::Authenticated(Authenticated {
                token,
                landing: account.role.landing(),
            }))
        }
    }

    /// Check that a pending login token references a live challenge.
    pub async fn challenge_pending(&self, token: &str) -> Result<(), AuthError> {
        self.account_for(token, SessionKind::MfaChallenge).await?;
        Ok(())
    }

    /// MFA challenge: verify the code for the pending login token and trade
    /// it for a full session. Failure leaves the challenge open for retry.
    pub async fn verify_challenge(
        &self,
        token: &str,
        code: &str,
        ip: Option<&str>,
    ) -> Result<Authenticated, AuthError> {
        if self.rate_limiter.check_ip(ip, RateLimitAction::MfaVerify) == RateLimitDecision::Limited
        {
            return Err(AuthError::RateLimited);
        }

        let account = self.account_for(token, SessionKind::MfaChallenge).await?;

        if self
            .rate_limiter
            .check_username(&account.username, RateLimitAction::MfaVerify)
            == RateLimitDecision::Limited
        {
            return Err(AuthError::RateLimited);
        }

        if !self.totp.verify_now(&account.mfa_secret, code) {
            warn!(account_id = %account.id, "challenge code rejected");
            return Err(AuthError::InvalidCode);
        }

        self.sessions.remove(token).await;
        let full = self.sessions.insert(account.id, SessionKind::Full).await?;
        info!(account_id = %account.id, "authenticated with MFA");
        Ok(Authenticated {
            token: full,
            landing: account.role.landing(),
        })
    }

    /// OTP-gated password reset; no session involved. The TOTP code is the
    /// sole proof of identity, so recovery is limited to enrolled accounts.
    ///
    /// # Errors
    /// `NotFound` for an unknown email (revealed, per the reference
    /// behavior); `Forbidden` when the account has no MFA.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &SecretString,
        ip: Option<&str>,
    ) -> Result<(), AuthError> {
        if self.rate_limiter.check_ip(ip, RateLimitAction::PasswordReset)
            == RateLimitDecision::Limited
        {
            return Err(AuthError::RateLimited);
        }

        let Some(account) = self.store.find_by_email(email).await? else {
            return Err(AuthError::NotFound);
        };

        if !account.mfa_enabled {
            return Err(AuthError::Forbidden);
        }

        if self
            .rate_limiter
            .check_username(&account.username, RateLimitAction::PasswordReset)
            == RateLimitDecision::Limited
        {
            return Err(AuthError::RateLimited);
        }

        if !self.totp.verify_now(&account.mfa_secret, code) {
            warn!(account_id = %account.id, "recovery code rejected");
            return Err(AuthError::InvalidCode);
        }

        let password_hash = password::hash(new_password)?;
        self.store
            .set_password_hash(account.id, &password_hash)
            .await?;
        info!(account_id = %account.id, "password reset via OTP");
        Ok(())
    }

    /// Resolve a full session token into a principal. Pending tokens never
    /// pass here.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let account = self.account_for(token, SessionKind::Full).await?;
        Ok(Principal {
            account_id: account.id,
            username: account.username,
            role: account.role,
        })
    }

    /// Drop whatever token the caller presented, full or pending.
    pub async fn logout(&self, token: &str) {
        self.sessions.remove(token).await;
    }

    async fn account_for(
        &self,
        token: &str,
        kind: SessionKind,
    ) -> Result<crate::store::Account, AuthError> {
        let entry = self
            .sessions
            .get(token)
            .await
            .ok_or(AuthError::Unauthorized)?;
        if entry.kind != kind {
            return Err(AuthError::Unauthorized);
        }
        // A session whose account vanished is treated like no session.
        self.store
            .find_by_id(entry.account_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}
