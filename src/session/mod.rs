//! Server-side session table for full sessions and pending MFA tokens.
//!
//! Flow Overview:
//! - Tokens without a prefix are full, authenticated sessions.
//! - `mfa_setup_` tokens mark "registered, MFA setup not finished".
//! - `mfa_challenge_` tokens mark "password verified, TOTP pending".
//!
//! A pending token never grants access to protected resources; it only
//! unlocks its own next step. The raw token travels in one cookie, so the
//! three markers are mutually exclusive per browser session. Only a hash of
//! the token is kept server-side. Every entry carries a creation instant and
//! a kind-specific TTL; expired entries are rejected and pruned.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Prefix for pending enrollment tokens.
pub(crate) const ENROLLMENT_PREFIX: &str = "mfa_setup_";
/// Prefix for pending login (MFA challenge) tokens.
pub(crate) const CHALLENGE_PREFIX: &str = "mfa_challenge_";

/// Session kinds used to gate the enrollment and login state machines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionKind {
    /// Full session with normal access.
    Full,
    /// Pending enrollment token, limited to MFA setup.
    EnrollmentSetup,
    /// Pending login token, limited to TOTP verification.
    MfaChallenge,
}

impl SessionKind {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Self::Full => "",
            Self::EnrollmentSetup => ENROLLMENT_PREFIX,
            Self::MfaChallenge => CHALLENGE_PREFIX,
        }
    }

    /// Classify a session token by its prefix.
    pub(crate) fn from_token(token: &str) -> Self {
        if token.starts_with(ENROLLMENT_PREFIX) {
            Self::EnrollmentSetup
        } else if token.starts_with(CHALLENGE_PREFIX) {
            Self::MfaChallenge
        } else {
            Self::Full
        }
    }
}

/// One live session or pending token.
#[derive(Clone, Debug)]
pub struct SessionEntry {
    pub account_id: Uuid,
    pub kind: SessionKind,
    created_at: Instant,
}

/// Per-kind time-to-live budgets.
#[derive(Clone, Copy, Debug)]
pub struct SessionTtls {
    pub full: Duration,
    pub enrollment: Duration,
    pub challenge: Duration,
}

impl SessionTtls {
    fn for_kind(&self, kind: SessionKind) -> Duration {
        match kind {
            SessionKind::Full => self.full,
            SessionKind::EnrollmentSetup => self.enrollment,
            SessionKind::MfaChallenge => self.challenge,
        }
    }
}

/// In-memory token table keyed by token hash.
///
/// Externally synchronized state shared by request tasks; everything else in
/// the core is per-request.
#[derive(Debug)]
pub struct SessionTable {
    ttls: SessionTtls,
    entries: Mutex<HashMap<Vec<u8>, SessionEntry>>,
}

impl SessionTable {
    #[must_use]
    pub fn new(ttls: SessionTtls) -> Self {
        Self {
            ttls,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session of the given kind and return the raw token.
    ///
    /// # Errors
    /// Returns an error when the random source is unavailable.
    pub async fn insert(&self, account_id: Uuid, kind: SessionKind) -> Result<String> {
        let token = format!("{}{}", kind.prefix(), generate_token()?);
        let mut entries = self.entries.lock().await;
        // Opportunistic pruning keeps abandoned flows from accumulating.
        let ttls = self.ttls;
        entries.retain(|_, entry| entry.created_at.elapsed() < ttls.for_kind(entry.kind));
        entries.insert(
            hash_token(&token),
            SessionEntry {
                account_id,
                kind,
                created_at: Instant::now(),
            },
        );
        Ok(token)
    }

    /// Look up a token, enforcing its TTL. Expired entries are removed and
    /// reported as absent.
    pub async fn get(&self, token: &str) -> Option<SessionEntry> {
        let hash = hash_token(token);
        let mut entries = self.entries.lock().await;
        let entry = entries.get(&hash)?.clone();
        if entry.created_at.elapsed() >= self.ttls.for_kind(entry.kind) {
            entries.remove(&hash);
            return None;
        }
        // The prefix is cosmetic; the stored kind is authoritative. A token
        // whose prefix disagrees with its record was tampered with.
        if SessionKind::from_token(token) != entry.kind {
            entries.remove(&hash);
            return None;
        }
        Some(entry)
    }

    /// Remove a token on completion or abandonment of its step.
    pub async fn remove(&self, token: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(&hash_token(token));
    }
}

/// Create a new random token. The raw value is only returned to set the
/// cookie; the table stores a hash.
fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never sit in memory longer than needed.
fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}
