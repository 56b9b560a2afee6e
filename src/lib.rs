//! # Turnstile (EPL Zone authentication core)
//!
//! `turnstile` authenticates users of the EPL Zone portal and enforces a
//! two-factor login policy based on TOTP. It owns credential storage and
//! verification, TOTP secret issuance, the enrollment and login state
//! machines, and OTP-gated password recovery. The rest of the portal
//! (sports-data proxying, team/match/news CRUD, page rendering) lives behind
//! the sessions this service issues and is not part of this crate.
//!
//! ## Login roles
//!
//! Admin and client logins are distinct entry points. An account registered
//! under one role can never authenticate through the other route; a
//! cross-role attempt fails exactly like a wrong password.
//!
//! ## Sessions and pending tokens
//!
//! A single `HttpOnly` cookie carries whichever token the browser currently
//! holds: a full session, a pending enrollment token (`mfa_setup_` prefix),
//! or a pending login token (`mfa_challenge_` prefix). Pending tokens mark
//! "passed step N, not yet step N+1" and grant access only to their own
//! step. All tokens expire server-side; stale ones are rejected as
//! unauthorized.
//!
//! ## Error surface
//!
//! Per-request failures are mapped to generic messages at the HTTP boundary.
//! Unknown-user and wrong-password are indistinguishable, and so are
//! password and TOTP failures, to resist account enumeration.

pub mod api;
pub mod auth;
pub mod cli;
pub mod password;
pub mod session;
pub mod store;
pub mod totp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
