//! Account storage contract.
//!
//! The core consumes its datastore only through [`AccountStore`]; the rest
//! of the portal owns the datastore itself. Username uniqueness is the
//! store's job (a unique index, not a read-before-insert), surfaced to the
//! core as [`StoreError::Conflict`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

/// Access class determining which protected operations a session may
/// perform. Set at registration, immutable thereafter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Client => "client",
        }
    }

    /// Parse the persisted textual value into a typed enum.
    pub(crate) fn from_db(value: &str) -> Result<Self, sqlx::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            _ => Err(sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid accounts.role value: {value}"),
            )))),
        }
    }

    /// Landing route an authenticated session of this role is routed to.
    #[must_use]
    pub fn landing(self) -> &'static str {
        match self {
            Self::Admin => "/dashboard",
            Self::Client => "/live",
        }
    }
}

/// One user account.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub mfa_secret: String,
    pub mfa_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields the enrollment state machine supplies at registration.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub mfa_secret: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The username is already taken (unique-index violation).
    #[error("username already exists")]
    Conflict,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Contract the core requires of its account datastore.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by exact username within one login role. Admin and
    /// client routes must never cross-match.
    async fn find_by_username_and_role(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// First account matching the email, if any. Emails are not unique; the
    /// recovery flow accepts the first match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Create an account with `mfa_enabled = false`. The store assigns the
    /// id and enforces username uniqueness.
    async fn create(&self, account: NewAccount) -> Result<Uuid, StoreError>;

    async fn set_mfa_enabled(&self, id: Uuid, enabled: bool) -> Result<(), StoreError>;

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;
}
