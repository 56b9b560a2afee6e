//! In-memory account store for tests and local development.
//!
//! Uniqueness is checked under the table lock, so the check-then-insert is
//! atomic here just like the unique index is for Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Account, AccountStore, NewAccount, Role, StoreError};

#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_username_and_role(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| account.username == username && account.role == role)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().await;
        let mut matches: Vec<&Account> = accounts
            .values()
            .filter(|account| account.email.as_deref() == Some(email))
            .collect();
        // First match by creation time, mirroring the Postgres ordering.
        matches.sort_by_key(|account| account.created_at);
        Ok(matches.first().map(|account| (*account).clone()))
    }

    async fn create(&self, account: NewAccount) -> Result<Uuid, StoreError> {
        let mut accounts = self.accounts.lock().await;
        if accounts
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(StoreError::Conflict);
        }
        let id = Uuid::new_v4();
        accounts.insert(
            id,
            Account {
                id,
                username: account.username,
                email: account.email,
                password_hash: account.password_hash,
                role: account.role,
                mfa_secret: account.mfa_secret,
                mfa_enabled: false,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn set_mfa_enabled(&self, id: Uuid, enabled: bool) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(&id) {
            account.mfa_enabled = enabled;
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(&id) {
            account.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}
