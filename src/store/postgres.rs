//! Postgres-backed account store.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{Account, AccountStore, NewAccount, Role, StoreError};

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<'r> FromRow<'r, PgRow> for Account {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: Role::from_db(&role)?,
            mfa_secret: row.try_get("mfa_secret")?,
            mfa_enabled: row.try_get("mfa_enabled")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, username, email, password_hash, role, mfa_secret, mfa_enabled, created_at";

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_username_and_role(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<Account>, StoreError> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1 AND role = $2");
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to look up account by username and role")?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to look up account by id")?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        // Emails are not unique; ordering makes "first match" deterministic.
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1 ORDER BY created_at LIMIT 1"
        );
        let row = sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to look up account by email")?;
        Ok(row)
    }

    async fn create(&self, account: NewAccount) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let query = r"
            INSERT INTO accounts
                (id, username, email, password_hash, role, mfa_secret, mfa_enabled)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .bind(&account.mfa_secret)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(_) => Ok(id),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Conflict),
            Err(err) => Err(anyhow::Error::new(err)
                .context("failed to create account")
                .into()),
        }
    }

    async fn set_mfa_enabled(&self, id: Uuid, enabled: bool) -> Result<(), StoreError> {
        let query = "UPDATE accounts SET mfa_enabled = $2 WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .bind(enabled)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update mfa_enabled")?;
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let query = "UPDATE accounts SET password_hash = $2 WHERE id = $1";
        sqlx::query(query)
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update password hash")?;
        Ok(())
    }
}
