//! Database repository for accounts.
//!
//! Accounts are never deleted and only mutate through the two device-token
//! operations, so this repository exposes inherent methods instead of the
//! generic [`crate::db::handlers::Repository`] surface.

use crate::db::{
    errors::Result,
    models::accounts::{AccountCreateDBRequest, AccountDBResponse},
};
use crate::types::AccountId;
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::instrument;

pub struct Accounts<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Accounts<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn create(&mut self, request: &AccountCreateDBRequest) -> Result<AccountDBResponse> {
        let account = sqlx::query_as::<_, AccountDBResponse>(
            r#"
            INSERT INTO accounts (email, password_hash, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING *
            "#,
        )
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(account)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: AccountId) -> Result<Option<AccountDBResponse>> {
        let account = sqlx::query_as::<_, AccountDBResponse>("SELECT * FROM accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<AccountDBResponse>> {
        let account = sqlx::query_as::<_, AccountDBResponse>("SELECT * FROM accounts WHERE email = ?1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(account)
    }

    /// Bind a device token to an account that has none yet.
    ///
    /// The `device_token IS NULL` guard makes the bind a single atomic
    /// check-and-set: of two racing first logins, exactly one observes
    /// `true` here and the other must re-read and be judged against the
    /// winner's token.
    #[instrument(skip(self, token), fields(account_id = id), err)]
    pub async fn bind_device_token_if_absent(&mut self, id: AccountId, token: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE accounts SET device_token = ?1 WHERE id = ?2 AND device_token IS NULL")
            .bind(token)
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear an account's device binding so the next login re-binds.
    ///
    /// Returns `false` when no account has that id.
    #[instrument(skip(self), fields(account_id = id), err)]
    pub async fn clear_device_token(&mut self, id: AccountId) -> Result<bool> {
        let result = sqlx::query("UPDATE accounts SET device_token = NULL WHERE id = ?1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
