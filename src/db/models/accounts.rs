//! Database models for accounts.

use crate::types::AccountId;
use chrono::{DateTime, Utc};

/// Database request for creating a new account
#[derive(Debug, Clone)]
pub struct AccountCreateDBRequest {
    pub email: String,
    pub password_hash: String,
}

/// Database response for an account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountDBResponse {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    /// Bound device token; `None` while the account is unbound
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
}
