//! Request/response models for authentication endpoints.

use axum::{
    Json,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::accounts::AccountDBResponse;
use crate::types::AccountId;

/// The authenticated account attached to a request.
///
/// Reconstructed from the session cookie by the
/// [`crate::auth::current_account`] extractor; handlers take it as an
/// argument to require a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAccount {
    pub id: AccountId,
    pub email: String,
}

/// Login request body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: AccountId,
    pub email: String,
}

impl From<&AccountDBResponse> for AccountResponse {
    fn from(account: &AccountDBResponse) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
        }
    }
}

impl From<&AccountDBResponse> for CurrentAccount {
    fn from(account: &AccountDBResponse) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
        }
    }
}

/// Body of a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub message: String,
}

/// Simple message body for auth operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Login response: JSON body plus the session and device cookies.
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub session_cookie: String,
    pub device_cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        (
            AppendHeaders([
                (axum::http::header::SET_COOKIE, self.session_cookie),
                (axum::http::header::SET_COOKIE, self.device_cookie),
            ]),
            Json(self.auth_response),
        )
            .into_response()
    }
}

/// Logout response: JSON body plus the expired session cookie.
#[derive(Debug)]
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        (
            AppendHeaders([(axum::http::header::SET_COOKIE, self.cookie)]),
            Json(self.auth_response),
        )
            .into_response()
    }
}

/// Result of a bootstrap run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BootstrapResponse {
    /// Emails of accounts created by this run
    pub created: Vec<String>,
    /// Emails skipped because they already existed
    pub skipped: Vec<String>,
    pub message: String,
}
