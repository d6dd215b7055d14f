//! Device token generation and the device-bound login check.
//!
//! Every account carries at most one device token. The first successful
//! login generates a token, persists it, and hands it back for the caller
//! to set as a long-lived cookie. From then on the account only
//! authenticates when that exact token is presented; clearing the binding
//! (see [`crate::db::handlers::Accounts::clear_device_token`]) is the only
//! way back to the unbound state.

use base64::{Engine as _, engine::general_purpose};
use rand::prelude::RngExt;
use rand::rng;
use tracing::{debug, instrument};

use crate::auth::password;
use crate::db::handlers::Accounts;
use crate::db::models::accounts::AccountDBResponse;
use crate::errors::Error;

/// 32 bytes of CSPRNG output, 256 bits of entropy per token.
const DEVICE_TOKEN_BYTES: usize = 32;

/// Why a login attempt was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    UnknownEmail,
    BadPassword,
    DeviceMismatch,
}

impl AuthRejection {
    /// The user-visible rejection message.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthRejection::UnknownEmail => "Email not found.",
            AuthRejection::BadPassword => "Password incorrect.",
            AuthRejection::DeviceMismatch => "Access denied: this account is tied to a different device.",
        }
    }
}

/// A successful authentication.
///
/// `device_token` is the token the caller must set (or refresh) as the
/// device cookie: the freshly bound token on a first login, the presented
/// token on every later one.
#[derive(Debug)]
pub struct Authenticated {
    pub account: AccountDBResponse,
    pub device_token: String,
}

/// Outcome of [`authenticate`]; infrastructure failures surface separately
/// as [`Error`].
pub type AuthOutcome = std::result::Result<Authenticated, AuthRejection>;

/// Generate a new device token (base64url, no padding).
pub fn generate_device_token() -> String {
    let mut token_bytes = [0u8; DEVICE_TOKEN_BYTES];
    rng().fill(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}

/// Check credentials and enforce the one-device-per-account policy.
///
/// The password is always verified before the device token is looked at,
/// so a login from the wrong device is reported as a device mismatch and
/// never as a credential failure.
///
/// The unbound path is the only one that writes: it binds a fresh token
/// with an atomic conditional update. When two first logins race, the
/// loser re-reads the account and is judged against the winner's token,
/// which for a login that presented nothing means a device mismatch.
#[instrument(skip_all, fields(email = %email))]
pub async fn authenticate(
    accounts: &mut Accounts<'_>,
    email: &str,
    password_input: &str,
    presented_token: Option<&str>,
) -> Result<AuthOutcome, Error> {
    let Some(account) = accounts.get_by_email(email).await? else {
        return Ok(Err(AuthRejection::UnknownEmail));
    };

    // Verify password on a blocking thread to avoid blocking the async runtime
    let password_input = password_input.to_string();
    let hash = account.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password_input, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Ok(Err(AuthRejection::BadPassword));
    }

    match account.device_token.as_deref() {
        Some(bound) => {
            if presented_token == Some(bound) {
                let token = bound.to_string();
                Ok(Ok(Authenticated { account, device_token: token }))
            } else {
                Ok(Err(AuthRejection::DeviceMismatch))
            }
        }
        None => {
            let token = generate_device_token();
            if accounts.bind_device_token_if_absent(account.id, &token).await? {
                debug!(account_id = account.id, "Bound device token on first login");
                let mut account = account;
                account.device_token = Some(token.clone());
                Ok(Ok(Authenticated { account, device_token: token }))
            } else {
                // Lost the first-login race; judge against the winner's token
                let current = accounts.get_by_id(account.id).await?.ok_or_else(|| Error::Internal {
                    operation: format!("reload account {} after bind race", account.id),
                })?;

                match current.device_token.as_deref() {
                    Some(bound) if presented_token == Some(bound) => {
                        let token = bound.to_string();
                        Ok(Ok(Authenticated {
                            account: current,
                            device_token: token,
                        }))
                    }
                    _ => Ok(Err(AuthRejection::DeviceMismatch)),
                }
            }
        }
    }
}
