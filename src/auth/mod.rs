//! Authentication for the service.
//!
//! Logging in takes email + password and is additionally gated by a device
//! binding: the first successful login binds the account to a
//! cryptographically random token delivered as a long-lived cookie, and
//! every later login must present that exact token. Sessions are separate
//! and short-lived; logging out discards the session but never the binding.
//!
//! # Modules
//!
//! - [`current_account`]: Extractor for the authenticated account in handlers
//! - [`device`]: Device token generation and the login state machine
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use snapbin::api::models::auth::CurrentAccount;
//!
//! async fn protected_handler(account: CurrentAccount) -> Result<String, Error> {
//!     Ok(format!("Hello, {}!", account.email))
//! }
//! ```

pub mod current_account;
pub mod device;
pub mod password;
pub mod session;
