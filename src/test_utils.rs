//! Shared fixtures for tests.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::{
    AppState,
    api::models::auth::CurrentAccount,
    assistant::CompletionRelay,
    auth::{password, session},
    config::Config,
    db::handlers::Accounts,
    db::models::accounts::{AccountCreateDBRequest, AccountDBResponse},
};

/// Fresh in-memory database with migrations applied.
///
/// Capped at one connection: every pool connection to `sqlite::memory:`
/// would otherwise get its own empty database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    crate::migrator().run(&pool).await.expect("run migrations");

    pool
}

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key".to_string()),
        ..Default::default()
    }
}

pub async fn create_test_state() -> AppState {
    create_test_state_with(create_test_config()).await
}

pub async fn create_test_state_with(config: Config) -> AppState {
    let pool = create_test_pool().await;
    let relay = CompletionRelay::new(&config.assistant).expect("build relay");

    AppState::builder().db(pool).config(config).relay(relay).build()
}

/// Insert an account with the given plaintext password.
///
/// Hashes with deliberately light Argon2 parameters to keep test suites
/// fast; verification reads the parameters from the hash, so production
/// code verifies these fixtures unchanged.
pub async fn create_test_account(pool: &SqlitePool, email: &str, plaintext_password: &str) -> AccountDBResponse {
    let params = password::Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    let password_hash = password::hash_password_with_params(plaintext_password, Some(params)).expect("hash password");

    let mut conn = pool.acquire().await.expect("acquire connection");
    Accounts::new(&mut conn)
        .create(&AccountCreateDBRequest {
            email: email.to_string(),
            password_hash,
        })
        .await
        .expect("create account")
}

/// A ready-to-send `Cookie` header value holding a valid session for the
/// account.
pub fn session_cookie_for(account: &AccountDBResponse, config: &Config) -> String {
    let token = session::create_session_token(&CurrentAccount::from(account), config).expect("create session token");
    format!("{}={}", config.auth.session.cookie_name, token)
}
