//! snapbin: a small self-hostable image locker.
//!
//! Accounts log in with email + password and are pinned to a single device
//! through a persistent device-token cookie. Logged-in accounts upload
//! images (stored as blobs, owned by exactly one account), list and fetch
//! and delete their own, and relay free-text questions to an external
//! completion API.
//!
//! # Modules
//!
//! - [`api`]: HTTP handlers and request/response models
//! - [`assistant`]: relay to the upstream completion endpoint
//! - [`auth`]: passwords, sessions, and the device binding state machine
//! - [`config`]: YAML + environment configuration
//! - [`db`]: SQLite repositories and records
//! - [`errors`]: the service error type

pub mod api;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::handlers,
    assistant::CompletionRelay,
    auth::password,
    config::BootstrapAccount,
    db::handlers::Accounts,
    db::models::accounts::AccountCreateDBRequest,
    errors::Error,
    openapi::ApiDoc,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AccountId, ImageId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: SQLite connection pool
/// - `config`: application configuration
/// - `relay`: client for the upstream completion API
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub relay: CompletionRelay,
}

/// Get the snapbin database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Seed accounts with hashed passwords.
///
/// Idempotent: an email that already exists is skipped, so re-running the
/// bootstrap never overwrites a password or a device binding. Returns the
/// created and skipped email lists in input order.
#[instrument(skip_all, fields(count = accounts.len()))]
pub async fn seed_accounts(db: &SqlitePool, accounts: &[BootstrapAccount]) -> Result<(Vec<String>, Vec<String>), Error> {
    let mut created = Vec::new();
    let mut skipped = Vec::new();

    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;
    {
        let mut repo = Accounts::new(&mut tx);

        for account in accounts {
            if repo.get_by_email(&account.email).await?.is_some() {
                skipped.push(account.email.clone());
                continue;
            }

            // Hash on a blocking thread to avoid blocking the async runtime
            let password = account.password.clone();
            let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })??;

            repo.create(&AccountCreateDBRequest {
                email: account.email.clone(),
                password_hash,
            })
            .await?;

            info!(email = %account.email, "Seeded account");
            created.push(account.email.clone());
        }
    }
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((created, skipped))
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    // Slack on top of the image cap so multipart framing never trips the
    // transport-level limit before the handler's own size check runs.
    let body_limit = state.config.uploads.max_image_bytes as usize + 64 * 1024;

    let auth_routes = Router::new()
        .route("/authentication/login", post(handlers::auth::login))
        .route("/authentication/logout", post(handlers::auth::logout))
        .route("/authentication/bootstrap", post(handlers::auth::bootstrap))
        .route("/accounts/{account_id}/device-reset", post(handlers::auth::reset_device))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/images", post(handlers::images::upload_image))
        .route("/images", get(handlers::images::list_images))
        .route("/images/{image_id}/content", get(handlers::images::get_image_content))
        .route("/images/{image_id}", delete(handlers::images::delete_image))
        .route("/ask", post(handlers::assistant::ask))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .merge(auth_routes)
        .merge(api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// The assembled application, ready to serve.
pub struct Application {
    state: AppState,
}

impl Application {
    /// Connect to the database, run migrations, and build shared state.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url).await?;
        migrator().run(&pool).await?;

        let relay = CompletionRelay::new(&config.assistant)?;

        let state = AppState::builder().db(pool).config(config).relay(relay).build();

        Ok(Self { state })
    }

    /// Bind and serve until the shutdown future resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!("Listening on {addr}");

        let app = router(self.state);
        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

        Ok(())
    }
}
