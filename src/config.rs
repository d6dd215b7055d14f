//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The configuration file path defaults to `config.yaml` but can
//! be specified via `-f` flag or the `SNAPBIN_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources
//! override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `SNAPBIN_` override
//!    YAML values
//!
//! For nested config values, use double underscores in environment variables.
//! For example, `SNAPBIN_AUTH__BOOTSTRAP__ENABLED=false` sets the
//! `auth.bootstrap.enabled` field.
//!
//! ## Configuration Structure
//!
//! - **Server**: `host`, `port` - HTTP server binding
//! - **Database**: `database_url` - SQLite database location
//! - **Security**: `secret_key` - session token signing key (required)
//! - **Authentication**: `auth.session`, `auth.device`, `auth.bootstrap`
//! - **Uploads**: `uploads.max_image_bytes` - image size cap
//! - **Assistant**: `assistant.*` - upstream completion endpoint settings

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SNAPBIN_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// This is the root configuration structure loaded from YAML and environment
/// variables. All fields have defaults defined in the `Default`
/// implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// SQLite database URL; the file is created on first run
    pub database_url: String,
    /// Secret key for session token signing (required to serve logins)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Upload limits
    pub uploads: UploadsConfig,
    /// Assistant relay configuration
    pub assistant: AssistantConfig,
}

/// Authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub session: SessionConfig,
    pub device: DeviceConfig,
    pub bootstrap: BootstrapConfig,
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// Session lifetime (e.g., "24h")
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Whether the session cookie carries the Secure attribute
    pub cookie_secure: bool,
    /// SameSite attribute for the session cookie
    pub cookie_same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "snapbin_session".to_string(),
            timeout: Duration::from_secs(60 * 60 * 24),
            cookie_secure: true,
            cookie_same_site: "Strict".to_string(),
        }
    }
}

/// Device-binding cookie configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Name of the device token cookie
    pub cookie_name: String,
    /// Device cookie lifetime (e.g., "365d"); the binding itself never expires
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            cookie_name: "device_token".to_string(),
            lifetime: Duration::from_secs(60 * 60 * 24 * 365),
        }
    }
}

/// Account seeding configuration.
///
/// The bootstrap surface seeds these accounts with hashed passwords. It is
/// meant for first-run provisioning only; switch `enabled` off once the
/// accounts exist.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Whether the bootstrap endpoint is available
    pub enabled: bool,
    /// Accounts to seed
    pub accounts: Vec<BootstrapAccount>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            accounts: Vec::new(),
        }
    }
}

/// One seeded account: plaintext password here, hashed before storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAccount {
    pub email: String,
    pub password: String,
}

/// Upload limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Maximum accepted image payload in bytes
    pub max_image_bytes: u64,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 5 * 1024 * 1024, // 5 MiB
        }
    }
}

/// Assistant relay configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    /// Base URL of an OpenAI-compatible completion API (up to and including `/v1`)
    pub base_url: String,
    /// Bearer token for the upstream API
    pub api_key: Option<String>,
    /// Model name sent with every completion request
    pub model: String,
    /// Upper bound on a single upstream call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite:snapbin.db".to_string(),
            secret_key: None,
            auth: AuthConfig::default(),
            uploads: UploadsConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the YAML file named by `args` plus
    /// `SNAPBIN_`-prefixed environment overrides.
    pub fn load(args: &Args) -> Result<Self, Error> {
        let config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("SNAPBIN_").split("__"))
            .extract()
            .map_err(|e| Error::BadRequest {
                message: format!("Invalid configuration: {e}"),
            })?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.uploads.max_image_bytes == 0 {
            return Err(Error::BadRequest {
                message: "uploads.max_image_bytes must be greater than zero".to_string(),
            });
        }
        if self.assistant.base_url.is_empty() {
            return Err(Error::BadRequest {
                message: "assistant.base_url must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
