//! Configuration management for scierie.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "scierie";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "scierie.db";

/// Secret used when none is configured. A warning is logged at startup.
pub const DEFAULT_JWT_SECRET: &str = "secret123";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SCIERIE_`)
/// 2. TOML config file at `~/.config/scierie/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session and password configuration.
    pub auth: AuthConfig,
    /// Letterhead printed on invoices.
    pub company: CompanyConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server listens on.
    pub listen: String,
    /// Reject requests without a valid session outside `/api/auth/*`.
    pub require_auth: bool,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/scierie/scierie.db`
    pub database_path: Option<PathBuf>,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,
    /// Session lifetime in days.
    pub token_ttl_days: u32,
}

/// Company details printed on invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    /// Company name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Phone number.
    pub phone: String,
    /// Contact email, if any.
    pub email: Option<String>,
    /// Trade register number.
    pub rccm: Option<String>,
    /// Currency label appended to amounts.
    pub currency: String,
    /// Payment mode used when an invoice doesn't name one.
    pub default_payment_mode: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            require_auth: false,
            secure_cookies: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_days: 7,
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "Scierie du Congo SARL".to_string(),
            address: "AV/SALAMA ARRE/BAHIPASSE".to_string(),
            phone: "+243 999 999 999".to_string(),
            email: Some("contact@scieriecongo.com".to_string()),
            rccm: Some("CD/KIN/2020/B/12345".to_string()),
            currency: "FC".to_string(),
            default_payment_mode: "Espèces".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SCIERIE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` the way [`Config::load_from`] does, but fail when the
    /// file does not exist instead of falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or invalid.
    pub fn check_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigValidation {
                message: format!("configuration file not found: {}", path.display()),
            });
        }
        Self::load_from(Some(path.to_path_buf()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.listen.parse::<SocketAddr>().is_err() {
            return Err(Error::ConfigValidation {
                message: format!("invalid listen address: {}", self.server.listen),
            });
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(Error::ConfigValidation {
                message: "jwt_secret must not be empty".to_string(),
            });
        }

        if self.auth.token_ttl_days == 0 {
            return Err(Error::ConfigValidation {
                message: "token_ttl_days must be greater than 0".to_string(),
            });
        }

        if self.company.currency.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "company currency must not be empty".to_string(),
            });
        }

        if let Some(email) = &self.company.email {
            let pattern = regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
                .map_err(|e| Error::internal(e.to_string()))?;
            if !pattern.is_match(email) {
                return Err(Error::ConfigValidation {
                    message: format!("invalid company email: {email}"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session lifetime as a Duration.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.auth.token_ttl_days) * 24 * 60 * 60)
    }

    /// Whether the built-in signing secret is still in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}
