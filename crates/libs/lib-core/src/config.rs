//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The loaded [`Config`] is owned by the web layer's application state and handed to
//! handlers and middleware through axum's `State` extractor. There is no global
//! instance.
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::from_env().and_then(|c| c.validate().map(|_| c));
//! ```

use lib_utils::{get_env, get_env_or, get_env_parse_or};
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Secret key for JWT token signing and verification
    ///
    /// **Must be at least 32 characters long** for security.
    pub jwt_secret: String,

    /// JWT token validity period in hours
    ///
    /// After this period, users must re-authenticate.
    /// Valid range: 1-720 hours (1 hour to 30 days)
    pub jwt_expiration_hours: i64,

    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:data/stufffindr.db");

        let jwt_secret = get_env("JWT_SECRET").map_err(|e| e.to_string())?;

        let jwt_expiration_hours = get_env_parse_or("JWT_EXPIRATION_HOURS", 24)
            .map_err(|e| format!("{e}: JWT_EXPIRATION_HOURS must be a valid number"))?;

        let upload_dir = PathBuf::from(get_env_or("UPLOAD_DIR", "uploads"));

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration_hours,
            upload_dir,
        })
    }

    /// Validate configuration values against security and business rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.jwt_expiration_hours < 1 || self.jwt_expiration_hours > 720 {
            return Err("JWT_EXPIRATION_HOURS must be between 1 and 720 (30 days)".to_string());
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err("UPLOAD_DIR must not be empty".to_string());
        }

        Ok(())
    }
}
