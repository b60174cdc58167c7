//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Secrets (JWT secret, admin credential) have NO defaults and
//! must be supplied via the environment; startup fails without them.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens (required, no default)
    pub jwt_secret: String,

    /// JWT token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Admin login email (required, no default)
    pub admin_email: String,

    /// Admin login password (required, no default)
    pub admin_password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("KASIR_DATABASE_PATH")
                .unwrap_or_else(|_| "./kasir.db".to_string()),

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::MissingRequired("JWT_SECRET".to_string()))?,

            jwt_lifetime_secs: env::var("JWT_LIFETIME_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            admin_email: env::var("ADMIN_EMAIL")
                .map_err(|_| ConfigError::MissingRequired("ADMIN_EMAIL".to_string()))?,

            admin_password: env::var("ADMIN_PASSWORD")
                .map_err(|_| ConfigError::MissingRequired("ADMIN_PASSWORD".to_string()))?,
        };

        if config.jwt_secret.len() < 16 {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET (must be at least 16 bytes)".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
