//! services/api/src/error.rs
//!
//! Startup failures of the `api` binary. Request-level failures never reach
//! this type; handlers answer them with a status code.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting to Postgres failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Binding the listener or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A setting that parsed but cannot be used, such as a malformed CORS origin.
    #[error("Invalid startup setting: {0}")]
    InvalidSetting(String),
}
