//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: String,
    pub summary_model: String,
    pub notes_model: String,
    pub flashcard_model: String,
    pub quiz_model: String,
    /// When set, documents are persisted in Postgres instead of the JSON file.
    pub database_url: Option<String>,
    pub store_path: PathBuf,
    pub storage_key: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        // --- Provider Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let summary_model = var_or("SUMMARY_MODEL", DEFAULT_MODEL);
        let notes_model = var_or("NOTES_MODEL", DEFAULT_MODEL);
        let flashcard_model = var_or("FLASHCARD_MODEL", DEFAULT_MODEL);
        let quiz_model = var_or("QUIZ_MODEL", DEFAULT_MODEL);

        // --- Persistence Settings ---
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let store_path = PathBuf::from(var_or("STORE_PATH", "./data/documents.json"));
        let storage_key = var_or("STORAGE_KEY", "scholar-ai-documents");

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            summary_model,
            notes_model,
            flashcard_model,
            quiz_model,
            database_url,
            store_path,
            storage_key,
            max_upload_bytes,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.quiz_model, "gpt-4o-mini");
        assert_eq!(config.database_url, None);
        assert_eq!(config.store_path, PathBuf::from("./data/documents.json"));
        assert_eq!(config.storage_key, "scholar-ai-documents");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn missing_api_key_is_reported() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingVar(v)) if v == "OPENAI_API_KEY"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = load(&[("OPENAI_API_KEY", "sk"), ("RUST_LOG", "chatty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(v, _) if v == "RUST_LOG"));

        let err = load(&[("OPENAI_API_KEY", "sk"), ("MAX_UPLOAD_BYTES", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(v, _) if v == "MAX_UPLOAD_BYTES"));
    }

    #[test]
    fn database_url_selects_postgres() {
        let config = load(&[
            ("OPENAI_API_KEY", "sk"),
            ("DATABASE_URL", "postgres://localhost/study"),
            ("STORAGE_KEY", "custom"),
        ])
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/study"));
        assert_eq!(config.storage_key, "custom");
    }
}
