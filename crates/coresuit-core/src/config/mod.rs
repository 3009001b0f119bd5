//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an optional environment overlay, and `CORESUIT__*`
//! environment variables. Each sub-module represents a logical section.

pub mod app;
pub mod database;
pub mod logging;
pub mod time;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::time::TimeConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Civil time settings for audit timestamps.
    #[serde(default)]
    pub time: TimeConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml` and environment
    /// variables prefixed with `CORESUIT__` (e.g. `CORESUIT__DATABASE__HOST`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration with an explicit base file (without extension).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = match base.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{env}"),
            None => env.to_string(),
        };

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix("CORESUIT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Check that every required setting is present.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing = self.database.missing_settings();
        if !missing.is_empty() {
            return Err(AppError::configuration(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }
        if !(-14 * 60..=14 * 60).contains(&self.time.utc_offset_minutes) {
            return Err(AppError::configuration(format!(
                "time.utc_offset_minutes out of range: {}",
                self.time.utc_offset_minutes
            )));
        }
        Ok(())
    }
}
