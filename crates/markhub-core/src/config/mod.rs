//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod export;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::database::DatabaseConfig;
use self::export::ExportConfig;
use self::logging::LoggingConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Persistence backend settings.
    pub database: DatabaseConfig,
    /// Blob storage settings.
    pub storage: StorageConfig,
    /// Export/rasterization settings.
    #[serde(default)]
    pub export: ExportConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a single TOML file, with `MARKHUB_*`
    /// environment variables layered on top.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_with_overlay(path, None)
    }

    /// Load configuration from a base TOML file plus an optional
    /// environment-specific overlay file.
    pub fn load_with_overlay(path: &str, overlay: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(true));

        if let Some(overlay_path) = overlay {
            builder = builder.add_source(config::File::with_name(overlay_path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("MARKHUB").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }
}
