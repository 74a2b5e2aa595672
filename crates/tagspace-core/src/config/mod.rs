//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod logging;
pub mod sync;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::sync::{MountConfig, SyncConfig, validate_mounts};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the TOML
/// configuration file overlaid with `TAGSPACE__*` environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tree store connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Mounts and scanning behaviour.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error; every section has defaults. Values
    /// from environment variables prefixed with `TAGSPACE__` take
    /// precedence, e.g. `TAGSPACE__DATABASE__URL`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TAGSPACE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.sync.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load("does/not/exist").expect("defaults should load");
        assert_eq!(config.database.max_connections, 1);
        assert!(config.sync.include_hidden);
        assert_eq!(config.sync.recycle_dir_name, "<recycle>");
        assert_eq!(config.sync.recycle_name_width, 6);
        assert!(config.sync.mounts.is_empty());
        assert_eq!(config.sync.max_concurrent_store, 4);
    }

    #[test]
    fn test_mount_validation_reachable_from_config_root() {
        let mounts = vec![MountConfig::new("/data/pics", "pics")];
        assert!(validate_mounts(&mounts, "<recycle>").is_ok());
        assert!(validate_mounts(&mounts, "pics").is_err());
    }
}
