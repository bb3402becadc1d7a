//! Configuration module for dbfactory
//!
//! Turns declarative configuration into pending factory entries.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`DBFACTORY_LOG_*`, `DBFACTORY__DB_<NAME>__<FIELD>`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use dbfactory::config::FactoryConfig;
//!
//! let toml = r#"
//! [logging]
//! level = "debug"
//!
//! [db_main]
//! dbtype = "sqlite"
//! path = ":memory:"
//! "#;
//! let config: FactoryConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.logging.level, "debug");
//! assert_eq!(config.shard_names(), vec!["main"]);
//! ```

pub mod error;
pub mod layered;
pub mod logging;
pub mod shard;

pub use error::ConfigError;
pub use layered::{load_layered, ENV_PREFIX};
pub use logging::{LogFormat, LoggingConfig};
pub use shard::{
    ingest_shard, ingest_toml_file, ingest_toml_str, ingest_toml_table, SHARD_PREFIX, TYPE_FIELD,
};

use crate::factory::{normalize_name, DbFactory};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application config file: a `[logging]` section plus `db_*` shards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Every other top-level key; the `db_*` tables are backend shards.
    #[serde(flatten)]
    pub shards: toml::Table,
}

impl FactoryConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Load the file (if any) merged with `DBFACTORY__*` environment variables.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let table = load_layered(path, ENV_PREFIX)?;
        Self::deserialize(toml::Value::Table(table)).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment variable overrides
    ///
    /// Supports `DBFACTORY_LOG_LEVEL` and `DBFACTORY_LOG_FORMAT`.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("DBFACTORY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DBFACTORY_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;

        for (name, value) in shard::shard_entries(&self.shards) {
            let field = format!("{}{}", SHARD_PREFIX, name);
            if normalize_name(name).is_empty() {
                return Err(ConfigError::Validation {
                    field,
                    message: "shard name cannot be empty".to_string(),
                });
            }
            let Some(shard) = value.as_table() else {
                return Err(ConfigError::Validation {
                    field,
                    message: "shard must be a table".to_string(),
                });
            };
            if !shard.get(TYPE_FIELD).is_some_and(toml::Value::is_str) {
                return Err(ConfigError::Validation {
                    field: format!("{}.{}", field, TYPE_FIELD),
                    message: "must be a string naming the backend type".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Normalized names of the configured shards, in ingestion order.
    pub fn shard_names(&self) -> Vec<String> {
        shard::shard_entries(&self.shards)
            .into_iter()
            .map(|(name, _)| normalize_name(name))
            .collect()
    }

    /// Add every shard to `factory`. See [`ingest_toml_table`].
    pub async fn ingest(&self, factory: &DbFactory) -> Result<usize, ConfigError> {
        ingest_toml_table(factory, &self.shards).await
    }
}
