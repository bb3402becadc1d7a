//! Logging configuration
//!
//! `component_levels` keys are this crate's top-level modules, so
//! `factory = "debug"` turns into the directive `dbfactory::factory=debug`.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Pretty-printed logs for humans
    #[default]
    Pretty,
    /// JSON logs for machine parsing
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Modules that accept a per-component level.
pub const COMPONENTS: &[&str] = &["cli", "config", "connector", "factory", "logging", "registry"];

/// Level names accepted for a component.
pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels, e.g. {"factory": "debug", "connector::search": "trace"}
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

impl LoggingConfig {
    /// Check the base level and every component entry.
    ///
    /// A component key is a module from [`COMPONENTS`], optionally followed
    /// by a `::` sub-path such as `connector::sqlite`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "logging.level".to_string(),
                message: "level cannot be empty".to_string(),
            });
        }

        let Some(component_levels) = &self.component_levels else {
            return Ok(());
        };
        for (component, level) in component_levels {
            let field = format!("logging.component_levels.{}", component);
            let module = component.split("::").next().unwrap_or_default();
            if !COMPONENTS.contains(&module) {
                return Err(ConfigError::Validation {
                    field,
                    message: format!(
                        "unknown component '{}', expected one of: {}",
                        component,
                        COMPONENTS.join(", ")
                    ),
                });
            }
            if !LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(ConfigError::Validation {
                    field,
                    message: format!("invalid level '{}'", level),
                });
            }
        }

        Ok(())
    }
}
