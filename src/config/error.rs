//! Configuration error types

use crate::factory::FactoryError;
use crate::registry::BackendType;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Building the file + environment layers failed.
    #[error("Failed to load layered config: {0}")]
    Layered(String),

    #[error("Shard name cannot be empty")]
    EmptyName,

    #[error("Shard '{name}' has no string 'dbtype' field")]
    MissingBackendType { name: String },

    #[error("Shard '{name}' has an empty 'dbtype'")]
    EmptyBackendType { name: String },

    #[error("Shard '{name}' uses unsupported dbtype '{backend_type}'")]
    UnknownBackendType {
        name: String,
        backend_type: BackendType,
    },

    #[error("Invalid shard '{name}': {message}")]
    InvalidShard { name: String, message: String },

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}
