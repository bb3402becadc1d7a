//! Factory error types

use crate::registry::{BackendType, ConnectorError};
use thiserror::Error;

/// Errors returned by [`DbFactory`](super::DbFactory) operations.
///
/// Close failures never appear here: they are logged and swallowed so that
/// replacing a config or shutting down always completes.
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("database name cannot be empty")]
    EmptyName,

    /// A pending config names a backend type that is not registered.
    #[error("<{name}>: unsupported backend type '{backend_type}'")]
    UnknownBackendType {
        name: String,
        backend_type: BackendType,
    },

    #[error("<{name}>: {source}")]
    ConnectFailed {
        name: String,
        #[source]
        source: ConnectorError,
    },

    #[error("database <{0}> is not configured or not connected")]
    NotConfigured(String),

    #[error("database <{name}> is a '{actual}' backend, expected {expected}")]
    WrongBackendType {
        name: String,
        expected: String,
        actual: BackendType,
    },

    /// The stored instance is not the handle type its backend type promises.
    #[error("database <{name}> ({backend_type}) holds an instance of an unexpected type")]
    HandleMismatch {
        name: String,
        backend_type: BackendType,
    },

    #[error("the default factory is already initialized")]
    AlreadyInitialized,
}

impl FactoryError {
    /// Logical name the error refers to, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            FactoryError::UnknownBackendType { name, .. }
            | FactoryError::ConnectFailed { name, .. }
            | FactoryError::NotConfigured(name)
            | FactoryError::WrongBackendType { name, .. }
            | FactoryError::HandleMismatch { name, .. } => Some(name),
            FactoryError::EmptyName | FactoryError::AlreadyInitialized => None,
        }
    }
}
