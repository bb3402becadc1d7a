use super::BackendType;

/// Errors that can occur during registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unsupported backend type: {0}")]
    UnknownBackendType(BackendType),
}

/// Errors returned by backend connectors.
///
/// Connectors own their drivers, so most variants carry the driver's error
/// rendered as a string.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The config value handed to the connector is not its config type.
    #[error("config is not a {expected}")]
    ConfigTypeMismatch { expected: &'static str },

    /// The instance handed to `close` was not produced by this connector.
    #[error("instance is not a {expected}")]
    HandleTypeMismatch { expected: &'static str },

    /// The raw config could not be decoded into the connector's config type.
    #[error("failed to decode config: {0}")]
    Decode(String),

    /// The config decoded but is not usable (e.g. no address).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("connect failed: {0}")]
    Connect(String),

    #[error("ping failed: {0}")]
    Ping(String),

    /// The server answered with a different major version than configured.
    #[error("expected server version {expected}.x, found {actual}")]
    VersionMismatch { expected: u8, actual: String },

    #[error("close failed: {0}")]
    Close(String),
}
