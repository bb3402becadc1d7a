//! Capability contract every backend plug-in implements.
//!
//! Plug-ins are written against the typed [`Connector`] trait. The registry
//! stores them behind the object-safe [`BackendDescriptor`] trait, which works
//! on opaque [`ConfigValue`]s and [`InstanceHandle`]s. [`ConnectorDescriptor`]
//! bridges the two.

use super::ConnectorError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Opaque, backend-defined configuration value.
pub type ConfigValue = Box<dyn Any + Send + Sync>;

/// Opaque, backend-defined live connection or client.
pub type InstanceHandle = Arc<dyn Any + Send + Sync>;

/// Type-erased capability set of one backend kind.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as
/// `Arc<dyn BackendDescriptor>`. Implement [`Connector`] instead of this trait
/// unless the plug-in genuinely needs to work on untyped values.
#[async_trait]
pub trait BackendDescriptor: Send + Sync + 'static {
    /// Short human-readable description, shown by `dbfactory types`.
    fn describe(&self) -> &'static str;

    /// Build a config value holding the backend's defaults.
    fn make_empty_config(&self) -> ConfigValue;

    /// Decode a raw config table into the backend's config type.
    fn decode_config(&self, raw: toml::Value) -> Result<ConfigValue, ConnectorError>;

    /// Dial the backend.
    ///
    /// # Errors
    ///
    /// - `ConnectorError::ConfigTypeMismatch` if `config` is not this backend's config type
    /// - any connector-specific error raised while dialing
    async fn connect(
        &self,
        config: &(dyn Any + Send + Sync),
    ) -> Result<InstanceHandle, ConnectorError>;

    /// Release an instance previously returned by [`connect`](Self::connect).
    async fn close(&self, instance: &(dyn Any + Send + Sync)) -> Result<(), ConnectorError>;
}

/// Typed backend plug-in.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use dbfactory::registry::{BackendRegistry, Connector, ConnectorError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Connector for Echo {
///     type Config = i64;
///     type Handle = i64;
///
///     fn describe(&self) -> &'static str {
///         "returns its config"
///     }
///
///     async fn connect(&self, config: &i64) -> Result<i64, ConnectorError> {
///         Ok(*config)
///     }
///
///     async fn close(&self, _handle: &i64) -> Result<(), ConnectorError> {
///         Ok(())
///     }
/// }
///
/// let registry = BackendRegistry::new();
/// registry.register_connector("echo", Echo);
/// assert!(registry.contains(&"ECHO".into()));
/// ```
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Connection settings, decoded from a config shard.
    type Config: DeserializeOwned + Default + fmt::Debug + Send + Sync + 'static;
    /// Live client handed out to callers.
    type Handle: Send + Sync + 'static;

    fn describe(&self) -> &'static str;

    async fn connect(&self, config: &Self::Config) -> Result<Self::Handle, ConnectorError>;

    async fn close(&self, handle: &Self::Handle) -> Result<(), ConnectorError>;
}

/// Adapts a typed [`Connector`] to the erased [`BackendDescriptor`] contract.
pub struct ConnectorDescriptor<C> {
    connector: C,
}

impl<C: Connector> ConnectorDescriptor<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl<C: Connector> BackendDescriptor for ConnectorDescriptor<C> {
    fn describe(&self) -> &'static str {
        self.connector.describe()
    }

    fn make_empty_config(&self) -> ConfigValue {
        Box::new(C::Config::default())
    }

    fn decode_config(&self, raw: toml::Value) -> Result<ConfigValue, ConnectorError> {
        let config =
            C::Config::deserialize(raw).map_err(|e| ConnectorError::Decode(e.to_string()))?;
        Ok(Box::new(config))
    }

    async fn connect(
        &self,
        config: &(dyn Any + Send + Sync),
    ) -> Result<InstanceHandle, ConnectorError> {
        let config = config
            .downcast_ref::<C::Config>()
            .ok_or(ConnectorError::ConfigTypeMismatch {
                expected: type_name::<C::Config>(),
            })?;
        let handle = self.connector.connect(config).await?;
        Ok(Arc::new(handle))
    }

    async fn close(&self, instance: &(dyn Any + Send + Sync)) -> Result<(), ConnectorError> {
        let handle = instance
            .downcast_ref::<C::Handle>()
            .ok_or(ConnectorError::HandleTypeMismatch {
                expected: type_name::<C::Handle>(),
            })?;
        self.connector.close(handle).await
    }
}
