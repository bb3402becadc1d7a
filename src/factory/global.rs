//! Process-wide default factory.
//!
//! Libraries should take a `&DbFactory` or `Arc<DbFactory>`; the default
//! instance exists for binaries that want one shared registry without
//! threading it through every layer.

use super::{DbFactory, DbInstance, FactoryError};
use crate::registry::{BackendDescriptor, BackendRegistry, BackendType, ConfigValue};
use std::sync::{Arc, OnceLock};

static DEFAULT: OnceLock<Arc<DbFactory>> = OnceLock::new();

/// Install the default factory, backed by `registry`.
///
/// # Errors
///
/// Returns `FactoryError::AlreadyInitialized` if the default factory was
/// already installed, either by an earlier `init` or by a call to [`factory`].
pub fn init(registry: Arc<BackendRegistry>) -> Result<&'static Arc<DbFactory>, FactoryError> {
    let mut installed = false;
    let factory = DEFAULT.get_or_init(|| {
        installed = true;
        Arc::new(DbFactory::with_registry(registry))
    });

    if installed {
        tracing::debug!("Installed default factory");
        Ok(factory)
    } else {
        Err(FactoryError::AlreadyInitialized)
    }
}

/// The default factory, created with the built-in connectors on first use.
pub fn factory() -> &'static Arc<DbFactory> {
    DEFAULT.get_or_init(|| Arc::new(DbFactory::new()))
}

pub fn register_backend_type(
    backend_type: impl Into<BackendType>,
    descriptor: Arc<dyn BackendDescriptor>,
) {
    factory().register_backend_type(backend_type, descriptor);
}

pub async fn add_config(
    name: &str,
    backend_type: impl Into<BackendType>,
    config: ConfigValue,
) -> Result<(), FactoryError> {
    factory().add_config(name, backend_type, config).await
}

pub async fn remove_db(name: &str) -> bool {
    factory().remove_db(name).await
}

pub async fn connect_all() -> Result<usize, FactoryError> {
    factory().connect_all().await
}

pub async fn close_all() -> usize {
    factory().close_all().await
}

pub async fn get_instance(name: &str) -> Option<DbInstance> {
    factory().get_instance(name).await
}
