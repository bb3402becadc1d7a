//! Capability registry.
//!
//! Maps a [`BackendType`] tag to the [`BackendDescriptor`] that knows how to
//! build, connect and close that kind of backend.

mod backend_type;
mod descriptor;
mod error;

pub use backend_type::*;
pub use descriptor::*;
pub use error::*;

use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe mapping from backend type to descriptor.
///
/// Registration is last-writer-wins: registering a tag again replaces the
/// previous descriptor. Lookups clone the descriptor `Arc`, so no map lock is
/// ever held while a connector runs.
///
/// # Examples
///
/// ```
/// use dbfactory::registry::{BackendRegistry, BackendType};
///
/// let registry = BackendRegistry::with_builtins();
/// assert!(registry.resolve(&BackendType::SQLITE).is_ok());
/// assert!(registry.resolve(&BackendType::new("mongo")).is_err());
/// ```
pub struct BackendRegistry {
    descriptors: DashMap<BackendType, Arc<dyn BackendDescriptor>>,
}

impl BackendRegistry {
    /// Create a registry with no backend types.
    pub fn new() -> Self {
        Self {
            descriptors: DashMap::new(),
        }
    }

    /// Create a registry holding every connector shipped with this crate.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::connector::register_builtins(&registry);
        registry
    }

    /// Install or replace the descriptor for `backend_type`.
    pub fn register(
        &self,
        backend_type: impl Into<BackendType>,
        descriptor: Arc<dyn BackendDescriptor>,
    ) {
        let backend_type = backend_type.into();
        let replaced = self
            .descriptors
            .insert(backend_type.clone(), descriptor)
            .is_some();

        if replaced {
            tracing::info!(backend_type = %backend_type, "Replaced backend descriptor");
        } else {
            tracing::debug!(backend_type = %backend_type, "Registered backend descriptor");
        }
    }

    /// Register a typed connector under `backend_type`.
    pub fn register_connector<C: Connector>(
        &self,
        backend_type: impl Into<BackendType>,
        connector: C,
    ) {
        self.register(backend_type, Arc::new(ConnectorDescriptor::new(connector)));
    }

    /// Look up the descriptor for `backend_type`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownBackendType` if nothing is registered for the tag.
    pub fn resolve(
        &self,
        backend_type: &BackendType,
    ) -> Result<Arc<dyn BackendDescriptor>, RegistryError> {
        self.descriptors
            .get(backend_type)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::UnknownBackendType(backend_type.clone()))
    }

    pub fn contains(&self, backend_type: &BackendType) -> bool {
        self.descriptors.contains_key(backend_type)
    }

    /// All registered tags, sorted.
    pub fn backend_types(&self) -> Vec<BackendType> {
        let mut types: Vec<BackendType> = self
            .descriptors
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
