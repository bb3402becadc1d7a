//! Typed access to live instances.

use super::{DbFactory, DbInstance, FactoryError};
use crate::registry::BackendType;
use std::any::Any;
use std::sync::Arc;

/// A handle type produced by a known set of backend types.
///
/// Lets [`DbFactory::get`] check the entry's tag before narrowing the opaque
/// instance.
pub trait BackendHandle: Any + Send + Sync {
    /// Tags this handle may be stored under, lower-case.
    const BACKEND_TYPES: &'static [&'static str];

    fn accepts(backend_type: &BackendType) -> bool {
        Self::BACKEND_TYPES
            .iter()
            .any(|tag| *tag == backend_type.as_str())
    }
}

impl DbFactory {
    /// Fetch the live instance for `name` as an `H`.
    ///
    /// # Errors
    ///
    /// - `FactoryError::NotConfigured` if `name` has no live instance
    /// - `FactoryError::WrongBackendType` if the entry's tag is not one of `H::BACKEND_TYPES`
    /// - `FactoryError::HandleMismatch` if the instance is not an `H`
    pub async fn get<H: BackendHandle>(&self, name: &str) -> Result<Arc<H>, FactoryError> {
        let name = super::normalize_name(name);
        let instance = self
            .get_instance(&name)
            .await
            .ok_or_else(|| FactoryError::NotConfigured(name.clone()))?;

        if !H::accepts(instance.backend_type()) {
            return Err(FactoryError::WrongBackendType {
                name,
                expected: H::BACKEND_TYPES.join(" or "),
                actual: instance.backend_type().clone(),
            });
        }

        narrow(name, instance)
    }

    /// Fetch the live instance for `name` as an `H`, requiring the entry to
    /// be stored under `backend_type`.
    ///
    /// For plug-ins registered under tags chosen at runtime.
    pub async fn get_as<H: Any + Send + Sync>(
        &self,
        name: &str,
        backend_type: &BackendType,
    ) -> Result<Arc<H>, FactoryError> {
        let name = super::normalize_name(name);
        let instance = self
            .get_instance(&name)
            .await
            .ok_or_else(|| FactoryError::NotConfigured(name.clone()))?;

        if instance.backend_type() != backend_type {
            return Err(FactoryError::WrongBackendType {
                name,
                expected: backend_type.to_string(),
                actual: instance.backend_type().clone(),
            });
        }

        narrow(name, instance)
    }

    /// [`get`](Self::get), panicking on any error.
    ///
    /// Only for startup wiring, where a missing backend is fatal anyway.
    ///
    /// # Panics
    ///
    /// Panics with the error message if [`get`](Self::get) fails.
    pub async fn must_get<H: BackendHandle>(&self, name: &str) -> Arc<H> {
        match self.get::<H>(name).await {
            Ok(handle) => handle,
            Err(e) => panic!("{}", e),
        }
    }
}

fn narrow<H: Any + Send + Sync>(
    name: String,
    instance: DbInstance,
) -> Result<Arc<H>, FactoryError> {
    Arc::clone(instance.instance())
        .downcast::<H>()
        .map_err(|_| {
            tracing::error!(
                name = %name,
                backend_type = %instance.backend_type(),
                expected = std::any::type_name::<H>(),
                "Live instance does not match its backend type"
            );
            FactoryError::HandleMismatch {
                name,
                backend_type: instance.backend_type().clone(),
            }
        })
}
