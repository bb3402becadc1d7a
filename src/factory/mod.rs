//! Connection factory.
//!
//! [`DbFactory`] owns the pending-config and live-instance stores and drives
//! every lifecycle operation through the [`BackendRegistry`].
//!
//! # Locking
//!
//! All mutating operations hold one write lock for their whole duration,
//! including the awaited `connect`/`close` calls on backends. A concurrent
//! [`DbFactory::get_instance`] therefore sees the state from before or after
//! a [`DbFactory::connect_all`] sweep, never a partially swept one.

mod error;
pub mod global;
pub mod shutdown;
mod store;
mod typed;

pub use error::FactoryError;
pub use store::{normalize_name, DbInstance};
pub use typed::BackendHandle;

use crate::registry::{BackendDescriptor, BackendRegistry, BackendType, ConfigValue, Connector};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use store::Stores;
use tokio::sync::RwLock;

/// Snapshot of one configured name, as reported by [`DbFactory::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub name: String,
    pub backend_type: BackendType,
    pub connected: bool,
    pub connected_at: Option<DateTime<Utc>>,
}

/// Registry of named backend configs and their live instances.
///
/// # Examples
///
/// ```
/// use dbfactory::connector::{memkv, MemKvCache, MemKvConfig};
/// use dbfactory::factory::DbFactory;
///
/// # #[tokio::main]
/// # async fn main() {
/// let factory = DbFactory::new();
/// memkv::add_config(&factory, "Sessions", MemKvConfig::default()).await.unwrap();
/// factory.connect_all().await.unwrap();
///
/// let cache = factory.get::<MemKvCache>("sessions").await.unwrap();
/// cache.set("user:1", "alice");
///
/// factory.close_all().await;
/// # }
/// ```
pub struct DbFactory {
    registry: Arc<BackendRegistry>,
    stores: RwLock<Stores>,
}

impl DbFactory {
    /// Create a factory backed by a registry holding the built-in connectors.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(BackendRegistry::with_builtins()))
    }

    /// Create a factory backed by `registry`.
    pub fn with_registry(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            stores: RwLock::new(Stores::default()),
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Install or replace the descriptor for a backend type.
    pub fn register_backend_type(
        &self,
        backend_type: impl Into<BackendType>,
        descriptor: Arc<dyn BackendDescriptor>,
    ) {
        self.registry.register(backend_type, descriptor);
    }

    /// Register a typed connector under `backend_type`.
    pub fn register_connector<C: Connector>(
        &self,
        backend_type: impl Into<BackendType>,
        connector: C,
    ) {
        self.registry.register_connector(backend_type, connector);
    }

    /// Set the config for `name`, replacing any previous one.
    ///
    /// Names are trimmed and lower-cased, so `" a"`, `"A"` and `"a"` all
    /// refer to the same entry.
    ///
    /// A live instance for `name` is closed and dropped first; close errors
    /// are logged, never returned. Nothing is connected until the next
    /// [`connect_all`](Self::connect_all).
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::EmptyName` if `name` is blank.
    pub async fn add_config(
        &self,
        name: &str,
        backend_type: impl Into<BackendType>,
        config: ConfigValue,
    ) -> Result<(), FactoryError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(FactoryError::EmptyName);
        }
        let backend_type = backend_type.into();

        let mut stores = self.stores.write().await;

        if let Some(instance) = stores.remove_live(&name) {
            tracing::info!(
                name = %name,
                backend_type = %instance.backend_type(),
                "Config replaced, closing live instance"
            );
            self.close_instance(&name, instance).await;
        }

        tracing::debug!(name = %name, backend_type = %backend_type, "Added database config");
        stores.insert_pending(name, backend_type, config);

        Ok(())
    }

    /// [`add_config`](Self::add_config) with a connector's typed config.
    pub async fn add_typed_config<C: Connector>(
        &self,
        name: &str,
        backend_type: impl Into<BackendType>,
        config: C::Config,
    ) -> Result<(), FactoryError> {
        self.add_config(name, backend_type, Box::new(config)).await
    }

    /// Close and forget everything known about `name`.
    ///
    /// Returns whether a config or instance existed.
    pub async fn remove_db(&self, name: &str) -> bool {
        let name = normalize_name(name);
        let mut stores = self.stores.write().await;

        let closed = match stores.remove_live(&name) {
            Some(instance) => {
                self.close_instance(&name, instance).await;
                true
            }
            None => false,
        };
        let removed = stores.remove_pending(&name).is_some();

        if closed || removed {
            tracing::info!(name = %name, "Removed database");
        }
        closed || removed
    }

    /// Connect every pending config that has no live instance yet.
    ///
    /// Entries are swept in insertion order (a replaced config counts as newly
    /// inserted). The sweep stops at the first failure; entries connected
    /// before it stay connected. Returns the number of new connections.
    ///
    /// # Errors
    ///
    /// - `FactoryError::UnknownBackendType` if an entry's backend type is not registered
    /// - `FactoryError::ConnectFailed` if a connector fails
    pub async fn connect_all(&self) -> Result<usize, FactoryError> {
        let mut stores = self.stores.write().await;
        let mut connected = 0;

        for name in stores.pending_names() {
            if stores.is_live(&name) {
                continue;
            }

            let (backend_type, result) = {
                let Some(pending) = stores.pending(&name) else {
                    continue;
                };

                let descriptor = match self.registry.resolve(&pending.backend_type) {
                    Ok(descriptor) => descriptor,
                    Err(_) => {
                        tracing::error!(
                            name = %name,
                            backend_type = %pending.backend_type,
                            "Pending config names an unregistered backend type"
                        );
                        return Err(FactoryError::UnknownBackendType {
                            name,
                            backend_type: pending.backend_type.clone(),
                        });
                    }
                };

                let result = descriptor.connect(pending.config.as_ref()).await;
                (pending.backend_type.clone(), result)
            };

            match result {
                Ok(instance) => {
                    tracing::info!(
                        name = %name,
                        backend_type = %backend_type,
                        "Connected database"
                    );
                    stores.insert_live(name, DbInstance::new(backend_type, instance));
                    connected += 1;
                }
                Err(source) => {
                    tracing::warn!(
                        name = %name,
                        backend_type = %backend_type,
                        error = %source,
                        "Failed to connect database"
                    );
                    return Err(FactoryError::ConnectFailed { name, source });
                }
            }
        }

        Ok(connected)
    }

    /// Close every live instance and empty the live store.
    ///
    /// Best-effort: a failing close is logged and the sweep continues.
    /// Pending configs are kept, so a later [`connect_all`](Self::connect_all)
    /// reconnects them. Returns the number of instances closed.
    pub async fn close_all(&self) -> usize {
        let mut stores = self.stores.write().await;
        let live = stores.drain_live();
        let count = live.len();

        for (name, instance) in live {
            self.close_instance(&name, instance).await;
        }

        if count > 0 {
            tracing::info!(closed = count, "Closed all databases");
        }
        count
    }

    /// Live instance for `name`, or `None` when it is not configured or not
    /// connected.
    pub async fn get_instance(&self, name: &str) -> Option<DbInstance> {
        let name = normalize_name(name);
        self.stores.read().await.live(&name).cloned()
    }

    /// Configured names in sweep order.
    pub async fn pending_names(&self) -> Vec<String> {
        self.stores.read().await.pending_names()
    }

    /// Connected names, sorted.
    pub async fn live_names(&self) -> Vec<String> {
        self.stores.read().await.live_names()
    }

    /// State of every configured name, in sweep order.
    pub async fn status(&self) -> Vec<EntryStatus> {
        let stores = self.stores.read().await;
        stores
            .pending_names()
            .into_iter()
            .filter_map(|name| {
                let pending = stores.pending(&name)?;
                let live = stores.live(&name);
                Some(EntryStatus {
                    backend_type: pending.backend_type.clone(),
                    connected: live.is_some(),
                    connected_at: live.map(DbInstance::connected_at),
                    name,
                })
            })
            .collect()
    }

    async fn close_instance(&self, name: &str, instance: DbInstance) {
        let descriptor = match self.registry.resolve(instance.backend_type()) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::error!(
                    name = %name,
                    error = %e,
                    "Cannot close database, dropping instance"
                );
                return;
            }
        };

        match descriptor.close(&**instance.instance()).await {
            Ok(()) => tracing::debug!(name = %name, "Closed database"),
            Err(e) => tracing::warn!(
                name = %name,
                backend_type = %instance.backend_type(),
                error = %e,
                "Failed to close database"
            ),
        }
    }
}

impl Default for DbFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DbFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("DbFactory");
        out.field("backend_types", &self.registry.backend_types());
        // Counts are skipped while a sweep holds the lock.
        if let Ok(stores) = self.stores.try_read() {
            out.field("pending", &stores.pending_names().len())
                .field("live", &stores.live_names().len());
        }
        out.finish_non_exhaustive()
    }
}
