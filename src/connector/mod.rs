//! Connectors shipped with dbfactory.
//!
//! Each connector pairs a config struct (decoded from a `db_*` shard) with a
//! handle type that implements [`BackendHandle`](crate::factory::BackendHandle),
//! plus `get`/`must_get` accessors that narrow a named instance to that handle.

pub mod memkv;
pub mod search;
pub mod sqlite;

pub use memkv::{MemKvCache, MemKvConfig, MemKvConnector};
pub use search::{SearchClient, SearchConfig, SearchConnector};
pub use sqlite::{SqliteConfig, SqliteConnector, SqliteHandle};

use crate::registry::{BackendRegistry, BackendType};

/// Register every built-in connector on `registry`.
pub fn register_builtins(registry: &BackendRegistry) {
    registry.register_connector(BackendType::SQLITE, SqliteConnector);
    registry.register_connector(BackendType::ESV6, SearchConnector::v6());
    registry.register_connector(BackendType::ESV7, SearchConnector::v7());
    registry.register_connector(BackendType::MEMKV, MemKvConnector);
}
