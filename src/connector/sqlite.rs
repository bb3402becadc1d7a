//! SQLite backend, driven through tokio-rusqlite's background thread.

use crate::factory::{BackendHandle, DbFactory, FactoryError};
use crate::registry::{BackendType, Connector, ConnectorError, SQLITE_TAG};
use async_trait::async_trait;
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_rusqlite::Connection;

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Settings for a `sqlite` shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`.
    pub path: String,
    /// Open the file read-only (ignored for `:memory:`).
    pub read_only: bool,
    /// How long a statement waits on a locked database.
    pub busy_timeout_ms: u64,
    /// Run `SELECT 1` after opening.
    pub ping: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: MEMORY_PATH.to_string(),
            read_only: false,
            busy_timeout_ms: 5000,
            ping: true,
        }
    }
}

/// An open SQLite database.
///
/// Cloning the inner connection is cheap; every clone talks to the same
/// background thread.
#[derive(Debug)]
pub struct SqliteHandle {
    conn: Connection,
    path: String,
}

impl SqliteHandle {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl BackendHandle for SqliteHandle {
    const BACKEND_TYPES: &'static [&'static str] = &[SQLITE_TAG];
}

/// Connector for [`BackendType::SQLITE`].
pub struct SqliteConnector;

async fn open(config: &SqliteConfig) -> Result<Connection, ConnectorError> {
    let opened = if config.path == MEMORY_PATH {
        Connection::open_in_memory().await
    } else if config.read_only {
        Connection::open_with_flags(
            &config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )
        .await
    } else {
        Connection::open(&config.path).await
    };

    opened.map_err(|e| ConnectorError::Connect(format!("{}: {}", config.path, e)))
}

#[async_trait]
impl Connector for SqliteConnector {
    type Config = SqliteConfig;
    type Handle = SqliteHandle;

    fn describe(&self) -> &'static str {
        "SQLite database file"
    }

    async fn connect(&self, config: &SqliteConfig) -> Result<SqliteHandle, ConnectorError> {
        if config.path.trim().is_empty() {
            return Err(ConnectorError::InvalidConfig(
                "sqlite path cannot be empty".to_string(),
            ));
        }

        let conn = open(config).await?;

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.busy_timeout(busy_timeout)?;
            Ok(())
        })
        .await
        .map_err(|e| ConnectorError::Connect(e.to_string()))?;

        if config.ping {
            conn.call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(|e| ConnectorError::Ping(e.to_string()))?;
        }

        tracing::debug!(
            path = %config.path,
            read_only = config.read_only,
            "Opened SQLite database"
        );

        Ok(SqliteHandle {
            conn,
            path: config.path.clone(),
        })
    }

    async fn close(&self, handle: &SqliteHandle) -> Result<(), ConnectorError> {
        handle
            .conn
            .clone()
            .close()
            .await
            .map_err(|e| ConnectorError::Close(e.to_string()))
    }
}

/// Add a `sqlite` config under `name`.
pub async fn add_config(
    factory: &DbFactory,
    name: &str,
    config: SqliteConfig,
) -> Result<(), FactoryError> {
    factory
        .add_typed_config::<SqliteConnector>(name, BackendType::SQLITE, config)
        .await
}

/// Fetch the database connected under `name`.
pub async fn get(factory: &DbFactory, name: &str) -> Result<Arc<SqliteHandle>, FactoryError> {
    factory.get::<SqliteHandle>(name).await
}

/// Fetch the database connected under `name`, panicking on any error.
///
/// Only for startup wiring.
pub async fn must_get(factory: &DbFactory, name: &str) -> Arc<SqliteHandle> {
    factory.must_get::<SqliteHandle>(name).await
}
