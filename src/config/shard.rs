//! Turning `db_*` config shards into pending factory entries.
//!
//! A shard is a top-level table whose key starts with [`SHARD_PREFIX`]; the
//! rest of the key is the logical name. The table names its backend in a
//! string [`TYPE_FIELD`] and carries the backend's own settings alongside:
//!
//! ```toml
//! [db_main]
//! dbtype = "sqlite"
//! path = "/var/lib/app/main.db"
//!
//! [db_search]
//! dbtype = "esv7"
//! address = ["http://127.0.0.1:9200"]
//! ```

use super::ConfigError;
use crate::factory::{normalize_name, DbFactory};
use crate::registry::BackendType;
use std::path::Path;

/// Key prefix marking a backend shard.
pub const SHARD_PREFIX: &str = "db_";

/// Field naming the shard's backend type.
pub const TYPE_FIELD: &str = "dbtype";

/// The `db_*` entries of `table` as `(name, value)`, sorted by normalized name.
///
/// Raw TOML keys sort by bytes, so `db_Main` would land before `db_cache`;
/// sorting on the normalized name keeps ingestion order case-insensitive.
pub fn shard_entries(table: &toml::Table) -> Vec<(&str, &toml::Value)> {
    let mut entries: Vec<(&str, &toml::Value)> = table
        .iter()
        .filter_map(|(key, value)| key.strip_prefix(SHARD_PREFIX).map(|name| (name, value)))
        .collect();
    entries.sort_by_cached_key(|(name, _)| normalize_name(name));
    entries
}

/// Add one shard to `factory`.
///
/// The type field is stripped and the remaining keys are decoded by the
/// backend's descriptor. A previous config under the same name is replaced.
///
/// # Errors
///
/// - `ConfigError::EmptyName` if `name` is blank
/// - `ConfigError::MissingBackendType` if the type field is absent or not a string
/// - `ConfigError::EmptyBackendType` if the type field is blank
/// - `ConfigError::UnknownBackendType` if the type is not registered
/// - `ConfigError::InvalidShard` if the settings do not decode
pub async fn ingest_shard(
    factory: &DbFactory,
    name: &str,
    shard: &toml::Table,
) -> Result<(), ConfigError> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err(ConfigError::EmptyName);
    }

    let backend_type = match shard.get(TYPE_FIELD) {
        Some(toml::Value::String(tag)) => BackendType::new(tag),
        _ => return Err(ConfigError::MissingBackendType { name }),
    };
    if backend_type.is_empty() {
        return Err(ConfigError::EmptyBackendType { name });
    }

    let descriptor = factory
        .registry()
        .resolve(&backend_type)
        .map_err(|_| ConfigError::UnknownBackendType {
            name: name.clone(),
            backend_type: backend_type.clone(),
        })?;

    let mut settings = shard.clone();
    settings.remove(TYPE_FIELD);

    let config = descriptor
        .decode_config(toml::Value::Table(settings))
        .map_err(|e| ConfigError::InvalidShard {
            name: name.clone(),
            message: e.to_string(),
        })?;

    tracing::debug!(name = %name, backend_type = %backend_type, "Ingested config shard");
    factory.add_config(&name, backend_type, config).await?;

    Ok(())
}

/// Add every `db_*` shard of `table`, in normalized-name order.
///
/// Stops at the first bad shard; shards before it stay added. Returns the
/// number of shards added.
pub async fn ingest_toml_table(
    factory: &DbFactory,
    table: &toml::Table,
) -> Result<usize, ConfigError> {
    let mut count = 0;

    for (name, value) in shard_entries(table) {
        let shard = value.as_table().ok_or_else(|| ConfigError::InvalidShard {
            name: normalize_name(name),
            message: format!("expected a table, found {}", value.type_str()),
        })?;
        ingest_shard(factory, name, shard).await?;
        count += 1;
    }

    tracing::info!(shards = count, "Loaded database configs");
    Ok(count)
}

/// Parse `content` as TOML and add its shards.
pub async fn ingest_toml_str(factory: &DbFactory, content: &str) -> Result<usize, ConfigError> {
    let table: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;
    ingest_toml_table(factory, &table).await
}

/// Read a TOML file and add its shards.
pub async fn ingest_toml_file(factory: &DbFactory, path: &Path) -> Result<usize, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = tokio::fs::read_to_string(path).await?;
    ingest_toml_str(factory, &content).await
}
