//! In-process key-value cache backend.

use crate::factory::{BackendHandle, DbFactory, FactoryError};
use crate::registry::{BackendType, Connector, ConnectorError, MEMKV_TAG};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings for a `memkv` shard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemKvConfig {
    /// Maximum number of keys; 0 means unbounded.
    pub capacity: usize,
}

/// Concurrent byte-value cache living in this process.
#[derive(Debug)]
pub struct MemKvCache {
    entries: DashMap<String, Vec<u8>>,
    capacity: usize,
}

impl MemKvCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store `value` under `key`.
    ///
    /// Returns `false` without storing when the cache is full and `key` is new.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> bool {
        let key = key.into();
        if self.capacity > 0
            && self.entries.len() >= self.capacity
            && !self.entries.contains_key(&key)
        {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl BackendHandle for MemKvCache {
    const BACKEND_TYPES: &'static [&'static str] = &[MEMKV_TAG];
}

/// Connector for [`BackendType::MEMKV`].
pub struct MemKvConnector;

#[async_trait]
impl Connector for MemKvConnector {
    type Config = MemKvConfig;
    type Handle = MemKvCache;

    fn describe(&self) -> &'static str {
        "in-process key-value cache"
    }

    async fn connect(&self, config: &MemKvConfig) -> Result<MemKvCache, ConnectorError> {
        Ok(MemKvCache::new(config.capacity))
    }

    async fn close(&self, handle: &MemKvCache) -> Result<(), ConnectorError> {
        handle.clear();
        Ok(())
    }
}

/// Add a `memkv` config under `name`.
pub async fn add_config(
    factory: &DbFactory,
    name: &str,
    config: MemKvConfig,
) -> Result<(), FactoryError> {
    factory
        .add_typed_config::<MemKvConnector>(name, BackendType::MEMKV, config)
        .await
}

/// Fetch the cache connected under `name`.
pub async fn get(factory: &DbFactory, name: &str) -> Result<Arc<MemKvCache>, FactoryError> {
    factory.get::<MemKvCache>(name).await
}

/// Fetch the cache connected under `name`, panicking if it is missing or not a cache.
///
/// Only for startup wiring.
pub async fn must_get(factory: &DbFactory, name: &str) -> Arc<MemKvCache> {
    factory.must_get::<MemKvCache>(name).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let cache = MemKvCache::new(0);
        assert!(cache.set("k", "v"));
        assert_eq!(cache.get("k"), Some(b"v".to_vec()));
        assert_eq!(cache.remove("k"), Some(b"v".to_vec()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_rejects_new_keys_when_full() {
        let cache = MemKvCache::new(1);
        assert!(cache.set("a", "1"));
        assert!(!cache.set("b", "2"));
        // Overwriting an existing key is still allowed
        assert!(cache.set("a", "3"));
        assert_eq!(cache.get("a"), Some(b"3".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_config_defaults_unbounded() {
        let config: MemKvConfig = toml::from_str("").unwrap();
        assert_eq!(config.capacity, 0);
    }

    #[tokio::test]
    async fn test_close_clears_entries() {
        let cache = MemKvConnector
            .connect(&MemKvConfig { capacity: 8 })
            .await
            .unwrap();
        cache.set("a", "1");

        MemKvConnector.close(&cache).await.unwrap();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 8);
    }

    #[tokio::test]
    async fn test_typed_accessors() {
        let factory = DbFactory::new();
        add_config(&factory, "Sessions", MemKvConfig { capacity: 2 })
            .await
            .unwrap();
        factory.connect_all().await.unwrap();

        let cache = get(&factory, "sessions").await.unwrap();
        assert_eq!(cache.capacity(), 2);

        let same = must_get(&factory, "SESSIONS").await;
        assert!(Arc::ptr_eq(&cache, &same));
    }
}
