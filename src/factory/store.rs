//! Name-keyed stores of pending configs and live instances.
//!
//! The stores have no locking of their own; [`DbFactory`](super::DbFactory)
//! only touches them while holding its lock. Keys are expected to be
//! normalized with [`normalize_name`].

use crate::registry::{BackendType, ConfigValue, InstanceHandle};
use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Trim and lower-case a logical name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Desired state for a name: what to connect, not yet connected.
pub(crate) struct PendingEntry {
    pub(crate) backend_type: BackendType,
    pub(crate) config: ConfigValue,
    /// Insertion sequence; a replaced entry gets a fresh one.
    seq: u64,
}

/// A connected backend instance.
///
/// Cloning shares the underlying handle.
#[derive(Clone)]
pub struct DbInstance {
    backend_type: BackendType,
    instance: InstanceHandle,
    connected_at: DateTime<Utc>,
}

impl DbInstance {
    pub(crate) fn new(backend_type: BackendType, instance: InstanceHandle) -> Self {
        Self {
            backend_type,
            instance,
            connected_at: Utc::now(),
        }
    }

    pub fn backend_type(&self) -> &BackendType {
        &self.backend_type
    }

    /// The opaque handle returned by the backend's connector.
    pub fn instance(&self) -> &InstanceHandle {
        &self.instance
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Borrow the handle as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }
}

impl fmt::Debug for DbInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbInstance")
            .field("backend_type", &self.backend_type)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub(crate) struct Stores {
    pending: HashMap<String, PendingEntry>,
    live: HashMap<String, DbInstance>,
    next_seq: u64,
}

impl Stores {
    /// Install or replace the pending entry for `name`.
    pub(crate) fn insert_pending(
        &mut self,
        name: String,
        backend_type: BackendType,
        config: ConfigValue,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(
            name,
            PendingEntry {
                backend_type,
                config,
                seq,
            },
        );
    }

    pub(crate) fn pending(&self, name: &str) -> Option<&PendingEntry> {
        self.pending.get(name)
    }

    pub(crate) fn remove_pending(&mut self, name: &str) -> Option<PendingEntry> {
        self.pending.remove(name)
    }

    /// Pending names in insertion order.
    pub(crate) fn pending_names(&self) -> Vec<String> {
        let mut entries: Vec<(&String, u64)> = self
            .pending
            .iter()
            .map(|(name, entry)| (name, entry.seq))
            .collect();
        entries.sort_by_key(|(_, seq)| *seq);
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn live(&self, name: &str) -> Option<&DbInstance> {
        self.live.get(name)
    }

    pub(crate) fn is_live(&self, name: &str) -> bool {
        self.live.contains_key(name)
    }

    pub(crate) fn insert_live(&mut self, name: String, instance: DbInstance) {
        self.live.insert(name, instance);
    }

    pub(crate) fn remove_live(&mut self, name: &str) -> Option<DbInstance> {
        self.live.remove(name)
    }

    /// Take every live instance, sorted by name, leaving the store empty.
    pub(crate) fn drain_live(&mut self) -> Vec<(String, DbInstance)> {
        let mut drained: Vec<(String, DbInstance)> = self.live.drain().collect();
        drained.sort_by(|a, b| a.0.cmp(&b.0));
        drained
    }

    pub(crate) fn live_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.live.keys().cloned().collect();
        names.sort();
        names
    }
}
