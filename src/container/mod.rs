//! Process-wide key/value container.
//!
//! Entries are registered once and never overwritten; a whole family of keys
//! is removed at once by prefix.

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{trace, warn};

/// Concurrent string-keyed container of cloneable values.
#[derive(Debug)]
pub struct Container<V> {
    entries: DashMap<String, V>,
}

impl<V: Clone> Container<V> {
    /// Creates an empty container
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Registers `value` under `key` if the key is free.
    ///
    /// Returns `false`, leaving the existing entry untouched, when the key is
    /// already registered.
    pub fn set(&self, key: impl Into<String>, value: V) -> bool {
        match self.entries.entry(key.into()) {
            Entry::Occupied(occupied) => {
                warn!(key = %occupied.key(), "key already registered in container");
                false
            }
            Entry::Vacant(vacant) => {
                trace!(key = %vacant.key(), "registered container key");
                vacant.insert(value);
                true
            }
        }
    }

    /// Returns a copy of the value stored under `key`
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Whether `key` is registered
    pub fn key_exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn fuzzy_delete(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            removed += usize::from(!keep);
            keep
        });
        removed
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for Container<V> {
    fn default() -> Self {
        Self::new()
    }
}
