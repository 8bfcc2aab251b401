// Fri Oct 16 2026 - Alex

use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

/// Counting bag that remembers first-insertion order of its keys.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Multiset<K: Hash + Eq> {
    map: IndexMap<K, u64>,
}

impl<K: Hash + Eq> Multiset<K> {
    pub fn new() -> Self {
        Self { map: IndexMap::new() }
    }

    pub fn add(&mut self, key: K) {
        self.add_count(key, 1);
    }

    /// Adds `count` occurrences. A zero count still registers the key.
    pub fn add_count(&mut self, key: K, count: u64) {
        *self.map.entry(key).or_insert(0) += count;
    }

    pub fn count(&self, key: &K) -> u64 {
        self.map.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.map.iter().map(|(k, v)| (k, *v))
    }

    pub fn total(&self) -> u64 {
        self.map.values().sum()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Hash + Eq> Default for Multiset<K> {
    fn default() -> Self {
        Self::new()
    }
}
