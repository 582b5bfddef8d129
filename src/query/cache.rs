/*!
 * Query result caching.
 *
 * This module provides the in-memory cache that sits in front of the
 * store. Keys are opaque strings: the rendered text of a query, or a
 * synthetic key such as `get_post_12` for collaborator lookups. Entries
 * live as long as the cache; there is no eviction.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::models::QueryResult;
use crate::providers::{ContentObject, Term};

/// Value held by the cache
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Result of a store query
    Query(QueryResult),
    /// Result of an object lookup, including "not found"
    Object(Option<ContentObject>),
    /// Result of a terms lookup
    Terms(Vec<Term>),
}

/// Cache for store query results and collaborator lookups
pub struct QueryCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<String, CachedValue>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,
}

impl QueryCache {
    /// Create a new query cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Whether a value is stored under `key`
    pub fn has(&self, key: &str) -> bool {
        self.enabled && self.cache.read().contains_key(key)
    }

    /// Get the value stored under `key`, counting the hit or miss
    pub fn get(&self, key: &str) -> Option<CachedValue> {
        self.get_as(key, Some)
    }

    /// Get the value stored under `key` if `extract` accepts it.
    ///
    /// A stored value that `extract` rejects counts as a miss, so every
    /// lookup on an enabled cache adds exactly one hit or one miss.
    pub fn get_as<T>(&self, key: &str, extract: impl FnOnce(CachedValue) -> Option<T>) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let stored = self.cache.read().get(key).cloned();
        match stored.and_then(extract) {
            Some(value) => {
                *self.hits.write() += 1;
                debug!("Cache hit for '{}'", truncate_text(key, 60));
                Some(value)
            }
            None => {
                *self.misses.write() += 1;
                debug!("Cache miss for '{}'", truncate_text(key, 60));
                None
            }
        }
    }

    /// Store a value under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: CachedValue) {
        if !self.enabled {
            return;
        }

        self.cache.write().insert(key.to_string(), value);
        debug!("Cached result for '{}'", truncate_text(key, 60));
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.cache.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;

        debug!("Query cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for QueryCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            enabled: self.enabled,
        }
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_length: usize) -> String {
    let single_line: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match single_line.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}...", &single_line[..cut]),
        None => single_line,
    }
}
