//! In-memory ordered store
//!
//! This module provides an in-memory implementation of the [`KeyValueStore`]
//! trait backed by a `BTreeMap`, suitable for testing, development, or
//! single-process deployments that persist by saving the whole state to a
//! JSON file.

mod persistence;

use std::any::Any;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{BackendError, DelReceipt, KeyValueStore, PutReceipt, ScanEntry, ScanRange};
use crate::clock::{Clock, SystemClock};

/// A simple ordered in-memory store.
///
/// Keys are kept in a `BTreeMap`, so range scans walk keys in byte order
/// exactly as the channel layer expects. All operations take the single
/// `RwLock`, which makes each individual call atomic; a batch delete is
/// applied under one write lock.
#[derive(Debug)]
pub struct InMemory {
    pub(crate) entries: RwLock<BTreeMap<String, Value>>,
    clock: Arc<dyn Clock>,
}

impl InMemory {
    /// Creates a new, empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new, empty store stamping events with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::from_entries(BTreeMap::new(), clock)
    }

    pub(crate) fn from_entries(entries: BTreeMap<String, Value>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(entries),
            clock,
        }
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All stored keys in order.
    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Saves every stored key and value to `path` as JSON.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), BackendError> {
        persistence::save_to_file(self, path).await
    }

    /// Loads a store previously written by [`InMemory::save_to_file`].
    ///
    /// A missing file yields a new, empty store.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        persistence::load_from_file(path).await
    }

    fn new_event(&self) -> (String, u64) {
        (uuid::Uuid::new_v4().to_string(), self.clock.now_millis())
    }
}

impl Default for InMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemory {
    async fn get(&self, key: &str) -> Result<Value, BackendError> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| BackendError::KeyNotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, key: &str, value: Value) -> Result<PutReceipt, BackendError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        let (event, timestamp) = self.new_event();
        tracing::trace!(key, event = %event, "Stored value");
        Ok(PutReceipt { event, timestamp })
    }

    async fn del(&self, keys: Vec<String>) -> Result<DelReceipt, BackendError> {
        let mut entries = self.entries.write().await;
        for key in &keys {
            entries.remove(key);
        }
        let (event, timestamp) = self.new_event();
        tracing::trace!(count = keys.len(), event = %event, "Deleted keys");
        Ok(DelReceipt {
            event,
            keys,
            timestamp,
        })
    }

    async fn list(&self, range: ScanRange) -> Result<Vec<ScanEntry>, BackendError> {
        // BTreeMap::range panics on empty or inverted exclusive ranges
        if range.gt >= range.lt {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        let scan = entries.range::<str, _>((
            Bound::Excluded(range.gt.as_str()),
            Bound::Excluded(range.lt.as_str()),
        ));
        let limit = range.limit.unwrap_or(usize::MAX);
        let to_entry = |(key, value): (&String, &Value)| ScanEntry {
            key: key.clone(),
            value: range.values.then(|| value.clone()),
        };

        let rows = if range.reverse {
            scan.rev().take(limit).map(to_entry).collect()
        } else {
            scan.take(limit).map(to_entry).collect()
        };
        Ok(rows)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
