//! Ordered key-value store backends
//!
//! This module provides the [`KeyValueStore`] trait, the narrow interface the
//! channel layer uses to reach physical storage, and the [`InMemory`]
//! implementation.
//!
//! A store holds JSON values under string keys and must support exclusive
//! range scans in lexicographic (byte) key order. Each mutation returns a
//! store-issued event id and a millisecond timestamp that the channel layer
//! forwards in its change events.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod errors;
mod in_memory;

pub use errors::BackendError;
pub use in_memory::InMemory;

/// Receipt returned by [`KeyValueStore::put`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutReceipt {
    /// Store-issued id of the write event
    pub event: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Receipt returned by [`KeyValueStore::del`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelReceipt {
    /// Store-issued id of the delete event
    pub event: String,
    /// The keys covered by the delete, in request order
    pub keys: Vec<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Parameters of an ordered range scan.
///
/// Both bounds are exclusive. Results are ascending unless `reverse` is set,
/// in which case the scan starts at the upper bound. `limit` caps the number
/// of rows returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRange {
    pub gt: String,
    pub lt: String,
    pub reverse: bool,
    /// Include stored values in the results.
    pub values: bool,
    pub limit: Option<usize>,
}

/// A single row produced by [`KeyValueStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanEntry {
    pub key: String,
    /// Present only when the scan requested values.
    pub value: Option<Value>,
}

/// Ordered key-value store abstracting the physical storage mechanism.
///
/// Implementations are expected to serialize operations on a single key but
/// need not offer transactions across keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieves the value stored under `key`.
    ///
    /// Returns [`BackendError::KeyNotFound`] when no value is stored.
    async fn get(&self, key: &str) -> Result<Value, BackendError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Value) -> Result<PutReceipt, BackendError>;

    /// Removes all `keys` as one batch. Missing keys are not an error.
    async fn del(&self, keys: Vec<String>) -> Result<DelReceipt, BackendError>;

    /// Ordered range scan.
    async fn list(&self, range: ScanRange) -> Result<Vec<ScanEntry>, BackendError>;

    /// Returns a reference to the store as a `dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
