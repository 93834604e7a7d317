//! Hierarchical channels over an ordered key-value store.
//!
//! [`Channels`] implements put/get/del/list on paths. Every record lives at
//! `(channel, key)`; writing a record guarantees that its channel, and each
//! channel above it, exists as a record too (materialized as `{}` when
//! missing). Deleting a path removes its whole subtree in one batch.
//!
//! # Concurrency
//!
//! Two sequences here are not atomic:
//!
//! - put checks each ancestor and creates it when missing. Concurrent puts
//!   under the same missing channel may both create it; both write `{}`, so
//!   the outcome is the same.
//! - del scans the subtree, then deletes the keys it found. A record written
//!   into the subtree between the scan and the delete survives and is not
//!   listed in the delete event.
//!
//! Callers needing stronger guarantees must serialize these operations
//! themselves, for example with a per-channel mutex.

use std::sync::Arc;

use handle_trait::Handle;
use serde_json::{Value, json};

use crate::Result;
use crate::backend::{KeyValueStore, ScanRange};
use crate::constants::ROOT;
use crate::path::{self, ParsedPath};

pub mod errors;
pub mod events;
pub mod filter;
mod handle;
mod list;
pub mod query;

pub use errors::ChannelError;
pub use events::{DelEvent, Event, EventListener, PutEvent};
pub use handle::Channel;
pub use query::{Cursor, Entry, GetQuery, ListQuery, Listing};

use events::EventBus;

struct ChannelsInternal {
    backend: Box<dyn KeyValueStore>,
    events: EventBus,
}

/// Path-addressed record store.
///
/// `Channels` is a cheap handle: clones share the same backend and the same
/// event listener slot.
///
/// # Example
///
/// ```
/// # use channeldb::{Channels, ListQuery, backend::InMemory};
/// # use serde_json::json;
/// # #[tokio::main]
/// # async fn main() -> channeldb::Result<()> {
/// let channels = Channels::open(Box::new(InMemory::new()));
///
/// channels.put("/users/alice", json!({ "age": 30 })).await?;
///
/// // The parent channel was materialized.
/// assert_eq!(channels.get("/users", None).await?.data, Some(json!({})));
///
/// let listing = channels.list("/users", &ListQuery::new().values()).await?;
/// assert_eq!(listing.paths(), ["/users/alice"]);
/// assert!(listing.cursor.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Handle)]
pub struct Channels {
    inner: Arc<ChannelsInternal>,
}

impl Channels {
    /// Opens the channel layer over `backend`.
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(ChannelsInternal {
                backend,
                events: EventBus::default(),
            }),
        }
    }

    /// The underlying store.
    pub fn backend(&self) -> &dyn KeyValueStore {
        self.inner.backend.as_ref()
    }

    /// Registers the change listener, replacing any previous one.
    pub fn on_event(&self, listener: impl EventListener + 'static) {
        self.inner.events.set_listener(Arc::new(listener));
    }

    /// Removes the change listener.
    pub fn clear_listener(&self) {
        self.inner.events.clear_listener();
    }

    /// Whether a change listener is registered.
    pub fn has_listener(&self) -> bool {
        self.inner.events.has_listener()
    }

    /// A handle bound to the root path.
    pub fn root(&self) -> Channel {
        Channel::new(self.handle(), ROOT)
    }

    /// A handle bound to `path`.
    pub fn channel(&self, path: &str) -> Channel {
        Channel::new(self.handle(), path)
    }

    /// Writes `data` at `path`, materializing missing ancestor channels.
    ///
    /// Fails with [`ChannelError::Validation`] when `data` is null or empty
    /// and with [`ChannelError::InvalidPath`] when the path contains a
    /// reserved character. The listener first receives one event per
    /// materialized ancestor, outermost first, then the event for `path`.
    pub async fn put(&self, path: &str, data: Value) -> Result<PutEvent> {
        if let Some(reason) = emptiness(&data) {
            return Err(ChannelError::Validation {
                reason: reason.to_string(),
            }
            .into());
        }
        path::validate(path).map_err(ChannelError::from)?;

        let parsed = path::parse(path);
        let event = self.write(&parsed, data).await?;
        tracing::debug!(path = %event.path, event = %event.event, "Put record");

        if !parsed.is_root() {
            for ancestor in self.materialize_ancestors(&parsed.channel).await? {
                self.inner.events.emit(&Event::Put(ancestor));
            }
        }

        self.inner.events.emit(&Event::Put(event.clone()));
        Ok(event)
    }

    /// Reads the record at `path`.
    ///
    /// The root record always exists implicitly; reading it before it was
    /// written yields `{}`.
    pub async fn get(&self, path: &str, query: Option<&GetQuery>) -> Result<Entry> {
        path::validate(path).map_err(ChannelError::from)?;
        let parsed = path::parse(path);

        let data = match self.backend().get(&parsed.storage_key()).await {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(e) if e.is_not_found() && parsed.is_root() => Some(json!({})),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e.into()),
        };
        let Some(data) = data else {
            return Err(ChannelError::NotFound { path: parsed.path }.into());
        };

        let record_path = parsed.path.clone();
        let mut entry = Entry::new(parsed, Some(data));
        let Some(query) = query else {
            return Ok(entry);
        };

        if let Some(projection) = &query.projection {
            entry = list::project_entry(&entry, projection)?;
        }
        if let Some(children) = &query.children {
            entry.children = Some(self.list(&record_path, children).await?);
        }
        Ok(entry)
    }

    /// Deletes `path` and every record below it in one batch.
    pub async fn del(&self, path: &str) -> Result<DelEvent> {
        path::validate(path).map_err(ChannelError::from)?;
        let parsed = path::parse(path);

        let mut keys = vec![parsed.storage_key()];
        for range in path::subtree_ranges(&parsed.path) {
            let rows = self
                .backend()
                .list(ScanRange {
                    gt: range.gt,
                    lt: range.lt,
                    ..Default::default()
                })
                .await?;
            keys.extend(rows.into_iter().map(|row| row.key));
        }

        let receipt = self.backend().del(keys).await?;
        let paths = receipt
            .keys
            .iter()
            .map(|key| path::decode_storage_key(key).map(|p| p.path))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let event = DelEvent {
            event: receipt.event,
            paths,
            timestamp: receipt.timestamp,
        };
        tracing::debug!(
            path = %parsed.path,
            removed = event.paths.len(),
            event = %event.event,
            "Deleted subtree"
        );
        self.inner.events.emit(&Event::Del(event.clone()));
        Ok(event)
    }

    async fn write(&self, parsed: &ParsedPath, data: Value) -> Result<PutEvent> {
        let receipt = self.backend().put(&parsed.storage_key(), data).await?;
        Ok(PutEvent {
            event: receipt.event,
            path: parsed.path.clone(),
            channel: parsed.channel.clone(),
            key: parsed.key.clone(),
            timestamp: receipt.timestamp,
        })
    }

    /// Walks upward from `channel`, creating each missing ancestor as `{}`.
    ///
    /// Stops at the first ancestor that exists or at the root, which is
    /// never materialized. Returns the created records' events ordered from
    /// the outermost ancestor inward.
    async fn materialize_ancestors(&self, channel: &str) -> Result<Vec<PutEvent>> {
        let mut created = Vec::new();
        let mut current = path::parse(channel);

        while !current.is_root() {
            match self.backend().get(&current.storage_key()).await {
                Ok(_) => break,
                Err(e) if e.is_not_found() => {
                    let event = self.write(&current, json!({})).await?;
                    tracing::debug!(path = %event.path, "Materialized channel");
                    created.push(event);
                    current = path::parse(&current.channel);
                }
                Err(e) => return Err(e.into()),
            }
        }

        created.reverse();
        Ok(created)
    }
}

/// Describes why `data` is not acceptable for put, if it is not.
fn emptiness(data: &Value) -> Option<&'static str> {
    match data {
        Value::Null => Some("null"),
        Value::Object(map) if map.is_empty() => Some("empty object"),
        Value::Array(items) if items.is_empty() => Some("empty array"),
        Value::String(s) if s.is_empty() => Some("empty string"),
        _ => None,
    }
}
