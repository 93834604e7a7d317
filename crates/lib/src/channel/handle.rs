use serde_json::Value;

use super::{Channels, DelEvent, Entry, GetQuery, ListQuery, Listing, PutEvent};
use crate::Result;
use crate::path;

/// A view of [`Channels`] bound to one normalized path.
///
/// Handles are cheap to clone and to derive: [`Channel::child`] only joins
/// paths, it does not touch the store.
///
/// ```
/// # use channeldb::{Channels, backend::InMemory};
/// # use serde_json::json;
/// # #[tokio::main]
/// # async fn main() -> channeldb::Result<()> {
/// let channels = Channels::open(Box::new(InMemory::new()));
/// let users = channels.root().child("users");
/// let alice = users.child("alice");
///
/// alice.put(json!({ "age": 30 })).await?;
/// assert_eq!(alice.path(), "/users/alice");
/// assert_eq!(alice.get().await?.data, Some(json!({ "age": 30 })));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Channel {
    channels: Channels,
    path: String,
}

impl Channel {
    pub(crate) fn new(channels: Channels, raw: &str) -> Self {
        Self {
            channels,
            path: path::parse(raw).path,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Handle for `sub`, resolved relative to this handle's path.
    pub fn child(&self, sub: &str) -> Channel {
        Channel {
            channels: self.channels.clone(),
            path: path::join(&self.path, sub),
        }
    }

    pub async fn put(&self, data: Value) -> Result<PutEvent> {
        self.channels.put(&self.path, data).await
    }

    pub async fn get(&self) -> Result<Entry> {
        self.channels.get(&self.path, None).await
    }

    pub async fn get_with(&self, query: &GetQuery) -> Result<Entry> {
        self.channels.get(&self.path, Some(query)).await
    }

    /// Deletes this path and its subtree.
    pub async fn del(&self) -> Result<DelEvent> {
        self.channels.del(&self.path).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Listing> {
        self.channels.list(&self.path, query).await
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel").field("path", &self.path).finish()
    }
}
