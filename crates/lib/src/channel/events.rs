//! Change notification for channel mutations.
//!
//! Every successful put or del produces an [`Event`]. A [`Channels`] instance
//! owns exactly one listener slot: registering a listener replaces the
//! previous one. Listeners run synchronously on the task that performed the
//! mutation, after the store has accepted the write and before the caller
//! receives the result.
//!
//! [`Channels`]: super::Channels

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification for a record written by put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutEvent {
    /// Store-issued event id
    pub event: String,
    pub path: String,
    pub channel: String,
    pub key: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Notification for a subtree removed by del.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelEvent {
    /// Store-issued event id
    pub event: String,
    /// Every path removed by the batch, the deleted path first
    pub paths: Vec<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Put(PutEvent),
    Del(DelEvent),
}

impl Event {
    /// Store-issued event id.
    pub fn id(&self) -> &str {
        match self {
            Event::Put(e) => &e.event,
            Event::Del(e) => &e.event,
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        match self {
            Event::Put(e) => e.timestamp,
            Event::Del(e) => e.timestamp,
        }
    }

    /// The event time as a UTC datetime, if representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp())
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }
}

/// Receiver of change notifications.
///
/// Implemented for every `Fn(&Event) + Send + Sync`, so closures can be
/// registered directly.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> EventListener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Single-slot listener registry.
#[derive(Default)]
pub(crate) struct EventBus {
    listener: RwLock<Option<Arc<dyn EventListener>>>,
}

impl EventBus {
    /// Installs `listener`, replacing any previous one.
    pub(crate) fn set_listener(&self, listener: Arc<dyn EventListener>) {
        *self
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);
    }

    pub(crate) fn clear_listener(&self) {
        *self
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn has_listener(&self) -> bool {
        self.listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Delivers `event` to the current listener, if any.
    ///
    /// The listener is invoked outside the lock so it may re-register.
    pub(crate) fn emit(&self, event: &Event) {
        let listener = self
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(listener) = listener {
            listener.on_event(event);
        }
    }
}
