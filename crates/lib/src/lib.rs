//!
//! channeldb: hierarchical, path-addressed records over an ordered key-value store.
//!
//! ## Core Concepts
//!
//! * **Paths (`path`)**: Filesystem-like addresses such as `/users/alice`. Each path
//!   decomposes into a *channel* (its parent) and a *key* (its last segment), and
//!   maps onto a flat storage key `!<channel>!<key>` so that the children of a
//!   channel sort contiguously.
//! * **Backends (`backend::KeyValueStore`)**: The pluggable ordered store the records
//!   live in. `backend::InMemory` is the bundled implementation.
//! * **Channels (`channel::Channels`)**: put/get/del/list over paths. Writing a record
//!   materializes every missing ancestor channel; deleting a path removes its subtree.
//!   Listing supports deep scans, bounds, reverse order, filters, projections and
//!   cursor pagination.
//! * **Handles (`channel::Channel`)**: Cheap views bound to one path.
//! * **Events (`channel::Event`)**: One listener per `Channels` instance observes every
//!   successful put and del.
//! * **Remote (`remote`)**: A JSON request/response binding, with a reqwest client and
//!   an axum router serving a `Channels` instance.

pub mod backend;
pub mod channel;
pub mod clock;
pub mod constants;
pub mod path;
pub mod remote;

pub use channel::{
    Channel, ChannelError, Channels, Cursor, DelEvent, Entry, Event, EventListener, GetQuery,
    ListQuery, Listing, PutEvent,
};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};

/// Result type used throughout the channeldb library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the channeldb library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured channel errors from the channel module
    #[error(transparent)]
    Channel(channel::ChannelError),

    /// Structured store errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Malformed paths or storage keys
    #[error(transparent)]
    Path(path::PathError),

    /// Structured errors from the remote binding
    #[error(transparent)]
    Remote(remote::RemoteError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Channel(_) => "channel",
            Error::Backend(_) => "backend",
            Error::Path(_) => "path",
            Error::Remote(_) => "remote",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a record was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Channel(channel_err) => channel_err.is_not_found(),
            Error::Backend(backend_err) => backend_err.is_not_found(),
            Error::Remote(remote_err) => remote_err.status() == Some(404),
            _ => false,
        }
    }

    /// Check if this error is a data validation failure.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Channel(channel_err) => channel_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error was caused by a malformed path.
    pub fn is_invalid_path(&self) -> bool {
        match self {
            Error::Channel(channel_err) => channel_err.is_invalid_path(),
            Error::Path(path_err) => path_err.is_invalid_path(),
            _ => false,
        }
    }

    /// Check if this error is store-related.
    pub fn is_backend_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if a remote call failed without receiving a response.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Remote(remote_err) => remote_err.is_transport_error(),
            _ => false,
        }
    }

    /// HTTP-style status code for this error.
    ///
    /// Caller errors map to 4xx. A rejection received from a remote server
    /// keeps the server's status. Everything else is 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Channel(channel_err) => channel_err.status_code(),
            Error::Path(path_err) if path_err.is_invalid_path() => 400,
            Error::Remote(remote_err) => remote_err.status().unwrap_or(500),
            _ => 500,
        }
    }
}

impl From<path::PathError> for Error {
    fn from(err: path::PathError) -> Self {
        Error::Path(err)
    }
}
