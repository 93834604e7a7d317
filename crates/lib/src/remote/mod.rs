//! Remote JSON binding for channels.
//!
//! A server exposes a [`Channels`](crate::Channels) instance on a single
//! endpoint (`POST /api/v0`) that accepts [`RemoteRequest`] envelopes:
//!
//! ```json
//! { "token": "...", "method": "put", "path": "/users/alice", "data": { "age": 30 } }
//! ```
//!
//! [`RemoteClient`] sends those envelopes with reqwest and decodes the
//! results into the same types the local API returns. [`router`] builds the
//! axum side, and [`handle_request`] is the transport-agnostic dispatcher
//! behind it.

pub mod client;
pub mod errors;
pub mod handler;
pub mod protocol;

pub use client::{DEFAULT_TIMEOUT, RemoteChannel, RemoteClient, TokenProvider};
pub use errors::RemoteError;
pub use handler::{handle_request, router};
pub use protocol::{ErrorBody, Method, RemoteRequest};
