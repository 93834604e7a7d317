//! Error types for the remote binding.

use serde_json::Value;
use thiserror::Error;

/// Errors raised by [`RemoteClient`](super::RemoteClient).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server URL could not be used.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No response was received: connection refused, timeout or a broken
    /// connection while reading the body.
    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status of 400 or above.
    #[error("Server rejected request with status {status}: {body}")]
    Rejected {
        status: u16,
        /// The parsed error body, usually `{code, message}`
        body: Value,
    },

    /// A response body was not the expected JSON.
    #[error("Failed to decode response with status {status}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The configured token provider failed.
    #[error("Token provider failed: {reason}")]
    TokenProvider { reason: String },
}

impl RemoteError {
    /// Check if the request failed without receiving a response.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, RemoteError::Transport { .. })
    }

    /// Check if the server rejected the request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, RemoteError::Rejected { .. })
    }

    /// The HTTP status of a rejection, if the server sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of a rejection body, if present.
    pub fn message(&self) -> Option<&str> {
        match self {
            RemoteError::Rejected { body, .. } => body.get("message").and_then(Value::as_str),
            _ => None,
        }
    }
}

impl From<RemoteError> for crate::Error {
    fn from(err: RemoteError) -> Self {
        crate::Error::Remote(err)
    }
}
