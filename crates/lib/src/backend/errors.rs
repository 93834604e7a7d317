//! Error types for key-value store backends.

use thiserror::Error;

/// Errors that can occur inside a [`KeyValueStore`](super::KeyValueStore).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// No value stored under the key.
    #[error("Key not found: {key}")]
    KeyNotFound {
        /// The storage key that was looked up
        key: String,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a store implementation outside this crate.
    #[error("Store failure: {reason}")]
    Store {
        /// Description reported by the store
        reason: String,
    },
}

impl BackendError {
    /// Check if this error indicates the key was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::KeyNotFound { .. })
    }

    /// Check if this error is related to I/O or (de)serialization.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// The storage key involved, if this error is about a specific key.
    pub fn key(&self) -> Option<&str> {
        match self {
            BackendError::KeyNotFound { key } => Some(key),
            _ => None,
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
