//! Error types for channel operations.

use thiserror::Error;

use crate::path::PathError;

/// Errors raised by the channel layer itself.
///
/// Failures of the underlying store surface unchanged as
/// [`crate::Error::Backend`]; this enum only covers the caller-facing
/// conditions the channel semantics define.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Missing or empty data on put.
    #[error("Data is required: {reason}")]
    Validation { reason: String },

    /// The path contains a reserved character.
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// No record stored at the path.
    #[error("Not found: {path}")]
    NotFound { path: String },
}

impl ChannelError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ChannelError::Validation { .. } | ChannelError::InvalidPath(_) => 400,
            ChannelError::NotFound { .. } => 404,
        }
    }

    /// Check if this error indicates the record was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChannelError::NotFound { .. })
    }

    /// Check if this error is a data validation failure.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ChannelError::Validation { .. })
    }

    /// Check if this error is caused by a malformed path.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, ChannelError::InvalidPath(_))
    }

    /// The path this error is about, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ChannelError::NotFound { path } => Some(path),
            ChannelError::InvalidPath(PathError::InvalidPath { path, .. }) => Some(path),
            _ => None,
        }
    }
}

impl From<ChannelError> for crate::Error {
    fn from(err: ChannelError) -> Self {
        crate::Error::Channel(err)
    }
}
