//! Wire types for the remote JSON binding.
//!
//! Every call is a single POST whose body is a [`RemoteRequest`]. Successful
//! calls answer with the operation's result as JSON; failures answer with a
//! status of 400 or above and an [`ErrorBody`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The channel operation a request invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Put,
    Get,
    Del,
    List,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Put => "put",
            Method::Get => "get",
            Method::Del => "del",
            Method::List => "list",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request envelope.
///
/// `data` holds the record for put, an optional get query for get and the
/// list query for list. It is ignored by del.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRequest {
    #[serde(default)]
    pub token: String,
    pub method: Method,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub data: Value,
}

/// Error payload returned with every failing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
