//! Path parsing and the storage-key codec.
//!
//! Records are addressed by filesystem-like paths (`/users/alice`). A path is
//! decomposed into its *channel* (everything but the last segment) and its
//! *key* (the last segment). Physically a record lives under the storage key
//! `!<channel>!<key>`, so every direct child of a channel sorts contiguously
//! and a channel can be listed with a single prefix range scan.
//!
//! # Examples
//!
//! ```rust
//! use channeldb::path::{decode_storage_key, encode_storage_key, parse};
//!
//! let parsed = parse("//users/alice/");
//! assert_eq!(parsed.path, "/users/alice");
//! assert_eq!(parsed.channel, "/users");
//! assert_eq!(parsed.key, "alice");
//!
//! let raw = encode_storage_key(&parsed.channel, &parsed.key);
//! assert_eq!(raw, "!/users!alice");
//! assert_eq!(decode_storage_key(&raw).unwrap(), parsed);
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::constants::{DELIMITER, ROOT, SENTINEL, SEPARATOR};

/// Errors raised while validating paths or decoding storage keys.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path contains a reserved character.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A raw key read back from the store is not a well-formed storage key.
    #[error("Invalid storage key '{key}'")]
    InvalidStorageKey { key: String },
}

impl PathError {
    /// Check if this error was caused by a user-supplied path.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, PathError::InvalidPath { .. })
    }
}

/// A normalized path decomposed into channel and key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPath {
    /// Canonical path: `channel + slash + key`.
    pub path: String,
    /// Parent path. `/` for top-level records and for the root itself.
    pub channel: String,
    /// Final segment. Empty for the root record.
    pub key: String,
    /// `/` unless the channel is the root.
    pub slash: &'static str,
}

impl ParsedPath {
    /// Builds a parsed path from an already-normalized channel and key.
    pub fn from_parts(channel: impl Into<String>, key: impl Into<String>) -> Self {
        let channel = channel.into();
        let key = key.into();
        let slash = if channel == ROOT { "" } else { "/" };
        Self {
            path: format!("{channel}{slash}{key}"),
            channel,
            key,
            slash,
        }
    }

    /// True for the root record (`/`).
    pub fn is_root(&self) -> bool {
        self.channel == ROOT && self.key.is_empty()
    }

    /// The storage key this path is written under.
    pub fn storage_key(&self) -> String {
        encode_storage_key(&self.channel, &self.key)
    }
}

/// An exclusive `(gt, lt)` storage-key range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    pub gt: String,
    pub lt: String,
}

impl KeyRange {
    /// Narrow this range by optional lower and upper bounds.
    ///
    /// Returns `None` when the narrowed range is empty.
    pub fn clamp(&self, gt: Option<&str>, lt: Option<&str>) -> Option<KeyRange> {
        let gt = match gt {
            Some(bound) if bound > self.gt.as_str() => bound.to_string(),
            _ => self.gt.clone(),
        };
        let lt = match lt {
            Some(bound) if bound < self.lt.as_str() => bound.to_string(),
            _ => self.lt.clone(),
        };
        (gt < lt).then_some(KeyRange { gt, lt })
    }
}

/// Parses a raw path into its normalized components.
///
/// Doubled separators are collapsed and leading/trailing separators are
/// stripped. An empty input is the root. Parsing is idempotent:
/// `parse(&parse(p).path) == parse(p)`.
pub fn parse(raw: &str) -> ParsedPath {
    let segments: Vec<&str> = raw
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.split_last() {
        None => ParsedPath::from_parts(ROOT, ""),
        Some((key, parents)) => {
            let channel = format!("{ROOT}{}", parents.join("/"));
            ParsedPath::from_parts(channel, *key)
        }
    }
}

/// Rejects paths containing the reserved delimiter or the scan sentinel.
pub fn validate(raw: &str) -> Result<(), PathError> {
    if raw.contains(DELIMITER) {
        return Err(PathError::InvalidPath {
            path: raw.to_string(),
            reason: format!("the '{DELIMITER}' character is reserved"),
        });
    }
    if raw.contains(SENTINEL) {
        return Err(PathError::InvalidPath {
            path: raw.escape_debug().to_string(),
            reason: "the U+10FFFF character is reserved".to_string(),
        });
    }
    Ok(())
}

/// Joins `sub` onto `base` and normalizes the result.
///
/// `sub` is always treated as relative to `base`, so a leading separator in
/// `sub` does not reset to the root.
pub fn join(base: &str, sub: &str) -> String {
    parse(&format!("{base}{SEPARATOR}{sub}")).path
}

/// Encodes `(channel, key)` as `!<channel>!<key>`.
pub fn encode_storage_key(channel: &str, key: &str) -> String {
    format!("{DELIMITER}{channel}{DELIMITER}{key}")
}

/// Decodes a storage key back into its path components.
pub fn decode_storage_key(raw: &str) -> Result<ParsedPath, PathError> {
    raw.strip_prefix(DELIMITER)
        .and_then(|rest| rest.split_once(DELIMITER))
        .map(|(channel, key)| ParsedPath::from_parts(channel, key))
        .ok_or_else(|| PathError::InvalidStorageKey {
            key: raw.to_string(),
        })
}

/// Storage-key range holding the direct children of `path`.
pub fn child_range(path: &str) -> KeyRange {
    let prefix = encode_storage_key(&parse(path).path, "");
    KeyRange {
        lt: format!("{prefix}{SENTINEL}"),
        gt: prefix,
    }
}

/// Ascending storage-key ranges covering every descendant of `path`.
///
/// Direct children live under `!<path>!`; deeper descendants live under
/// channels prefixed by `<path>/`. Since the delimiter sorts before the
/// separator, the direct-children range comes first. Keys of unrelated
/// siblings such as `/a-b` may sort between the two ranges, which is why a
/// subtree needs two ranges rather than one.
///
/// For the root every key other than the root record itself is a
/// descendant; the two ranges are split around the root record's key.
pub fn subtree_ranges(path: &str) -> Vec<KeyRange> {
    let path = parse(path).path;
    if path == ROOT {
        let root_key = encode_storage_key(ROOT, "");
        let everything = format!("{DELIMITER}{ROOT}");
        return vec![
            KeyRange {
                gt: everything.clone(),
                lt: root_key.clone(),
            },
            KeyRange {
                gt: root_key,
                lt: format!("{everything}{SENTINEL}"),
            },
        ];
    }

    let nested = format!("{DELIMITER}{path}{SEPARATOR}");
    vec![
        child_range(&path),
        KeyRange {
            lt: format!("{nested}{SENTINEL}"),
            gt: nested,
        },
    ]
}

/// Returns `path` relative to `base`, e.g. `b/c` for `/a/b/c` under `/a`.
pub fn relative_key(base: &str, path: &str) -> String {
    let base = parse(base).path;
    let rest = if base == ROOT {
        path.strip_prefix(ROOT)
    } else {
        path.strip_prefix(base.as_str())
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
    };
    rest.unwrap_or(path).to_string()
}

/// Maps a boundary relative to `base` onto the storage key it denotes.
pub fn bound_key(base: &str, relative: &str) -> Result<String, PathError> {
    validate(relative)?;
    Ok(parse(&join(base, relative)).storage_key())
}
