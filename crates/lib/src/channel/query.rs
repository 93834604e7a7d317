//! Query, result and cursor types for get and list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::ParsedPath;

/// Options for [`Channels::get`](super::Channels::get).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetQuery {
    /// Nested field mask applied to the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Map<String, Value>>,
    /// List the record's children with this query and attach them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<ListQuery>,
}

/// Options for [`Channels::list`](super::Channels::list).
///
/// All fields default to "off": a default query lists the direct children
/// of a path in ascending key order, without values and without a limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Exclusive lower bound, as a key relative to the listed path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    /// Exclusive upper bound, as a key relative to the listed path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    /// List the whole subtree instead of only direct children.
    pub deep: bool,
    /// Descending key order.
    pub reverse: bool,
    /// Attach each record's data.
    pub values: bool,
    /// Maximum number of rows scanned. Zero means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Structural or text filter over record data; only applied with `values`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Nested field mask applied to each entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Map<String, Value>>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deep(mut self) -> Self {
        self.deep = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn values(mut self) -> Self {
        self.values = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn gt(mut self, key: impl Into<String>) -> Self {
        self.gt = Some(key.into());
        self
    }

    pub fn lt(mut self, key: impl Into<String>) -> Self {
        self.lt = Some(key.into());
        self
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn projection(mut self, projection: Map<String, Value>) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// Continuation of a limited list.
///
/// A cursor is the query that produced a page with its boundary advanced
/// past the last entry returned: `gt` moves forward for ascending lists and
/// `lt` moves back for reverse lists. Everything else, including the
/// opposite bound, is carried over unchanged, so listing with
/// [`Cursor::into_query`] resumes exactly where the page ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor {
    query: ListQuery,
}

impl Cursor {
    /// Cursor resuming `query` after the entry at relative key `boundary`.
    pub(crate) fn after(query: &ListQuery, boundary: String) -> Self {
        let mut query = query.clone();
        if query.reverse {
            query.lt = Some(boundary);
        } else {
            query.gt = Some(boundary);
        }
        Self { query }
    }

    /// The query to pass to the next list call.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn into_query(self) -> ListQuery {
        self.query
    }
}

impl From<Cursor> for ListQuery {
    fn from(cursor: Cursor) -> Self {
        cursor.query
    }
}

/// A record as returned by get and list.
///
/// Every field is optional because a projection may remove any of them.
/// Without a projection `path`, `channel` and `key` are always present and
/// `data` is present for get and for list with `values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Listing>,
}

impl Entry {
    pub(crate) fn new(parsed: ParsedPath, data: Option<Value>) -> Self {
        Self {
            path: Some(parsed.path),
            channel: Some(parsed.channel),
            key: Some(parsed.key),
            data,
            children: None,
        }
    }

    /// The record's path, unless projected away.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The record's data, unless absent or projected away.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

/// One page of list results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub data: Vec<Entry>,
    /// Present when more rows may follow; `null` on the wire otherwise.
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

impl Listing {
    /// Paths of the listed entries, skipping entries whose path was
    /// projected away.
    pub fn paths(&self) -> Vec<&str> {
        self.data.iter().filter_map(Entry::path).collect()
    }
}
