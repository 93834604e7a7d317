//! The list pipeline: range scan, decode, project, filter, paginate.

use serde_json::{Map, Value};

use super::filter::{excludes, project};
use super::{ChannelError, Channels, Cursor, Entry, ListQuery, Listing};
use crate::Result;
use crate::backend::ScanRange;
use crate::path::{self, KeyRange};

impl Channels {
    /// Lists the records below `path`.
    ///
    /// Without `deep` only direct children are listed; with `deep` the whole
    /// subtree is, direct children first. `limit` caps the rows *scanned*:
    /// when a filter drops rows the page holds fewer than `limit` entries
    /// even though more matches may follow, and the returned cursor resumes
    /// right after the last entry the page does hold. A zero limit means no
    /// limit.
    ///
    /// The filter sees each entry's data after projection, so a field the
    /// projection removes can no longer match.
    ///
    /// A cursor is returned only when a limit was given, the scan filled it,
    /// and at least one entry survived filtering.
    pub async fn list(&self, path: &str, query: &ListQuery) -> Result<Listing> {
        path::validate(path).map_err(ChannelError::from)?;
        let base = path::parse(path).path;

        let mut ranges = scan_ranges(&base, query)?;
        if query.reverse {
            ranges.reverse();
        }

        let max_rows = query.limit.filter(|&limit| limit > 0);
        let mut rows = Vec::new();
        for range in ranges {
            let limit = match max_rows {
                Some(limit) if rows.len() >= limit => break,
                Some(limit) => Some(limit - rows.len()),
                None => None,
            };
            rows.extend(
                self.backend()
                    .list(ScanRange {
                        gt: range.gt,
                        lt: range.lt,
                        reverse: query.reverse,
                        values: query.values,
                        limit,
                    })
                    .await?,
            );
        }
        let scanned = rows.len();

        let mut data = Vec::with_capacity(rows.len());
        let mut last_path = None;
        for row in rows {
            let parsed = path::decode_storage_key(&row.key)?;
            let value = if query.values { row.value } else { None };

            let record_path = parsed.path.clone();
            let entry = Entry::new(parsed, value);
            let entry = match &query.projection {
                Some(projection) => project_entry(&entry, projection)?,
                None => entry,
            };

            if let (true, Some(filter)) = (query.values, &query.filter) {
                if excludes(entry.data.as_ref().unwrap_or(&Value::Null), filter) {
                    continue;
                }
            }

            last_path = Some(record_path);
            data.push(entry);
        }

        let cursor = match (max_rows, last_path) {
            (Some(limit), Some(last)) if scanned >= limit => {
                Some(Cursor::after(query, path::relative_key(&base, &last)))
            }
            _ => None,
        };

        tracing::trace!(
            path = %base,
            scanned,
            returned = data.len(),
            more = cursor.is_some(),
            "Listed channel"
        );
        Ok(Listing { data, cursor })
    }
}

/// Storage-key ranges for `query`, ascending, with empty ranges removed.
fn scan_ranges(base: &str, query: &ListQuery) -> Result<Vec<KeyRange>> {
    let bound = |relative: &Option<String>| {
        relative
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(|r| path::bound_key(base, r).map_err(ChannelError::from))
            .transpose()
    };
    let gt = bound(&query.gt)?;
    let lt = bound(&query.lt)?;

    let ranges = if query.deep {
        path::subtree_ranges(base)
    } else {
        vec![path::child_range(base)]
    };
    Ok(ranges
        .iter()
        .filter_map(|range| range.clamp(gt.as_deref(), lt.as_deref()))
        .collect())
}

/// Applies a projection to a whole entry (path, channel, key and data).
pub(super) fn project_entry(entry: &Entry, projection: &Map<String, Value>) -> Result<Entry> {
    let projected = project(&serde_json::to_value(entry)?, projection);
    Ok(serde_json::from_value(projected)?)
}
