//! Projection and filtering of JSON records.

use std::mem::discriminant;

use serde_json::{Map, Value};

/// Restricts `doc` to the fields selected by `projection`.
///
/// A field is kept when its projection value is truthy. When both the field
/// and its projection value are objects the projection recurses; any other
/// truthy projection keeps the field as-is. Non-object documents have no
/// fields and project to an empty object.
pub fn project(doc: &Value, projection: &Map<String, Value>) -> Value {
    let Value::Object(fields) = doc else {
        return Value::Object(Map::new());
    };

    let projected = fields
        .iter()
        .filter_map(|(name, value)| {
            let mask = projection.get(name).filter(|mask| is_truthy(mask))?;
            let kept = match (value, mask) {
                (Value::Object(_), Value::Object(nested)) => project(value, nested),
                _ => value.clone(),
            };
            Some((name.clone(), kept))
        })
        .collect();
    Value::Object(projected)
}

/// Returns true when `doc` does not match `filter` and should be dropped.
///
/// - Text against text: every whitespace-separated term of the filter must
///   occur in the document, ignoring case.
/// - Object filter: the document must be an object holding every filter key
///   with a value of the same JSON type that itself matches. An empty filter
///   object matches anything.
/// - Array against array: every filter element must match some document
///   element.
/// - Anything else matches only an equal value.
pub fn excludes(doc: &Value, filter: &Value) -> bool {
    match (doc, filter) {
        (_, Value::Object(wanted)) if wanted.is_empty() => false,
        (Value::String(text), Value::String(terms)) => {
            let text = text.to_lowercase();
            !terms
                .split_whitespace()
                .all(|term| text.contains(&term.to_lowercase()))
        }
        (Value::Object(fields), Value::Object(wanted)) => {
            wanted.iter().any(|(name, wanted)| match fields.get(name) {
                Some(value) => discriminant(value) != discriminant(wanted) || excludes(value, wanted),
                None => true,
            })
        }
        (Value::Array(items), Value::Array(wanted)) => !wanted
            .iter()
            .all(|wanted| items.iter().any(|item| !excludes(item, wanted))),
        (Value::Number(a), Value::Number(b)) => a.as_f64() != b.as_f64(),
        _ => doc != filter,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
