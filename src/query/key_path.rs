//! Dotted key paths ("data.info.count") over record documents.

use serde_json::Value;

/// Resolve `path` against `document`.
///
/// Objects are walked by key and arrays by numeric index. Returns `None` when
/// a segment is missing, empty, or the value it would descend into is a
/// scalar. A stored JSON `null` resolves to `Some(&Value::Null)`.
pub fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(document, |current, segment| {
        if segment.is_empty() {
            return None;
        }
        match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// Like [`resolve`], but treats a stored `null` as absent.
pub fn resolve_present<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    resolve(document, path).filter(|value| !value.is_null())
}
