use sdui_types::{Item, Meta, RawLayoutDirectory, RawLayoutRecord};
use serde_json::{Map, Value};
use tracing::{debug, warn};

// NOTE: Document tree conventions
//
// The realtime store keeps everything as a JSON tree. Writers are humans with a
// console, so decoding is schema-on-read and never fails:
// - Collections are objects keyed by child id (sorted key order) or arrays with holes
// - Booleans are often stored as strings ("true"/"false")
// - Any field may be missing; gaps become defaults and are logged, not raised

/// Children of a collection node in store order, paired with their keys
fn children(node: &Value) -> Vec<(String, &Value)> {
    match node {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(values) => values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!(found = %kind_of(other), "expected a collection node");
            Vec::new()
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts real booleans and the string forms the console writes
fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(s == "true"),
        _ => None,
    }
}

fn first<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key))
}

/// Decode the data node into the ordered item list.
///
/// A missing `id` falls back to the child key. A missing or malformed
/// `isFavorite` decodes as `false` and is logged.
pub fn decode_items(node: &Value) -> Vec<Item> {
    children(node)
        .into_iter()
        .filter_map(|(key, child)| {
            let Value::Object(record) = child else {
                warn!(key = %key, found = %kind_of(child), "skipping non-object item");
                return None;
            };

            let is_favorite = match record.get("isFavorite") {
                Some(value) => flag(value).unwrap_or_else(|| {
                    warn!(
                        key = %key,
                        found = %kind_of(value),
                        "malformed isFavorite, using false"
                    );
                    false
                }),
                None => {
                    warn!(key = %key, "item has no isFavorite, using false");
                    false
                }
            };

            Some(Item {
                id: text(record, "id").unwrap_or(key),
                title: text(record, "title").unwrap_or_default(),
                description: text(record, "description").unwrap_or_default(),
                is_favorite,
            })
        })
        .collect()
}

/// Integers above `i64::MAX` saturate so the parser's clamp still applies
fn columns(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_u64().map(|_| i64::MAX)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<u64>().ok().map(|_| i64::MAX))
        }
        _ => None,
    }
}

fn layout_record(key: &str, child: &Value) -> RawLayoutRecord {
    let Value::Object(record) = child else {
        warn!(mode = %key, found = %kind_of(child), "layout entry is not an object");
        return RawLayoutRecord::default();
    };

    RawLayoutRecord {
        kind: first(record, &["type", "kind"])
            .and_then(Value::as_str)
            .map(str::to_string),
        columns: record.get("columns").and_then(columns),
    }
}

/// Decode the layout node into mode name → raw record
pub fn decode_layouts(node: &Value) -> RawLayoutDirectory {
    children(node)
        .into_iter()
        .map(|(key, child)| {
            let record = layout_record(&key, child);
            (key, record)
        })
        .collect()
}

/// Decode the meta node; missing fields take their defaults
pub fn decode_meta(node: &Value) -> Meta {
    let record = match node {
        Value::Object(record) => record,
        Value::Null => {
            debug!("meta node is empty, using defaults");
            return Meta::default();
        }
        other => {
            warn!(found = %kind_of(other), "meta node is not an object, using defaults");
            return Meta::default();
        }
    };

    Meta {
        active_mode: first(record, &["mode", "activeMode"])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        favorites_enabled: first(record, &["canFavorite", "favoritesEnabled"])
            .and_then(flag)
            .unwrap_or(false),
    }
}

/// Split a slash-separated node path, ignoring empty segments
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Look up a node by its path segments
pub fn node_at<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(values) => segment.parse::<usize>().ok().and_then(|i| values.get(i)),
        _ => None,
    })
}
