use crate::document::{node_at, split_path};
use crate::{Error, Result};
use sdui_engine::{Sink, Subscription};
use sdui_types::SourceError;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

struct Listener {
    id: u64,
    path: Vec<String>,
    sink: Sink<Value>,
}

struct StoreState {
    root: Value,
    next_id: u64,
    listeners: Vec<Listener>,
}

struct StoreInner {
    state: Mutex<StoreState>,
    /// Serializes mutation + delivery so listeners see writes in order
    dispatch: Mutex<()>,
}

/// In-memory realtime document tree.
///
/// Listeners get value events: the node's current value on registration and
/// again after every write that touches the node, an ancestor, or a
/// descendant. Listener callbacks must not write to the store synchronously.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Either path is a prefix of the other
fn overlaps(a: &[String], b: &[String]) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// Child slot for `segment`, created when absent. Numeric segments index into
/// arrays, padding with nulls; any other parent is turned into an object.
fn child_mut<'a>(value: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = segment.parse::<usize>().ok().filter(|_| value.is_array());
    match (value, index) {
        (Value::Array(values), Some(index)) => {
            if values.len() <= index {
                values.resize(index + 1, Value::Null);
            }
            &mut values[index]
        }
        (value, _) => object_mut(value)
            .entry(segment.to_string())
            .or_insert(Value::Null),
    }
}

/// Existing child at `segment`, never creating anything
fn existing_child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(values) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| values.get_mut(index)),
        _ => None,
    }
}

fn write_at(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        current = child_mut(current, segment);
    }
    *child_mut(current, last) = value;
}

fn remove_at(root: &mut Value, path: &[String]) {
    let Some((last, parents)) = path.split_last() else {
        *root = Value::Null;
        return;
    };

    let mut current = root;
    for segment in parents {
        match existing_child_mut(current, segment) {
            Some(next) => current = next,
            None => return,
        }
    }
    match current {
        Value::Object(map) => {
            map.remove(last);
        }
        // Leave a hole so later elements keep their indices
        Value::Array(values) => {
            if let Some(slot) = last
                .parse::<usize>()
                .ok()
                .and_then(|index| values.get_mut(index))
            {
                *slot = Value::Null;
            }
        }
        _ => {}
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::from_value(Value::Null)
    }

    pub fn from_value(root: Value) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState {
                    root,
                    next_id: 0,
                    listeners: Vec::new(),
                }),
                dispatch: Mutex::new(()),
            }),
        }
    }

    /// Load a JSON export of a document tree
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&content)
            .map_err(|e| Error::Document(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_value(root))
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatching(&self) -> MutexGuard<'_, ()> {
        self.inner
            .dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current value at `path`, `Null` when absent
    pub fn snapshot(&self, path: &str) -> Value {
        let state = self.lock();
        node_at(&state.root, &split_path(path))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write `value` at `path`, creating parents. Writing `null` removes the node.
    pub fn set(&self, path: &str, value: Value) {
        let segments = split_path(path);
        self.mutate(&segments, |root| {
            if value.is_null() {
                remove_at(root, &segments);
            } else {
                write_at(root, &segments, value);
            }
        });
    }

    pub fn remove(&self, path: &str) {
        let segments = split_path(path);
        self.mutate(&segments, |root| remove_at(root, &segments));
    }

    fn mutate<F>(&self, changed: &[String], apply: F)
    where
        F: FnOnce(&mut Value),
    {
        let _dispatch = self.dispatching();

        let deliveries = {
            let mut state = self.lock();
            apply(&mut state.root);
            state
                .listeners
                .iter()
                .filter(|l| overlaps(&l.path, changed))
                .map(|l| {
                    let value = node_at(&state.root, &l.path)
                        .cloned()
                        .unwrap_or(Value::Null);
                    (l.sink.clone(), value)
                })
                .collect::<Vec<_>>()
        };

        debug!(
            path = %changed.join("/"),
            listeners = deliveries.len(),
            "document changed"
        );
        for (sink, value) in deliveries {
            sink.next(value);
        }
    }

    /// Report a failure to every listener at or below `path`
    pub fn fail(&self, path: &str, message: impl Into<String>) {
        let segments = split_path(path);
        let message = message.into();
        let _dispatch = self.dispatching();

        let sinks = {
            let state = self.lock();
            state
                .listeners
                .iter()
                .filter(|l| l.path.starts_with(&segments))
                .map(|l| l.sink.clone())
                .collect::<Vec<_>>()
        };

        debug!(path = %path, listeners = sinks.len(), "document listeners failed");
        for sink in sinks {
            sink.error(SourceError::new(message.clone()));
        }
    }

    /// Register a value listener; the current value is delivered before returning
    pub fn listen(&self, path: &str, sink: Sink<Value>) -> Subscription {
        let segments = split_path(path);
        let _dispatch = self.dispatching();

        let (id, current) = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            let current = node_at(&state.root, &segments)
                .cloned()
                .unwrap_or(Value::Null);
            state.listeners.push(Listener {
                id,
                path: segments,
                sink: sink.clone(),
            });
            (id, current)
        };

        sink.next(current);

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
                state.listeners.retain(|l| l.id != id);
            }
        })
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}
