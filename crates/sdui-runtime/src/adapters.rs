use crate::document::{decode_items, decode_layouts, decode_meta};
use crate::store::DocumentStore;
use sdui_engine::{Sink, Source, Subscription};
use sdui_types::{Item, Meta, RawLayoutDirectory, SourceError};
use serde_json::Value;

/// One watched node of the document store, decoded on every value event
pub struct NodeSource<T> {
    store: DocumentStore,
    path: String,
    decode: fn(&Value) -> T,
}

impl<T> NodeSource<T> {
    pub fn new(store: &DocumentStore, path: impl Into<String>, decode: fn(&Value) -> T) -> Self {
        Self {
            store: store.clone(),
            path: path.into(),
            decode,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<T: Send + 'static> Source<T> for NodeSource<T> {
    fn subscribe(&self, sink: Sink<T>) -> Subscription {
        let decode = self.decode;
        let errors = sink.clone();
        self.store.listen(
            &self.path,
            Sink::new(
                move |value: Value| sink.next(decode(&value)),
                move |error: SourceError| errors.error(error),
            ),
        )
    }
}

pub fn items_source(store: &DocumentStore, path: &str) -> NodeSource<Vec<Item>> {
    NodeSource::new(store, path, decode_items)
}

pub fn layout_source(store: &DocumentStore, path: &str) -> NodeSource<RawLayoutDirectory> {
    NodeSource::new(store, path, decode_layouts)
}

pub fn meta_source(store: &DocumentStore, path: &str) -> NodeSource<Meta> {
    NodeSource::new(store, path, decode_meta)
}
