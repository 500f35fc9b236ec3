use crate::adapters::{items_source, layout_source, meta_source};
use crate::config::Config;
use crate::store::DocumentStore;
use sdui_engine::{ObserverHandle, ViewModelEngine, ViewStream};
use sdui_types::ViewState;
use tracing::info;

/// A document store wired to an engine through the configured nodes
pub struct Session {
    store: DocumentStore,
    engine: ViewModelEngine,
}

impl Session {
    pub fn open(store: DocumentStore, config: &Config) -> Self {
        let nodes = &config.nodes;
        let engine = ViewModelEngine::with_config(
            items_source(&store, &nodes.data),
            layout_source(&store, &nodes.layout),
            meta_source(&store, &nodes.meta),
            config.engine_config(),
        );

        info!(
            data = %nodes.data,
            layout = %nodes.layout,
            meta = %nodes.meta,
            "session opened"
        );
        Self { store, engine }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn engine(&self) -> &ViewModelEngine {
        &self.engine
    }

    pub fn subscribe<F>(&self, observer: F) -> ObserverHandle
    where
        F: FnMut(ViewState) + Send + 'static,
    {
        self.engine.subscribe(observer)
    }

    pub fn stream(&self) -> ViewStream {
        self.engine.stream()
    }

    /// Attach briefly and return what the engine publishes for the current tree
    pub fn resolve(&self) -> ViewState {
        let handle = self.engine.subscribe(|_| {});
        let state = self.engine.current().unwrap_or(ViewState::NotReady);
        handle.unsubscribe();
        state
    }
}
