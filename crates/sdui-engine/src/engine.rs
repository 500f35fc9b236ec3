use crate::layout::{GridColumnsPolicy, parse_directory};
use crate::projection::project;
use crate::source::{Sink, Source, Subscription};
use crate::stream::ViewStream;
use sdui_types::{
    Item, LayoutDirectory, Meta, RawLayoutDirectory, SourceError, SourceKind, ViewModel, ViewState,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub grid_columns: GridColumnsPolicy,
}

type Observer = Box<dyn FnMut(ViewState) + Send>;

struct Sources {
    items: Box<dyn Source<Vec<Item>>>,
    layout: Box<dyn Source<RawLayoutDirectory>>,
    meta: Box<dyn Source<Meta>>,
}

/// The three upstream subscriptions, held and released as one unit
struct Upstream {
    _items: Subscription,
    _layout: Subscription,
    _meta: Subscription,
}

#[derive(Default)]
struct EngineState {
    /// Bumped on every teardown; emissions tagged with an older value are dropped
    generation: u64,
    upstream: Option<Upstream>,
    connecting: bool,

    items: Option<Vec<Item>>,
    layout: Option<LayoutDirectory>,
    meta: Option<Meta>,

    published: Option<ViewState>,
    last_good: Option<ViewModel>,

    next_observer: u64,
    observers: Vec<(u64, Observer)>,
}

impl EngineState {
    /// Combine-latest step: nothing until every slot has been filled once
    fn recompute(&self) -> Option<ViewState> {
        let (items, layout, meta) = match (&self.items, &self.layout, &self.meta) {
            (Some(items), Some(layout), Some(meta)) => (items, layout, meta),
            _ => return None,
        };

        if items.is_empty() {
            return Some(ViewState::NotReady);
        }
        Some(ViewState::Ready(project(items, layout, meta)))
    }

    fn publish(&mut self, next: ViewState) {
        match &next {
            ViewState::Ready(vm) => self.last_good = Some(vm.clone()),
            ViewState::NotReady => self.last_good = None,
            ViewState::Degraded { .. } => {}
        }

        for (_, observer) in self.observers.iter_mut() {
            observer(next.clone());
        }
        self.published = Some(next);
    }

    /// Forget everything learned from the current upstream
    fn reset(&mut self) -> Option<Upstream> {
        self.generation += 1;
        self.connecting = false;
        self.items = None;
        self.layout = None;
        self.meta = None;
        self.published = None;
        self.last_good = None;
        self.upstream.take()
    }
}

struct Shared {
    sources: Sources,
    config: EngineConfig,
    state: Mutex<EngineState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply<F>(&self, generation: u64, kind: SourceKind, update: F)
    where
        F: FnOnce(&mut EngineState),
    {
        let mut state = self.lock();
        if state.generation != generation {
            trace!(source = %kind, "dropping emission from released upstream");
            return;
        }

        update(&mut state);
        match state.recompute() {
            Some(next) => {
                debug!(source = %kind, ready = next.is_ready(), "publishing view state");
                state.publish(next);
            }
            None => trace!(source = %kind, "waiting for remaining sources"),
        }
    }

    fn fail(&self, generation: u64, kind: SourceKind, error: SourceError) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }

        let error = error.with_source(kind);
        warn!(source = %kind, error = %error.message, "source reported an error");
        let next = ViewState::Degraded {
            last_good: state.last_good.clone(),
            error,
        };
        state.publish(next);
    }

    fn sink<T, F>(self: &Arc<Self>, generation: u64, kind: SourceKind, store: F) -> Sink<T>
    where
        T: Send + 'static,
        F: Fn(&mut EngineState, T) + Send + Sync + 'static,
    {
        let on_next = {
            let weak = Arc::downgrade(self);
            move |value: T| {
                if let Some(shared) = weak.upgrade() {
                    shared.apply(generation, kind, |state| store(state, value));
                }
            }
        };
        let on_error = {
            let weak = Arc::downgrade(self);
            move |error: SourceError| {
                if let Some(shared) = weak.upgrade() {
                    shared.fail(generation, kind, error);
                }
            }
        };
        Sink::new(on_next, on_error)
    }

    /// Subscribe to all three sources.
    ///
    /// Runs without the state lock held: sources are free to deliver their
    /// current value synchronously from inside `subscribe`.
    fn connect(self: &Arc<Self>, generation: u64) {
        debug!(generation, "connecting upstream sources");
        let policy = self.config.grid_columns;

        let upstream = Upstream {
            _items: self.sources.items.subscribe(self.sink(
                generation,
                SourceKind::Items,
                |state, items: Vec<Item>| state.items = Some(items),
            )),
            _layout: self.sources.layout.subscribe(self.sink(
                generation,
                SourceKind::Layout,
                move |state, raw: RawLayoutDirectory| {
                    state.layout = Some(parse_directory(&raw, policy))
                },
            )),
            _meta: self.sources.meta.subscribe(self.sink(
                generation,
                SourceKind::Meta,
                |state, meta: Meta| state.meta = Some(meta),
            )),
        };

        let stale = {
            let mut state = self.lock();
            if state.generation == generation && !state.observers.is_empty() {
                state.upstream = Some(upstream);
                state.connecting = false;
                None
            } else {
                Some(upstream)
            }
        };

        if stale.is_some() {
            debug!(generation, "observers left while connecting, releasing upstream");
        }
    }

    fn detach(&self, id: u64) {
        let (released, observer) = {
            let mut state = self.lock();
            let Some(index) = state.observers.iter().position(|(oid, _)| *oid == id) else {
                return;
            };
            let (_, observer) = state.observers.remove(index);
            let released = if state.observers.is_empty() {
                state.reset()
            } else {
                None
            };
            (released, observer)
        };

        drop(observer);
        if released.is_some() {
            debug!("last observer left, released upstream sources");
        }
    }
}

/// Joins the item, layout and meta sources into one published [`ViewState`].
///
/// Upstream sources are subscribed when the first observer attaches and
/// released when the last one leaves. A new observer is immediately handed the
/// most recently published state, if there is one.
///
/// Observers run inside the engine's critical section: they must not call
/// back into the same engine synchronously. Use [`ViewModelEngine::stream`]
/// to consume states from async code instead.
#[derive(Clone)]
pub struct ViewModelEngine {
    shared: Arc<Shared>,
}

impl ViewModelEngine {
    pub fn new<I, L, M>(items: I, layout: L, meta: M) -> Self
    where
        I: Source<Vec<Item>> + 'static,
        L: Source<RawLayoutDirectory> + 'static,
        M: Source<Meta> + 'static,
    {
        Self::with_config(items, layout, meta, EngineConfig::default())
    }

    pub fn with_config<I, L, M>(items: I, layout: L, meta: M, config: EngineConfig) -> Self
    where
        I: Source<Vec<Item>> + 'static,
        L: Source<RawLayoutDirectory> + 'static,
        M: Source<Meta> + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                sources: Sources {
                    items: Box::new(items),
                    layout: Box::new(layout),
                    meta: Box::new(meta),
                },
                config,
                state: Mutex::new(EngineState::default()),
            }),
        }
    }

    pub fn config(&self) -> EngineConfig {
        self.shared.config
    }

    pub fn subscribe<F>(&self, observer: F) -> ObserverHandle
    where
        F: FnMut(ViewState) + Send + 'static,
    {
        let mut observer: Observer = Box::new(observer);

        let (id, connect) = {
            let mut state = self.shared.lock();
            if let Some(current) = &state.published {
                observer(current.clone());
            }

            let id = state.next_observer;
            state.next_observer += 1;
            state.observers.push((id, observer));

            let connect = state.upstream.is_none() && !state.connecting;
            if connect {
                state.connecting = true;
            }
            (id, connect.then_some(state.generation))
        };

        if let Some(generation) = connect {
            self.shared.connect(generation);
        }

        ObserverHandle {
            shared: Arc::clone(&self.shared),
            id: Some(id),
        }
    }

    /// Published states as an async stream
    pub fn stream(&self) -> ViewStream {
        ViewStream::attach(self)
    }

    /// The most recently published state, `None` until the first publication
    pub fn current(&self) -> Option<ViewState> {
        self.shared.lock().published.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.shared.lock().observers.len()
    }

    /// Whether upstream sources are currently subscribed
    pub fn is_active(&self) -> bool {
        self.shared.lock().upstream.is_some()
    }

    /// Detach every observer and release upstream.
    ///
    /// Outstanding [`ObserverHandle`]s become inert. A later `subscribe`
    /// starts again from an empty state.
    pub fn shutdown(&self) {
        let (released, observers) = {
            let mut state = self.shared.lock();
            let observers = std::mem::take(&mut state.observers);
            (state.reset(), observers)
        };

        debug!(
            observers = observers.len(),
            upstream = released.is_some(),
            "engine shut down"
        );
        drop(observers);
        drop(released);
    }
}

/// Combine three sources with the default configuration
pub fn combine<I, L, M>(items: I, layout: L, meta: M) -> ViewModelEngine
where
    I: Source<Vec<Item>> + 'static,
    L: Source<RawLayoutDirectory> + 'static,
    M: Source<Meta> + 'static,
{
    ViewModelEngine::new(items, layout, meta)
}

/// Keeps an observer attached; dropping it detaches the observer
#[must_use = "dropping an ObserverHandle detaches the observer"]
pub struct ObserverHandle {
    shared: Arc<Shared>,
    id: Option<u64>,
}

impl ObserverHandle {
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(id) = self.id.take() {
            self.shared.detach(id);
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Subject;
    use sdui_types::{LayoutVariant, RawLayoutRecord};

    struct Harness {
        items: Subject<Vec<Item>>,
        layout: Subject<RawLayoutDirectory>,
        meta: Subject<Meta>,
        engine: ViewModelEngine,
    }

    impl Harness {
        fn new() -> Self {
            let items = Subject::new();
            let layout = Subject::new();
            let meta = Subject::new();
            let engine = ViewModelEngine::new(items.clone(), layout.clone(), meta.clone());
            Self {
                items,
                layout,
                meta,
                engine,
            }
        }

        fn record(&self) -> (ObserverHandle, Arc<Mutex<Vec<ViewState>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let handle = self
                .engine
                .subscribe(move |state| sink.lock().unwrap().push(state));
            (handle, seen)
        }
    }

    fn grid_layout() -> RawLayoutDirectory {
        [("grid-mode".to_string(), RawLayoutRecord::grid(3))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_no_upstream_until_first_observer() {
        let h = Harness::new();
        assert!(!h.engine.is_active());
        assert_eq!(h.items.subscriber_count(), 0);

        let (_handle, _) = h.record();

        assert!(h.engine.is_active());
        assert_eq!(h.items.subscriber_count(), 1);
        assert_eq!(h.layout.subscriber_count(), 1);
        assert_eq!(h.meta.subscriber_count(), 1);
    }

    #[test]
    fn test_second_observer_shares_upstream() {
        let h = Harness::new();
        let (_a, _) = h.record();
        let (_b, _) = h.record();

        assert_eq!(h.engine.observer_count(), 2);
        assert_eq!(h.items.subscriber_count(), 1);
    }

    #[test]
    fn test_waits_for_all_three_sources() {
        let h = Harness::new();
        let (_handle, seen) = h.record();

        h.items.emit(vec![Item::new("1", "A", "d")]);
        h.meta.emit(Meta::new("grid-mode", true));
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(h.engine.current(), None);

        h.layout.emit(grid_layout());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let vm = seen[0].view_model().unwrap();
        assert_eq!(vm.layout_meta.layout_variant, LayoutVariant::Grid { columns: 3 });
    }

    #[test]
    fn test_error_publishes_degraded_with_last_good() {
        let h = Harness::new();
        let (_handle, seen) = h.record();
        h.items.emit(vec![Item::new("1", "A", "d")]);
        h.layout.emit(grid_layout());
        h.meta.emit(Meta::new("grid-mode", false));

        h.meta.fail(SourceError::new("permission denied"));

        let last = seen.lock().unwrap().last().cloned().unwrap();
        match last {
            ViewState::Degraded { last_good, error } => {
                assert_eq!(error.source, Some(SourceKind::Meta));
                assert_eq!(last_good.map(|vm| vm.items.len()), Some(1));
            }
            other => panic!("expected degraded, got {:?}", other),
        }
    }

    #[test]
    fn test_teardown_resets_state() {
        let h = Harness::new();
        let (handle, _) = h.record();
        h.items.emit(vec![Item::new("1", "A", "d")]);
        h.layout.emit(grid_layout());
        h.meta.emit(Meta::new("grid-mode", false));
        assert!(h.engine.current().is_some());

        drop(handle);

        assert!(!h.engine.is_active());
        assert_eq!(h.engine.current(), None);
        assert_eq!(h.items.subscriber_count(), 0);
        assert_eq!(h.layout.subscriber_count(), 0);
        assert_eq!(h.meta.subscriber_count(), 0);
    }

    #[test]
    fn test_shutdown_detaches_everyone() {
        let h = Harness::new();
        let (handle, _) = h.record();

        h.engine.shutdown();

        assert_eq!(h.engine.observer_count(), 0);
        assert!(!h.engine.is_active());
        assert_eq!(h.meta.subscriber_count(), 0);

        // Dropping a handle after shutdown is a no-op
        drop(handle);
        assert_eq!(h.engine.observer_count(), 0);
    }
}
