use sdui_types::SourceError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback pair handed to a source on subscribe.
///
/// Sources may invoke it from any thread, so both callbacks are `Send + Sync`.
pub struct Sink<T> {
    on_next: Arc<dyn Fn(T) + Send + Sync>,
    on_error: Arc<dyn Fn(SourceError) + Send + Sync>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            on_next: Arc::clone(&self.on_next),
            on_error: Arc::clone(&self.on_error),
        }
    }
}

impl<T> Sink<T> {
    pub fn new<N, E>(on_next: N, on_error: E) -> Self
    where
        N: Fn(T) + Send + Sync + 'static,
        E: Fn(SourceError) + Send + Sync + 'static,
    {
        Self {
            on_next: Arc::new(on_next),
            on_error: Arc::new(on_error),
        }
    }

    pub fn next(&self, value: T) {
        (self.on_next)(value)
    }

    pub fn error(&self, error: SourceError) {
        (self.on_error)(error)
    }
}

/// Cancels an upstream subscription when dropped
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A push source: the one capability the engine needs from each collaborator.
///
/// Each emission replaces the previous value wholesale. Errors go to
/// `Sink::error` and never end the subscription by themselves.
pub trait Source<T>: Send + Sync {
    fn subscribe(&self, sink: Sink<T>) -> Subscription;
}

impl<T, S> Source<T> for Arc<S>
where
    S: Source<T> + ?Sized,
{
    fn subscribe(&self, sink: Sink<T>) -> Subscription {
        (**self).subscribe(sink)
    }
}

struct SubjectState<T> {
    next_id: u64,
    sinks: Vec<(u64, Sink<T>)>,
    latest: Option<T>,
    replay: bool,
}

/// Multicast push source driven by hand.
///
/// A replaying subject behaves like a realtime-store value listener: a new
/// subscriber is handed the current value right away.
pub struct Subject<T> {
    state: Arc<Mutex<SubjectState<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new() -> Self {
        Self::build(false)
    }

    pub fn replaying() -> Self {
        Self::build(true)
    }

    fn build(replay: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(SubjectState {
                next_id: 0,
                sinks: Vec::new(),
                latest: None,
                replay,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SubjectState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn emit(&self, value: T) {
        // Sinks are called outside the lock so they may take their own locks
        let sinks = {
            let mut state = self.lock();
            if state.replay {
                state.latest = Some(value.clone());
            }
            state.sinks.iter().map(|(_, s)| s.clone()).collect::<Vec<_>>()
        };
        for sink in sinks {
            sink.next(value.clone());
        }
    }

    pub fn fail(&self, error: SourceError) {
        let sinks = {
            let state = self.lock();
            state.sinks.iter().map(|(_, s)| s.clone()).collect::<Vec<_>>()
        };
        for sink in sinks {
            sink.error(error.clone());
        }
    }

    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().sinks.len()
    }
}

impl<T: Clone + Send + 'static> Source<T> for Subject<T> {
    fn subscribe(&self, sink: Sink<T>) -> Subscription {
        let (id, replay) = {
            let mut state = self.lock();
            let id = state.next_id;
            state.next_id += 1;
            state.sinks.push((id, sink.clone()));
            (id, state.latest.clone())
        };

        if let Some(value) = replay {
            sink.next(value);
        }

        let weak: Weak<Mutex<SubjectState<T>>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.sinks.retain(|(sid, _)| *sid != id);
            }
        })
    }
}
