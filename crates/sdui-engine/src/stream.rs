use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use sdui_types::ViewState;
use tokio::sync::mpsc;

use crate::engine::{ObserverHandle, ViewModelEngine};

/// Async view of an engine's published states.
///
/// Holds an observer on the engine for as long as it lives; dropping the
/// stream detaches it. The stream ends when the engine is shut down.
pub struct ViewStream {
    receiver: mpsc::UnboundedReceiver<ViewState>,
    _handle: ObserverHandle,
}

impl ViewStream {
    pub(crate) fn attach(engine: &ViewModelEngine) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = engine.subscribe(move |state| {
            // Receiver gone means the stream is being dropped
            let _ = tx.send(state);
        });

        Self {
            receiver: rx,
            _handle: handle,
        }
    }

    /// Poll for the next state (non-blocking).
    ///
    /// Returns `None` if no state is available immediately.
    pub fn try_next(&mut self) -> Option<ViewState> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for ViewStream {
    type Item = ViewState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
