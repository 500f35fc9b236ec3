// NOTE: Engine Architecture Rationale
//
// Why push-based sources with RAII subscriptions (not async streams in)?
// - Realtime document stores deliver value events through callbacks on threads they own
// - A Subscription guard makes "unsubscribe" impossible to forget and ties teardown to Drop
// - Async consumers still get a Stream out of the engine (see ViewStream)
//
// Why one mutex around the whole combine step?
// - The update is read-3-write-1-publish; splitting it lets two sources race
//   and publish a snapshot that mixes stale and fresh values
// - Observers are notified inside the same section, so they see publications in order
//
// Why fail-open parsing?
// - One malformed layout record must not take the whole screen down
// - Diagnostics go to tracing; the renderer never sees an error from the core

pub mod engine;
pub mod layout;
pub mod projection;
pub mod source;
pub mod stream;

pub use engine::{EngineConfig, ObserverHandle, ViewModelEngine, combine};
pub use layout::{
    GridColumnsPolicy, LayoutDiagnostic, ParsedLayout, inspect, parse, parse_directory, parse_with,
};
pub use projection::{project, resolve_layout};
pub use source::{Sink, Source, Subject, Subscription};
pub use stream::ViewStream;
