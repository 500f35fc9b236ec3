//! Combine-latest behaviour of ViewModelEngine
//!
//! Drives the engine through hand-fed subjects and checks what observers see:
//! - nothing is published until every source has emitted
//! - empty item lists publish NotReady
//! - late observers get the latest state replayed
//! - the last observer leaving releases every upstream subscription

use sdui_engine::{
    EngineConfig, GridColumnsPolicy, ObserverHandle, Subject, ViewModelEngine, combine,
};
use sdui_types::{
    Item, LayoutMeta, LayoutVariant, Meta, RawLayoutDirectory, RawLayoutRecord, SourceError,
    ViewModel, ViewState,
};
use std::sync::{Arc, Mutex};
use std::thread;

struct World {
    items: Subject<Vec<Item>>,
    layout: Subject<RawLayoutDirectory>,
    meta: Subject<Meta>,
    engine: ViewModelEngine,
}

impl World {
    fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    fn with_config(config: EngineConfig) -> Self {
        let items = Subject::new();
        let layout = Subject::new();
        let meta = Subject::new();
        let engine =
            ViewModelEngine::with_config(items.clone(), layout.clone(), meta.clone(), config);
        Self {
            items,
            layout,
            meta,
            engine,
        }
    }

    fn observe(&self) -> (ObserverHandle, Arc<Mutex<Vec<ViewState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = self
            .engine
            .subscribe(move |state| sink.lock().unwrap().push(state));
        (handle, seen)
    }
}

fn item_a() -> Item {
    Item::new("1", "A", "d")
}

fn layout_of(entries: &[(&str, RawLayoutRecord)]) -> RawLayoutDirectory {
    entries
        .iter()
        .map(|(mode, record)| (mode.to_string(), record.clone()))
        .collect()
}

fn last(seen: &Arc<Mutex<Vec<ViewState>>>) -> ViewState {
    seen.lock().unwrap().last().cloned().expect("nothing published")
}

#[test]
fn test_empty_items_publish_not_ready() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.items.emit(Vec::new());
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::new("", false));

    assert_eq!(*seen.lock().unwrap(), vec![ViewState::NotReady]);
}

#[test]
fn test_grid_mode_publishes_view_model() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.items.emit(vec![item_a()]);
    world
        .layout
        .emit(layout_of(&[("grid-mode", RawLayoutRecord::grid(3))]));
    world.meta.emit(Meta::new("grid-mode", true));

    assert_eq!(
        last(&seen),
        ViewState::Ready(ViewModel {
            layout_meta: LayoutMeta {
                layout_variant: LayoutVariant::Grid { columns: 3 },
                favorites_enabled: true,
            },
            items: vec![item_a()],
        })
    );
}

#[test]
fn test_missing_mode_falls_back_to_list() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.items.emit(vec![item_a()]);
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::new("grid-mode", true));

    let state = last(&seen);
    let vm = state.view_model().unwrap();
    assert_eq!(vm.layout_meta.layout_variant, LayoutVariant::List);
    assert!(vm.layout_meta.favorites_enabled);
}

#[test]
fn test_layout_typo_does_not_break_pipeline() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.items.emit(vec![item_a()]);
    world
        .layout
        .emit(layout_of(&[("m", RawLayoutRecord::with_kind("gird"))]));
    world.meta.emit(Meta::new("m", false));

    let state = last(&seen);
    assert_eq!(
        state.view_model().unwrap().layout_meta.layout_variant,
        LayoutVariant::List
    );
}

#[test]
fn test_items_emptying_returns_to_not_ready() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.items.emit(vec![item_a()]);
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::default());
    assert!(last(&seen).is_ready());

    world.items.emit(Vec::new());
    assert_eq!(last(&seen), ViewState::NotReady);
}

#[test]
fn test_every_emission_recomputes() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.items.emit(vec![item_a()]);
    world.layout.emit(layout_of(&[
        ("grid-mode", RawLayoutRecord::grid(2)),
        ("list-mode", RawLayoutRecord::list()),
    ]));
    world.meta.emit(Meta::new("grid-mode", false));
    world.meta.emit(Meta::new("list-mode", false));
    world.meta.emit(Meta::new("list-mode", false));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    let variants: Vec<_> = seen
        .iter()
        .map(|s| s.view_model().unwrap().layout_meta.layout_variant)
        .collect();
    assert_eq!(
        variants,
        vec![
            LayoutVariant::Grid { columns: 2 },
            LayoutVariant::List,
            LayoutVariant::List
        ]
    );
}

#[test]
fn test_late_observer_gets_latest_state() {
    let world = World::new();
    let (_first, _) = world.observe();

    world.items.emit(vec![item_a()]);
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::new("x", true));
    world.items.emit(vec![item_a(), Item::new("2", "B", "e")]);

    let (_late, seen) = world.observe();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].view_model().unwrap().items.len(), 2);
}

#[test]
fn test_late_observer_before_any_publication_gets_nothing() {
    let world = World::new();
    let (_first, _) = world.observe();
    world.items.emit(vec![item_a()]);

    let (_late, seen) = world.observe();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_last_observer_releases_all_sources() {
    let world = World::new();
    let (a, _) = world.observe();
    let (b, _) = world.observe();

    a.unsubscribe();
    assert_eq!(world.items.subscriber_count(), 1);

    drop(b);
    assert_eq!(world.items.subscriber_count(), 0);
    assert_eq!(world.layout.subscriber_count(), 0);
    assert_eq!(world.meta.subscriber_count(), 0);
}

#[test]
fn test_restart_after_teardown_starts_empty() {
    let world = World::new();
    let (handle, _) = world.observe();
    world.items.emit(vec![item_a()]);
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::default());
    drop(handle);

    let (_handle, seen) = world.observe();
    assert!(seen.lock().unwrap().is_empty());

    // Only items re-emitted: the other two slots were cleared by teardown
    world.items.emit(vec![item_a()]);
    assert!(seen.lock().unwrap().is_empty());

    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::default());
    assert!(last(&seen).is_ready());
}

#[test]
fn test_replaying_sources_publish_on_subscribe() {
    let items = Subject::replaying();
    let layout = Subject::replaying();
    let meta = Subject::replaying();
    items.emit(vec![item_a()]);
    layout.emit(layout_of(&[("g", RawLayoutRecord::grid(4))]));
    meta.emit(Meta::new("g", false));

    let engine = combine(items, layout, meta);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _handle = engine.subscribe(move |state| sink.lock().unwrap().push(state));

    assert_eq!(
        last(&seen).view_model().unwrap().layout_meta.layout_variant,
        LayoutVariant::Grid { columns: 4 }
    );
}

#[test]
fn test_source_error_then_recovery() {
    let world = World::new();
    let (_handle, seen) = world.observe();
    world.items.emit(vec![item_a()]);
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::default());

    world.items.fail(SourceError::new("connection lost"));
    match last(&seen) {
        ViewState::Degraded { last_good, error } => {
            assert_eq!(last_good.unwrap().items, vec![item_a()]);
            assert_eq!(error.to_string(), "items source failed: connection lost");
        }
        other => panic!("expected degraded, got {:?}", other),
    }

    world.items.emit(vec![item_a()]);
    assert!(last(&seen).is_ready());
}

#[test]
fn test_error_before_ready_has_no_last_good() {
    let world = World::new();
    let (_handle, seen) = world.observe();

    world.layout.fail(SourceError::new("denied"));

    assert!(matches!(
        last(&seen),
        ViewState::Degraded {
            last_good: None,
            ..
        }
    ));
}

#[test]
fn test_reject_policy_reaches_projection() {
    let world = World::with_config(EngineConfig {
        grid_columns: GridColumnsPolicy::Reject,
    });
    let (_handle, seen) = world.observe();

    world.items.emit(vec![item_a()]);
    world
        .layout
        .emit(layout_of(&[("g", RawLayoutRecord::grid(0))]));
    world.meta.emit(Meta::new("g", false));

    assert_eq!(
        last(&seen).view_model().unwrap().layout_meta.layout_variant,
        LayoutVariant::List
    );
}

#[test]
fn test_concurrent_emissions_are_serialized() {
    let world = World::new();
    let (_handle, seen) = world.observe();
    world.layout.emit(RawLayoutDirectory::new());
    world.meta.emit(Meta::default());

    let mut workers = Vec::new();
    for worker in 0..4 {
        let items = world.items.clone();
        let meta = world.meta.clone();
        workers.push(thread::spawn(move || {
            for n in 0..50 {
                items.emit(vec![Item::new(format!("{}-{}", worker, n), "t", "d")]);
                meta.emit(Meta::new("m", n % 2 == 0));
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }

    let seen = seen.lock().unwrap();
    // Meta emissions only publish once items exist; every item emission publishes
    assert!(seen.len() >= 200);
    assert!(seen.iter().all(|s| s.is_ready()));
    assert_eq!(world.engine.current().as_ref(), seen.last());
}
