//! End-to-end tests of machines running on a shared registry.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tickstate::runtime::{
    DeferredSpawner, HookFailure, InlineSpawner, IntervalClock, ManualClock, TokioSpawner,
};
use tickstate::{
    state_id, ClockConfig, Context, HookOrigin, HookResult, MachineError, MachineOptions, Registry,
    State, StateMachine, StateMachineBuilder, Transition,
};

state_id! {
    enum Stage {
        A,
        B,
    }
}

#[derive(Default)]
struct Counters {
    counter: u32,
    heartbeats: usize,
    enters: Vec<Stage>,
}

struct StageA;
struct StageB;
struct CounterReached;

impl State<Stage, Counters> for StageA {
    fn id(&self) -> Stage {
        Stage::A
    }

    fn transitions(&self) -> Vec<Box<dyn Transition<Stage, Counters>>> {
        vec![Box::new(CounterReached)]
    }

    fn on_enter(&self, ctx: &Context<Stage, Counters>) -> HookResult {
        ctx.data().lock().enters.push(Stage::A);
        Ok(())
    }

    fn on_heartbeat(&self, ctx: &Context<Stage, Counters>, _delta_time: f64) -> HookResult {
        ctx.data().lock().heartbeats += 1;
        Ok(())
    }
}

impl State<Stage, Counters> for StageB {
    fn id(&self) -> Stage {
        Stage::B
    }

    fn on_enter(&self, ctx: &Context<Stage, Counters>) -> HookResult {
        ctx.data().lock().enters.push(Stage::B);
        Ok(())
    }

    fn on_heartbeat(&self, ctx: &Context<Stage, Counters>, _delta_time: f64) -> HookResult {
        ctx.data().lock().heartbeats += 1;
        Ok(())
    }
}

impl Transition<Stage, Counters> for CounterReached {
    fn target(&self) -> Stage {
        Stage::B
    }

    fn on_heartbeat(&self, ctx: &Context<Stage, Counters>, delta_time: f64) -> bool {
        let mut data = ctx.data().lock();
        data.counter += delta_time as u32;
        data.counter >= 3
    }
}

fn manual_registry() -> (Registry, ManualClock) {
    let clock = ManualClock::new();
    let registry = Registry::new(Arc::new(clock.clone()), Arc::new(InlineSpawner));
    (registry, clock)
}

fn machine(registry: &Registry, manual: bool) -> StateMachine<Stage, Counters> {
    StateMachineBuilder::new()
        .initial(Stage::A)
        .state(StageA)
        .state(StageB)
        .manual_heartbeat(manual)
        .build(registry)
        .unwrap()
}

#[test]
fn counter_scenario_switches_on_third_heartbeat() {
    let (registry, clock) = manual_registry();
    let machine = machine(&registry, false);

    clock.advance(1.0);
    assert_eq!(machine.current_state(), Some(Stage::A));
    clock.advance(1.0);
    assert_eq!(machine.current_state(), Some(Stage::A));
    clock.advance(1.0);
    assert_eq!(machine.current_state(), Some(Stage::B));
    assert_eq!(machine.previous_state(), Some(Stage::A));
    assert_eq!(machine.data().lock().enters, vec![Stage::A, Stage::B]);
}

#[test]
fn destroyed_machine_no_longer_receives_ticks() {
    let (registry, clock) = manual_registry();
    let machine = machine(&registry, false);

    clock.advance(0.0);
    assert_eq!(machine.data().lock().heartbeats, 1);

    machine.destroy();
    clock.advance(0.0);
    registry.execute_heartbeat_events(0.0, false);

    assert_eq!(machine.data().lock().heartbeats, 1);
    assert!(!registry.contains(machine.id()));
}

#[test]
fn last_automatic_machine_tears_down_the_tick() {
    let (registry, clock) = manual_registry();
    let first = machine(&registry, false);
    let second = machine(&registry, false);
    assert_eq!(clock.subscriber_count(), 1);

    first.destroy();
    assert!(registry.is_ticking());
    second.destroy();
    assert!(!registry.is_ticking());
    assert_eq!(clock.subscriber_count(), 0);

    let third = machine(&registry, false);
    assert!(registry.is_ticking());
    clock.advance(0.0);
    assert_eq!(third.data().lock().heartbeats, 1);
}

#[test]
fn manual_machines_only_tick_explicitly() {
    let (registry, clock) = manual_registry();
    let automatic = machine(&registry, false);
    let manual = machine(&registry, true);

    clock.advance(1.0);
    clock.advance(1.0);
    assert_eq!(manual.data().lock().heartbeats, 0);
    assert_eq!(automatic.data().lock().heartbeats, 2);

    registry.execute_heartbeat_events(1.0, true);
    assert_eq!(manual.data().lock().heartbeats, 1);
    assert_eq!(automatic.data().lock().heartbeats, 2);

    manual.execute_heartbeat_event(1.0).unwrap();
    assert_eq!(manual.data().lock().heartbeats, 2);
}

#[test]
fn destroying_one_machine_leaves_the_other_ticking() {
    let (registry, clock) = manual_registry();
    let first = machine(&registry, false);
    let second = machine(&registry, false);

    clock.advance(1.0);
    first.destroy();
    clock.advance(1.0);
    clock.advance(1.0);

    assert_eq!(first.data().lock().heartbeats, 1);
    assert_eq!(second.data().lock().heartbeats, 3);
    assert_eq!(second.current_state(), Some(Stage::B));
}

#[test]
fn manual_only_registry_never_connects() {
    let (registry, clock) = manual_registry();
    let manual = machine(&registry, true);

    assert!(!registry.is_ticking());
    assert_eq!(clock.subscriber_count(), 0);

    manual.destroy();
    assert!(registry.is_empty());
}

#[test]
fn invalid_targets_leave_state_untouched() {
    let (registry, _clock) = manual_registry();
    let machine = StateMachineBuilder::<Stage, Counters>::new()
        .initial(Stage::A)
        .state(StageA)
        .manual_heartbeat(true)
        .build(&registry)
        .unwrap();

    assert!(matches!(
        machine.change_state(&Stage::B),
        Err(MachineError::InvalidStateReference { .. })
    ));
    assert_eq!(machine.current_state(), Some(Stage::A));
    assert_eq!(machine.previous_state(), Some(Stage::A));
}

#[test]
fn transition_to_unregistered_state_is_reported() {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&failures);
    let clock = ManualClock::new();
    let registry = Registry::with_error_sink(
        Arc::new(clock.clone()),
        Arc::new(InlineSpawner),
        Arc::new(move |failure: HookFailure| {
            store
                .lock()
                .push((failure.origin, failure.error.to_string()))
        }),
    );
    let machine = StateMachineBuilder::<Stage, Counters>::new()
        .initial(Stage::A)
        .state(StageA)
        .build(&registry)
        .unwrap();

    clock.advance(5.0);

    assert_eq!(machine.current_state(), Some(Stage::A));
    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, HookOrigin::Transition(0));
    assert!(failures[0].1.contains("'B'"));
}

#[test]
fn notifications_arrive_once_per_change() {
    let (registry, _clock) = manual_registry();
    let machine = machine(&registry, true);
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let connection = machine.state_changed().connect(move |event| {
        assert_eq!((event.new, event.old), (Stage::B, Stage::A));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    machine.change_state(&Stage::B).unwrap();
    connection.disconnect();
    machine.change_state(&Stage::A).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn construction_schedules_initial_entry() {
    let clock = ManualClock::new();
    let spawner = Arc::new(DeferredSpawner::new());
    let registry = Registry::new(Arc::new(clock), spawner.clone());
    let machine = machine(&registry, true);

    assert_eq!(machine.current_state(), Some(Stage::A));
    assert_eq!(machine.previous_state(), Some(Stage::A));
    assert!(machine.data().lock().enters.is_empty());

    spawner.run_pending();
    assert_eq!(machine.data().lock().enters, vec![Stage::A]);
}

#[test]
fn options_load_from_json() {
    let (registry, _clock) = manual_registry();
    let options = MachineOptions::from_json(r#"{"manual_heartbeat": true}"#).unwrap();
    let machine = StateMachine::new(
        &registry,
        Stage::A,
        vec![Box::new(StageA), Box::new(StageB)],
        options,
        Counters::default(),
    )
    .unwrap();

    assert!(machine.is_manual());
    assert!(!registry.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn tokio_runtime_drives_automatic_machines() {
    let handle = tokio::runtime::Handle::current();
    let clock = IntervalClock::new(ClockConfig { tick_rate_hz: 10.0 }, handle.clone()).unwrap();
    let registry = Registry::new(Arc::new(clock), Arc::new(TokioSpawner::new(handle)));
    let machine = machine(&registry, false);

    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = Mutex::new(Some(tx));
    machine.state_changed().connect(move |event| {
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send(event.new);
        }
    });

    // 0.1s frames truncate to zero in CounterReached; whole-second
    // heartbeats drive the switch.
    for _ in 0..3 {
        machine.execute_heartbeat_event(1.0).unwrap();
    }
    assert_eq!(rx.await.unwrap(), Stage::B);

    tokio::time::sleep(std::time::Duration::from_millis(350)).await;
    assert!(machine.data().lock().heartbeats >= 3);

    machine.destroy();
    assert!(!registry.is_ticking());
}
