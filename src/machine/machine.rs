//! State machine that drives lifecycle hooks from a shared heartbeat.

use crate::config::MachineOptions;
use crate::core::{Context, HookKind, HookOrigin, HookResult, Shared, State, StateId, Transition};
use crate::machine::error::MachineError;
use crate::machine::event::StateChanged;
use crate::machine::registry::{Heartbeat, Registry};
use crate::runtime::{ErrorSink, HookFailure, Spawner};
use crate::signal::Signal;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Identity of one machine inside a [`Registry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineId(Uuid);

impl MachineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MachineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type TransitionHook<K, T> = fn(&dyn Transition<K, T>, &Context<K, T>) -> HookResult;

struct StateEntry<K: StateId, T> {
    id: K,
    state: Box<dyn State<K, T>>,
    transitions: Vec<Box<dyn Transition<K, T>>>,
}

struct StateTable<K: StateId, T> {
    order: Vec<K>,
    entries: HashMap<K, Arc<StateEntry<K, T>>>,
}

impl<K: StateId, T> Default for StateTable<K, T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }
}

struct Cursor<K: StateId, T> {
    current: Arc<StateEntry<K, T>>,
    previous: Arc<StateEntry<K, T>>,
}

pub(crate) struct Machine<K: StateId, T> {
    id: MachineId,
    manual_heartbeat: bool,
    data: Shared<T>,
    table: RwLock<StateTable<K, T>>,
    cursor: Mutex<Option<Cursor<K, T>>>,
    destroyed: AtomicBool,
    state_changed: Signal<StateChanged<K>>,
    spawner: Arc<dyn Spawner>,
    sink: Arc<dyn ErrorSink>,
    registry: Registry,
    this: Weak<Self>,
}

impl<K: StateId, T: Send + 'static> Machine<K, T> {
    fn launch(
        registry: &Registry,
        initial: K,
        states: Vec<Box<dyn State<K, T>>>,
        options: MachineOptions,
        data: T,
        spawner: Arc<dyn Spawner>,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Arc<Self>, MachineError> {
        let mut seen = HashSet::new();
        for state in &states {
            let id = state.id();
            if !seen.insert(id.clone()) {
                return Err(MachineError::DuplicateState {
                    state: id.name().to_string(),
                });
            }
        }
        if !seen.contains(&initial) {
            return Err(MachineError::unknown_initial(&initial));
        }

        let machine = Arc::new_cyclic(|this| Self {
            id: MachineId::new(),
            manual_heartbeat: options.manual_heartbeat,
            data: Shared::new(data),
            table: RwLock::new(StateTable::default()),
            cursor: Mutex::new(None),
            destroyed: AtomicBool::new(false),
            state_changed: Signal::new(),
            spawner,
            sink,
            registry: registry.clone(),
            this: Weak::clone(this),
        });

        // No state hook is scheduled until every transition init succeeded.
        let ctx = machine.context();
        let mut table = StateTable::default();
        for state in states {
            let id = state.id();
            let transitions = state.transitions();
            for (index, transition) in transitions.iter().enumerate() {
                transition
                    .on_init(&ctx)
                    .map_err(|source| MachineError::TransitionInit {
                        state: id.name().to_string(),
                        index,
                        source: source.into(),
                    })?;
            }

            table.order.push(id.clone());
            table.entries.insert(
                id.clone(),
                Arc::new(StateEntry {
                    id,
                    state,
                    transitions,
                }),
            );
        }

        let entry = table
            .entries
            .get(&initial)
            .cloned()
            .ok_or_else(|| MachineError::unknown_initial(&initial))?;
        let inits: Vec<_> = table
            .order
            .iter()
            .filter_map(|id| table.entries.get(id).cloned())
            .collect();
        *machine.table.write() = table;
        *machine.cursor.lock() = Some(Cursor {
            current: Arc::clone(&entry),
            previous: Arc::clone(&entry),
        });

        for state in &inits {
            machine.schedule_state_hook(state, HookKind::Init, |state, ctx| state.on_init(ctx));
        }

        // The initial entry is a change from the initial state to itself
        // with the guard skipped.
        machine.schedule_state_hook(&entry, HookKind::Leave, |state, ctx| state.on_leave(ctx));
        machine.schedule_transition_hooks(&entry, HookKind::Leave, |t, ctx| t.on_leave(ctx));
        machine.schedule_state_hook(&entry, HookKind::Enter, |state, ctx| state.on_enter(ctx));
        machine.schedule_transition_hooks(&entry, HookKind::Enter, |t, ctx| t.on_enter(ctx));
        machine
            .state_changed
            .fire(&StateChanged::new(initial.clone(), initial.clone()));

        debug!(
            machine = %machine.id,
            initial = initial.name(),
            manual = machine.manual_heartbeat,
            "state machine started"
        );

        let heartbeat: Arc<dyn Heartbeat> = machine.clone();
        registry.register(heartbeat);
        Ok(machine)
    }

    fn context(&self) -> Context<K, T> {
        Context::new(self.data.clone(), Weak::clone(&self.this), self.id)
    }

    fn current_entry(&self) -> Result<Arc<StateEntry<K, T>>, MachineError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(MachineError::Destroyed);
        }
        self.cursor
            .lock()
            .as_ref()
            .map(|cursor| Arc::clone(&cursor.current))
            .ok_or(MachineError::Initializing)
    }

    pub(crate) fn current_state(&self) -> Option<K> {
        self.cursor.lock().as_ref().map(|c| c.current.id.clone())
    }

    pub(crate) fn previous_state(&self) -> Option<K> {
        self.cursor.lock().as_ref().map(|c| c.previous.id.clone())
    }

    pub(crate) fn change_state(&self, target: &K) -> Result<bool, MachineError> {
        let current = self.current_entry()?;
        let next = self.table.read().entries.get(target).cloned();
        let next = next.ok_or_else(|| MachineError::InvalidStateReference {
            from: current.id.name().to_string(),
            target: target.name().to_string(),
        })?;
        self.switch(current, next)
    }

    pub(crate) fn change_state_to_named(&self, name: &str) -> Result<bool, MachineError> {
        let current = self.current_entry()?;
        let next = self
            .table
            .read()
            .entries
            .values()
            .find(|entry| entry.id.name() == name)
            .cloned();
        let next = next.ok_or_else(|| MachineError::InvalidStateReference {
            from: current.id.name().to_string(),
            target: name.to_string(),
        })?;
        self.switch(current, next)
    }

    fn switch(
        &self,
        current: Arc<StateEntry<K, T>>,
        next: Arc<StateEntry<K, T>>,
    ) -> Result<bool, MachineError> {
        if !current.state.can_change_state(&self.context(), &next.id) {
            debug!(
                machine = %self.id,
                from = current.id.name(),
                to = next.id.name(),
                "state change refused"
            );
            return Ok(false);
        }

        let old = {
            let mut guard = self.cursor.lock();
            let cursor = guard.as_mut().ok_or(MachineError::Destroyed)?;
            cursor.previous = std::mem::replace(&mut cursor.current, Arc::clone(&next));
            Arc::clone(&cursor.previous)
        };

        self.schedule_state_hook(&old, HookKind::Leave, |state, ctx| state.on_leave(ctx));
        self.schedule_transition_hooks(&old, HookKind::Leave, |t, ctx| t.on_leave(ctx));
        self.schedule_state_hook(&next, HookKind::Enter, |state, ctx| state.on_enter(ctx));
        self.schedule_transition_hooks(&next, HookKind::Enter, |t, ctx| t.on_enter(ctx));

        debug!(
            machine = %self.id,
            from = old.id.name(),
            to = next.id.name(),
            "state changed"
        );
        self.state_changed
            .fire(&StateChanged::new(next.id.clone(), old.id.clone()));
        Ok(true)
    }

    /// Schedule the current state's heartbeat, then evaluate its transitions
    /// in order. The first transition that fires switches state and ends the
    /// pass for this tick.
    pub(crate) fn execute_heartbeat_event(&self, delta_time: f64) -> Result<(), MachineError> {
        self.heartbeat(delta_time).map_err(|(_, error)| error)
    }

    /// Like `execute_heartbeat_event`, but a failure also names where it
    /// came from: the state itself, or the transition whose switch failed.
    fn heartbeat(&self, delta_time: f64) -> Result<(), (HookOrigin, MachineError)> {
        let current = self
            .current_entry()
            .map_err(|error| (HookOrigin::State, error))?;
        trace!(
            machine = %self.id,
            state = current.id.name(),
            delta_time,
            "heartbeat"
        );

        self.schedule_state_hook(&current, HookKind::Heartbeat, move |state, ctx| {
            state.on_heartbeat(ctx, delta_time)
        });

        let ctx = self.context();
        let fired = current
            .transitions
            .iter()
            .enumerate()
            .find(|(_, transition)| transition.on_heartbeat(&ctx, delta_time));
        if let Some((index, transition)) = fired {
            self.change_state(&transition.target())
                .map_err(|error| (HookOrigin::Transition(index), error))?;
        }
        Ok(())
    }

    pub(crate) fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.registry.unregister(self.id);

        let table = std::mem::take(&mut *self.table.write());
        self.cursor.lock().take();
        for id in &table.order {
            if let Some(entry) = table.entries.get(id) {
                self.schedule_state_hook(entry, HookKind::Destroy, |state, ctx| {
                    state.on_destroy(ctx)
                });
                self.schedule_transition_hooks(entry, HookKind::Destroy, |t, ctx| {
                    t.on_destroy(ctx)
                });
            }
        }

        self.state_changed.destroy();
        debug!(machine = %self.id, "state machine destroyed");
    }

    fn schedule_state_hook<F>(&self, entry: &Arc<StateEntry<K, T>>, hook: HookKind, run: F)
    where
        F: FnOnce(&dyn State<K, T>, &Context<K, T>) -> HookResult + Send + 'static,
    {
        let entry = Arc::clone(entry);
        let ctx = self.context();
        let sink = Arc::clone(&self.sink);
        let machine = self.id;
        self.spawner.spawn(Box::new(move || {
            if let Err(error) = run(&*entry.state, &ctx) {
                sink.report(HookFailure {
                    machine,
                    state: entry.id.name().to_string(),
                    origin: HookOrigin::State,
                    hook,
                    error,
                });
            }
        }));
    }

    fn schedule_transition_hooks(
        &self,
        entry: &Arc<StateEntry<K, T>>,
        hook: HookKind,
        run: TransitionHook<K, T>,
    ) {
        for index in 0..entry.transitions.len() {
            let entry = Arc::clone(entry);
            let ctx = self.context();
            let sink = Arc::clone(&self.sink);
            let machine = self.id;
            self.spawner.spawn(Box::new(move || {
                if let Err(error) = run(&*entry.transitions[index], &ctx) {
                    sink.report(HookFailure {
                        machine,
                        state: entry.id.name().to_string(),
                        origin: HookOrigin::Transition(index),
                        hook,
                        error,
                    });
                }
            }));
        }
    }
}

impl<K: StateId, T: Send + 'static> Heartbeat for Machine<K, T> {
    fn machine_id(&self) -> MachineId {
        self.id
    }

    fn is_manual(&self) -> bool {
        self.manual_heartbeat
    }

    fn pulse(&self, delta_time: f64) {
        if let Err((origin, error)) = self.heartbeat(delta_time) {
            warn!(machine = %self.id, ?origin, %error, "heartbeat failed");
            self.sink.report(HookFailure {
                machine: self.id,
                state: self
                    .current_state()
                    .map(|id| id.name().to_string())
                    .unwrap_or_default(),
                origin,
                hook: HookKind::Heartbeat,
                error: error.into(),
            });
        }
    }
}

/// A finite state machine whose states and transitions run on a shared
/// heartbeat.
///
/// Every state is instantiated once, at construction, and kept until
/// [`destroy`](StateMachine::destroy). The machine joins its [`Registry`]
/// on construction; automatic machines are then ticked by the registry's
/// clock, manual ones only through
/// [`execute_heartbeat_event`](StateMachine::execute_heartbeat_event) or a
/// manual registry pass.
///
/// Handles are cheap to clone. Dropping every handle does not remove the
/// machine from its registry; call `destroy` for that.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tickstate::runtime::{InlineSpawner, ManualClock};
/// use tickstate::{state_id, Context, MachineOptions, Registry, State, StateMachine, Transition};
///
/// state_id! {
///     pub enum Door {
///         Closed,
///         Open,
///     }
/// }
///
/// struct Closed;
/// struct Open;
/// struct Push;
///
/// impl State<Door, bool> for Closed {
///     fn id(&self) -> Door {
///         Door::Closed
///     }
///
///     fn transitions(&self) -> Vec<Box<dyn Transition<Door, bool>>> {
///         vec![Box::new(Push)]
///     }
/// }
///
/// impl State<Door, bool> for Open {
///     fn id(&self) -> Door {
///         Door::Open
///     }
/// }
///
/// impl Transition<Door, bool> for Push {
///     fn target(&self) -> Door {
///         Door::Open
///     }
///
///     fn on_heartbeat(&self, ctx: &Context<Door, bool>, _delta_time: f64) -> bool {
///         *ctx.data().lock()
///     }
/// }
///
/// let clock = ManualClock::new();
/// let registry = Registry::new(Arc::new(clock.clone()), Arc::new(InlineSpawner));
/// let door = StateMachine::new(
///     &registry,
///     Door::Closed,
///     vec![Box::new(Closed), Box::new(Open)],
///     MachineOptions::default(),
///     false,
/// )
/// .unwrap();
///
/// clock.advance(0.016);
/// assert_eq!(door.current_state(), Some(Door::Closed));
///
/// *door.data().lock() = true;
/// clock.advance(0.016);
/// assert_eq!(door.current_state(), Some(Door::Open));
///
/// door.destroy();
/// ```
pub struct StateMachine<K: StateId, T> {
    inner: Arc<Machine<K, T>>,
}

impl<K: StateId, T: Send + 'static> StateMachine<K, T> {
    /// Build a machine using the registry's spawner and error sink.
    pub fn new(
        registry: &Registry,
        initial: K,
        states: Vec<Box<dyn State<K, T>>>,
        options: MachineOptions,
        data: T,
    ) -> Result<Self, MachineError> {
        Self::with_runtime(
            registry,
            initial,
            states,
            options,
            data,
            registry.spawner(),
            registry.error_sink(),
        )
    }

    /// Build a machine with its own spawner and error sink.
    pub fn with_runtime(
        registry: &Registry,
        initial: K,
        states: Vec<Box<dyn State<K, T>>>,
        options: MachineOptions,
        data: T,
        spawner: Arc<dyn Spawner>,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self, MachineError> {
        let inner = Machine::launch(registry, initial, states, options, data, spawner, sink)?;
        Ok(Self { inner })
    }

    pub fn id(&self) -> MachineId {
        self.inner.id
    }

    pub fn is_manual(&self) -> bool {
        self.inner.manual_heartbeat
    }

    /// The payload shared by every state and transition.
    pub fn data(&self) -> &Shared<T> {
        &self.inner.data
    }

    /// Fires `(new, old)` after every successful state change.
    ///
    /// The notification fires once the change's hooks are scheduled. With a
    /// spawner that runs tasks immediately, such as
    /// [`InlineSpawner`](crate::runtime::InlineSpawner), an `on_enter` that
    /// changes state again fires its own notification first, so the last
    /// event received is not necessarily the current state. Read
    /// [`current_state`](Self::current_state) rather than the latest event
    /// when that matters.
    pub fn state_changed(&self) -> &Signal<StateChanged<K>> {
        &self.inner.state_changed
    }

    /// `None` once the machine is destroyed.
    pub fn current_state(&self) -> Option<K> {
        self.inner.current_state()
    }

    /// `None` once the machine is destroyed.
    pub fn previous_state(&self) -> Option<K> {
        self.inner.previous_state()
    }

    /// Registered states in declaration order.
    pub fn states(&self) -> Vec<K> {
        self.inner.table.read().order.clone()
    }

    /// Switch to `target`.
    ///
    /// Returns `Ok(false)` if the current state's guard refused, in which
    /// case nothing was scheduled and no notification fired.
    pub fn change_state(&self, target: &K) -> Result<bool, MachineError> {
        self.inner.change_state(target)
    }

    /// Switch to the registered state whose [`StateId::name`] is `name`.
    pub fn change_state_to_named(&self, name: &str) -> Result<bool, MachineError> {
        self.inner.change_state_to_named(name)
    }

    /// Run one heartbeat on this machine regardless of its manual flag.
    pub fn execute_heartbeat_event(&self, delta_time: f64) -> Result<(), MachineError> {
        self.inner.execute_heartbeat_event(delta_time)
    }

    /// Leave the registry and schedule `on_destroy` on every state and
    /// transition. Idempotent.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }
}

impl<K: StateId, T> Clone for StateMachine<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: StateId, T> fmt::Debug for StateMachine<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self
            .inner
            .cursor
            .lock()
            .as_ref()
            .map(|c| c.current.id.clone());
        f.debug_struct("StateMachine")
            .field("id", &self.inner.id)
            .field("manual_heartbeat", &self.inner.manual_heartbeat)
            .field("current", &current)
            .finish()
    }
}
