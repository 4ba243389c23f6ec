//! Registry of live machines and the shared heartbeat they run on.

use crate::machine::machine::MachineId;
use crate::runtime::{log_hook_failure, ErrorSink, Spawner, TickConnection, TickSource};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// What the registry needs from a machine, independent of its state and
/// payload types.
pub(crate) trait Heartbeat: Send + Sync {
    fn machine_id(&self) -> MachineId;
    fn is_manual(&self) -> bool;
    fn pulse(&self, delta_time: f64);
}

/// Which machines a heartbeat pass visits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartbeatFilter {
    All,
    ManualOnly,
    AutomaticOnly,
}

impl HeartbeatFilter {
    pub fn admits(&self, manual: bool) -> bool {
        match self {
            Self::All => true,
            Self::ManualOnly => manual,
            Self::AutomaticOnly => !manual,
        }
    }
}

struct Members {
    machines: Vec<Arc<dyn Heartbeat>>,
    connection: Option<TickConnection>,
}

struct Inner {
    clock: Arc<dyn TickSource>,
    spawner: Arc<dyn Spawner>,
    sink: Arc<dyn ErrorSink>,
    members: Mutex<Members>,
}

/// Ordered collection of live machines sharing one tick subscription.
///
/// A machine joins on construction and leaves on destroy. The registry
/// subscribes to its [`TickSource`] when the first automatic machine joins
/// and drops the subscription as soon as no automatic machine is left, so
/// an idle registry costs nothing per frame.
///
/// Access is expected from one cooperative execution context at a time;
/// the internal lock is never held while a machine runs.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<Inner>,
}

impl Registry {
    /// A registry whose machines report hook failures through
    /// [`log_hook_failure`].
    pub fn new(clock: Arc<dyn TickSource>, spawner: Arc<dyn Spawner>) -> Self {
        Self::with_error_sink(clock, spawner, Arc::new(log_hook_failure))
    }

    pub fn with_error_sink(
        clock: Arc<dyn TickSource>,
        spawner: Arc<dyn Spawner>,
        sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock,
                spawner,
                sink,
                members: Mutex::new(Members {
                    machines: Vec::new(),
                    connection: None,
                }),
            }),
        }
    }

    /// Default spawner for machines built on this registry.
    pub fn spawner(&self) -> Arc<dyn Spawner> {
        Arc::clone(&self.inner.spawner)
    }

    /// Default error sink for machines built on this registry.
    pub fn error_sink(&self) -> Arc<dyn ErrorSink> {
        Arc::clone(&self.inner.sink)
    }

    pub fn len(&self) -> usize {
        self.inner.members.lock().machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: MachineId) -> bool {
        self.inner
            .members
            .lock()
            .machines
            .iter()
            .any(|machine| machine.machine_id() == id)
    }

    /// Whether the registry currently holds a tick subscription.
    pub fn is_ticking(&self) -> bool {
        self.inner.members.lock().connection.is_some()
    }

    /// Tick registered machines in registration order.
    ///
    /// With `only_manual` set, automatic machines are skipped; this is how
    /// a host drives its manual machines once per frame.
    pub fn execute_heartbeat_events(&self, delta_time: f64, only_manual: bool) {
        let filter = if only_manual {
            HeartbeatFilter::ManualOnly
        } else {
            HeartbeatFilter::All
        };
        self.run_heartbeat_pass(delta_time, filter);
    }

    /// Tick every registered machine admitted by `filter`.
    ///
    /// The member list is snapshotted first, so machines created or
    /// destroyed by a hook during the pass take effect on the next one.
    pub fn run_heartbeat_pass(&self, delta_time: f64, filter: HeartbeatFilter) {
        let machines: Vec<Arc<dyn Heartbeat>> = self
            .inner
            .members
            .lock()
            .machines
            .iter()
            .filter(|machine| filter.admits(machine.is_manual()))
            .cloned()
            .collect();

        trace!(delta_time, ?filter, machines = machines.len(), "heartbeat pass");
        for machine in machines {
            if self.contains(machine.machine_id()) {
                machine.pulse(delta_time);
            }
        }
    }

    pub(crate) fn register(&self, machine: Arc<dyn Heartbeat>) {
        let mut members = self.inner.members.lock();
        let automatic = !machine.is_manual();
        members.machines.push(machine);

        if automatic && members.connection.is_none() {
            let registry: Weak<Inner> = Arc::downgrade(&self.inner);
            let connection = self.inner.clock.connect(Arc::new(move |delta_time: f64| {
                if let Some(inner) = registry.upgrade() {
                    Registry { inner }
                        .run_heartbeat_pass(delta_time, HeartbeatFilter::AutomaticOnly);
                }
            }));
            members.connection = Some(connection);
            debug!("shared heartbeat connected");
        }
    }

    pub(crate) fn unregister(&self, id: MachineId) {
        let stale = {
            let mut members = self.inner.members.lock();
            members.machines.retain(|machine| machine.machine_id() != id);
            if members.machines.iter().all(|machine| machine.is_manual()) {
                members.connection.take()
            } else {
                None
            }
        };

        if let Some(connection) = stale {
            connection.disconnect();
            debug!("shared heartbeat disconnected");
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.inner.members.lock();
        f.debug_struct("Registry")
            .field("machines", &members.machines.len())
            .field("ticking", &members.connection.is_some())
            .finish()
    }
}
