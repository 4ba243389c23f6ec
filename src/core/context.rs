//! Hook context: what a state or transition can see of its machine.

use crate::core::id::StateId;
use crate::core::shared::Shared;
use crate::machine::{Machine, MachineError, MachineId};
use std::sync::Weak;

/// Passed to every hook of a [`State`](crate::State) or
/// [`Transition`](crate::Transition).
///
/// The context holds the shared payload and a weak reference to the owning
/// machine, so a hook running after the machine was dropped sees
/// [`MachineError::Destroyed`] rather than keeping the machine alive.
pub struct Context<K: StateId, T> {
    data: Shared<T>,
    machine: Weak<Machine<K, T>>,
    machine_id: MachineId,
}

impl<K: StateId, T: Send + 'static> Context<K, T> {
    pub(crate) fn new(data: Shared<T>, machine: Weak<Machine<K, T>>, machine_id: MachineId) -> Self {
        Self {
            data,
            machine,
            machine_id,
        }
    }

    /// The machine's shared payload.
    pub fn data(&self) -> &Shared<T> {
        &self.data
    }

    pub fn machine_id(&self) -> MachineId {
        self.machine_id
    }

    /// Ask the owning machine to switch to `target`.
    ///
    /// Returns `Ok(false)` when the current state's guard refused.
    pub fn change_state(&self, target: &K) -> Result<bool, MachineError> {
        self.machine()?.change_state(target)
    }

    /// Like [`change_state`](Self::change_state), resolving the target by name.
    pub fn change_state_to_named(&self, name: &str) -> Result<bool, MachineError> {
        self.machine()?.change_state_to_named(name)
    }

    pub fn current_state(&self) -> Option<K> {
        self.machine.upgrade().and_then(|m| m.current_state())
    }

    pub fn previous_state(&self) -> Option<K> {
        self.machine.upgrade().and_then(|m| m.previous_state())
    }

    fn machine(&self) -> Result<std::sync::Arc<Machine<K, T>>, MachineError> {
        self.machine.upgrade().ok_or(MachineError::Destroyed)
    }
}

impl<K: StateId, T> Clone for Context<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            machine: Weak::clone(&self.machine),
            machine_id: self.machine_id,
        }
    }
}
