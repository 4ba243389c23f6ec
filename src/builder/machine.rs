//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::config::MachineOptions;
use crate::core::{State, StateId};
use crate::machine::{Registry, StateMachine};
use crate::runtime::{ErrorSink, Spawner};
use std::sync::Arc;

/// Builder for constructing state machines with a fluent API.
pub struct StateMachineBuilder<K: StateId, T> {
    initial: Option<K>,
    states: Vec<Box<dyn State<K, T>>>,
    options: MachineOptions,
    data: T,
    spawner: Option<Arc<dyn Spawner>>,
    sink: Option<Arc<dyn ErrorSink>>,
}

impl<K: StateId, T: Default + Send + 'static> StateMachineBuilder<K, T> {
    /// Create a new builder with a default payload.
    pub fn new() -> Self {
        Self::with_data(T::default())
    }
}

impl<K: StateId, T: Send + 'static> StateMachineBuilder<K, T> {
    /// Create a new builder with an explicit payload.
    pub fn with_data(data: T) -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            options: MachineOptions::default(),
            data,
            spawner: None,
            sink: None,
        }
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: K) -> Self {
        self.initial = Some(state);
        self
    }

    /// Add a state.
    pub fn state<S: State<K, T>>(mut self, state: S) -> Self {
        self.states.push(Box::new(state));
        self
    }

    /// Add multiple boxed states at once.
    pub fn states(mut self, states: Vec<Box<dyn State<K, T>>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Require explicit heartbeats instead of the shared clock.
    pub fn manual_heartbeat(mut self, manual: bool) -> Self {
        self.options.manual_heartbeat = manual;
        self
    }

    pub fn options(mut self, options: MachineOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the registry's spawner for this machine.
    pub fn spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Override the registry's error sink for this machine.
    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the state machine and add it to `registry`.
    /// Returns an error if required fields are missing.
    pub fn build(self, registry: &Registry) -> Result<StateMachine<K, T>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;

        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let spawner = self.spawner.unwrap_or_else(|| registry.spawner());
        let sink = self.sink.unwrap_or_else(|| registry.error_sink());
        let machine = StateMachine::with_runtime(
            registry,
            initial,
            self.states,
            self.options,
            self.data,
            spawner,
            sink,
        )?;
        Ok(machine)
    }
}

impl<K: StateId, T: Default + Send + 'static> Default for StateMachineBuilder<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
