//! Errors raised by machine construction and state changes.

use crate::core::StateId;
use thiserror::Error;

/// Source named by a failed initial entry.
pub const CONSTRUCTION: &str = "<construction>";

/// Errors that can occur while building or driving a state machine.
#[derive(Debug, Error)]
pub enum MachineError {
    /// `from` is [`CONSTRUCTION`] when the initial state is unknown.
    #[error("Tried to change state from '{from}' to '{target}', but '{target}' is not registered")]
    InvalidStateReference { from: String, target: String },

    #[error("State '{state}' was supplied more than once")]
    DuplicateState { state: String },

    #[error("Transition #{index} of state '{state}' failed to initialize")]
    TransitionInit {
        state: String,
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("State machine is still initializing")]
    Initializing,

    #[error("State machine has been destroyed")]
    Destroyed,
}

impl MachineError {
    pub(crate) fn unknown_initial<K: StateId>(initial: &K) -> Self {
        Self::InvalidStateReference {
            from: CONSTRUCTION.to_string(),
            target: initial.name().to_string(),
        }
    }

    /// Whether this error names a state the machine does not know.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, Self::InvalidStateReference { .. })
    }
}
