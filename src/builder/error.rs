//! Build errors for state machine and transition builders.

use crate::machine::MachineError;
use thiserror::Error;

/// Errors that can occur when building state machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("No states defined. Add at least one state")]
    NoStates,

    #[error("Transition target state not specified. Call .to(state)")]
    MissingTarget,

    #[error("Transition condition not specified. Call .when(predicate)")]
    MissingCondition,

    #[error(transparent)]
    Machine(#[from] MachineError),
}
