//! The state machine runtime.
//!
//! - `StateMachine`: owns the state table and drives lifecycle hooks
//! - `Registry`: the live machines sharing one heartbeat subscription
//! - `StateChanged`: payload of the state-changed notification

mod error;
mod event;
#[allow(clippy::module_inception)]
mod machine;
mod registry;

pub use error::{MachineError, CONSTRUCTION};
pub use event::StateChanged;
pub use machine::{MachineId, StateMachine};
pub use registry::{HeartbeatFilter, Registry};

pub(crate) use machine::Machine;
