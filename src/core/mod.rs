//! Core vocabulary of the runtime.
//!
//! - State identifiers via the `StateId` trait
//! - Behavior via the `State` and `Transition` capability traits
//! - The per-machine shared payload and the hook `Context`

mod context;
mod hook;
mod id;
mod shared;
mod state;
mod transition;

pub use context::Context;
pub use hook::{HookKind, HookOrigin, HookResult};
pub use id::StateId;
pub use shared::Shared;
pub use state::State;
pub use transition::Transition;
