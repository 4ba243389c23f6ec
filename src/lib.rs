//! Tickstate: a heartbeat-driven finite state machine runtime
//!
//! Tickstate targets interactive applications: a host defines named states
//! and per-state transitions, switches between them safely, and drives
//! per-frame logic across every live machine from one shared clock.
//!
//! # Core Concepts
//!
//! - **StateId**: Stable identifier of a state variant, usually an enum
//! - **State**: Behavior with lifecycle hooks and a list of transitions
//! - **Transition**: Guarded edge evaluated on every heartbeat
//! - **StateMachine**: Owns the states, tracks current/previous, fires hooks
//! - **Registry**: Live machines sharing one tick subscription
//!
//! Lifecycle hooks run fire-and-forget through a [`runtime::Spawner`];
//! guards and transition checks run inline with the tick.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tickstate::builder::after;
//! use tickstate::runtime::{InlineSpawner, ManualClock};
//! use tickstate::{state_id, Registry, State, StateMachineBuilder, Transition};
//!
//! state_id! {
//!     pub enum Enemy {
//!         Patrol,
//!         Rest,
//!     }
//! }
//!
//! struct Patrol;
//! struct Rest;
//!
//! impl State<Enemy, ()> for Patrol {
//!     fn id(&self) -> Enemy {
//!         Enemy::Patrol
//!     }
//!
//!     fn transitions(&self) -> Vec<Box<dyn Transition<Enemy, ()>>> {
//!         vec![after(Enemy::Rest, 2.0)]
//!     }
//! }
//!
//! impl State<Enemy, ()> for Rest {
//!     fn id(&self) -> Enemy {
//!         Enemy::Rest
//!     }
//! }
//!
//! let clock = ManualClock::new();
//! let registry = Registry::new(Arc::new(clock.clone()), Arc::new(InlineSpawner));
//! let enemy = StateMachineBuilder::new()
//!     .initial(Enemy::Patrol)
//!     .state(Patrol)
//!     .state(Rest)
//!     .build(&registry)
//!     .unwrap();
//!
//! clock.advance(1.0);
//! clock.advance(1.0);
//! assert_eq!(enemy.current_state(), Some(Enemy::Rest));
//!
//! enemy.destroy();
//! assert!(!registry.is_ticking());
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod machine;
pub mod runtime;
pub mod signal;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder, TransitionBuilder};
pub use config::{ClockConfig, ConfigError, MachineOptions};
pub use crate::core::{Context, HookKind, HookOrigin, HookResult, Shared, State, StateId, Transition};
pub use machine::{
    HeartbeatFilter, MachineError, MachineId, Registry, StateChanged, StateMachine, CONSTRUCTION,
};
pub use signal::{Connection, Signal};
