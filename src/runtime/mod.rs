//! Host-facing runtime seams.
//!
//! Machines never talk to an executor or timer directly. They schedule
//! hooks through a [`Spawner`], receive frames from a [`TickSource`] and
//! report hook failures to an [`ErrorSink`]. Tokio-backed implementations
//! cover the common case; the manual and deferred variants give hosts and
//! tests full control over when things run.

mod clock;
mod sink;
mod spawner;

pub use clock::{IntervalClock, ManualClock, TickCallback, TickConnection, TickSource};
pub use sink::{log_hook_failure, ErrorSink, HookFailure};
pub use spawner::{DeferredSpawner, InlineSpawner, Spawner, Task, TokioSpawner};
