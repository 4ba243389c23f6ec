//! Fire-and-forget task launchers.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::runtime::{Handle, TryCurrentError};

/// A unit of work handed to a [`Spawner`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Launches a task without waiting for it.
///
/// Machines dispatch every asynchronous hook through a spawner and never
/// observe the outcome; failures are routed to the
/// [`ErrorSink`](super::ErrorSink) by the task itself.
pub trait Spawner: Send + Sync {
    fn spawn(&self, task: Task);
}

/// Runs tasks on a tokio runtime.
#[derive(Clone, Debug)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Spawner for TokioSpawner {
    fn spawn(&self, task: Task) {
        // The join handle is dropped: the task is detached.
        drop(self.handle.spawn(async move { task() }));
    }
}

/// Runs each task immediately on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn(&self, task: Task) {
        task();
    }
}

/// Queues tasks until [`run_pending`](DeferredSpawner::run_pending) is called.
///
/// Useful when the host wants hooks to run at a well-defined point of its
/// frame, or to observe exactly which hooks a call scheduled.
#[derive(Default)]
pub struct DeferredSpawner {
    queue: Mutex<VecDeque<Task>>,
}

impl DeferredSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued tasks in FIFO order, including tasks they schedule.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.queue.lock().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl Spawner for DeferredSpawner {
    fn spawn(&self, task: Task) {
        self.queue.lock().push_back(task);
    }
}
