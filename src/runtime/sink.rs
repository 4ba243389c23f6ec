//! Delivery of hook failures to the host.

use crate::core::{HookKind, HookOrigin};
use crate::machine::MachineId;
use tracing::error;

/// A hook that returned an error, or a heartbeat pass that failed.
#[derive(Debug)]
pub struct HookFailure {
    pub machine: MachineId,
    pub state: String,
    pub origin: HookOrigin,
    pub hook: HookKind,
    pub error: anyhow::Error,
}

/// Receives failures from fire-and-forget hooks.
///
/// Any `Fn(HookFailure)` closure or function is a sink.
pub trait ErrorSink: Send + Sync {
    fn report(&self, failure: HookFailure);
}

impl<F> ErrorSink for F
where
    F: Fn(HookFailure) + Send + Sync,
{
    fn report(&self, failure: HookFailure) {
        self(failure)
    }
}

/// Default sink: log the failure and move on.
pub fn log_hook_failure(failure: HookFailure) {
    error!(
        machine = %failure.machine,
        state = %failure.state,
        origin = ?failure.origin,
        hook = %failure.hook,
        "hook failed: {:#}",
        failure.error
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn closures_are_sinks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&seen);
        let sink: Arc<dyn ErrorSink> = Arc::new(move |failure: HookFailure| {
            store.lock().push((failure.hook, failure.error.to_string()));
        });

        sink.report(HookFailure {
            machine: MachineId::new(),
            state: "Idle".to_string(),
            origin: HookOrigin::State,
            hook: HookKind::Enter,
            error: anyhow::anyhow!("boom"),
        });

        assert_eq!(*seen.lock(), vec![(HookKind::Enter, "boom".to_string())]);
    }

    #[test]
    fn log_sink_accepts_failures() {
        let sink: Arc<dyn ErrorSink> = Arc::new(log_hook_failure);
        sink.report(HookFailure {
            machine: MachineId::new(),
            state: "Idle".to_string(),
            origin: HookOrigin::Transition(0),
            hook: HookKind::Destroy,
            error: anyhow::anyhow!("ignored"),
        });
    }
}
