//! Builder for closure-backed transitions.

use crate::builder::error::BuildError;
use crate::core::{Context, HookResult, StateId, Transition};
use std::sync::Arc;

/// Type alias for transition conditions.
type Condition<K, T> = Arc<dyn Fn(&Context<K, T>, f64) -> bool + Send + Sync>;

/// Type alias for side-effect hooks attached to a built transition.
type Hook<K, T> = Arc<dyn Fn(&Context<K, T>) -> HookResult + Send + Sync>;

/// A transition assembled from closures by [`TransitionBuilder`].
pub struct FnTransition<K: StateId, T> {
    target: K,
    condition: Condition<K, T>,
    on_enter: Option<Hook<K, T>>,
    on_leave: Option<Hook<K, T>>,
}

impl<K: StateId, T: Send + 'static> FnTransition<K, T> {
    /// A transition to `target` that fires whenever `condition` holds.
    pub fn new<F>(target: K, condition: F) -> Self
    where
        F: Fn(&Context<K, T>, f64) -> bool + Send + Sync + 'static,
    {
        Self {
            target,
            condition: Arc::new(condition),
            on_enter: None,
            on_leave: None,
        }
    }
}

impl<K: StateId, T: Send + 'static> Transition<K, T> for FnTransition<K, T> {
    fn target(&self) -> K {
        self.target.clone()
    }

    fn on_heartbeat(&self, ctx: &Context<K, T>, delta_time: f64) -> bool {
        (self.condition)(ctx, delta_time)
    }

    fn on_enter(&self, ctx: &Context<K, T>) -> HookResult {
        self.on_enter.as_ref().map_or(Ok(()), |hook| hook(ctx))
    }

    fn on_leave(&self, ctx: &Context<K, T>) -> HookResult {
        self.on_leave.as_ref().map_or(Ok(()), |hook| hook(ctx))
    }
}

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<K: StateId, T> {
    target: Option<K>,
    condition: Option<Condition<K, T>>,
    on_enter: Option<Hook<K, T>>,
    on_leave: Option<Hook<K, T>>,
}

impl<K: StateId, T: Send + 'static> TransitionBuilder<K, T> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            target: None,
            condition: None,
            on_enter: None,
            on_leave: None,
        }
    }

    /// Set the target state (required).
    pub fn to(mut self, state: K) -> Self {
        self.target = Some(state);
        self
    }

    /// Set the per-tick condition (required).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Context<K, T>, f64) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(predicate));
        self
    }

    /// Run `hook` whenever the owning state is entered.
    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context<K, T>) -> HookResult + Send + Sync + 'static,
    {
        self.on_enter = Some(Arc::new(hook));
        self
    }

    /// Run `hook` whenever the owning state is left.
    pub fn on_leave<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context<K, T>) -> HookResult + Send + Sync + 'static,
    {
        self.on_leave = Some(Arc::new(hook));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<FnTransition<K, T>, BuildError> {
        let target = self.target.ok_or(BuildError::MissingTarget)?;
        let condition = self.condition.ok_or(BuildError::MissingCondition)?;

        Ok(FnTransition {
            target,
            condition,
            on_enter: self.on_enter,
            on_leave: self.on_leave,
        })
    }

    /// Build and box the transition, ready for [`State::transitions`](crate::State::transitions).
    pub fn boxed(self) -> Result<Box<dyn Transition<K, T>>, BuildError> {
        Ok(Box::new(self.build()?))
    }
}

impl<K: StateId, T: Send + 'static> Default for TransitionBuilder<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MachineOptions;
    use crate::core::State;
    use crate::machine::{Registry, StateMachine};
    use crate::runtime::{InlineSpawner, ManualClock};
    use crate::state_id;

    state_id! {
        enum TestState {
            Initial,
            Processing,
        }
    }

    #[test]
    fn builder_validates_missing_target() {
        let result = TransitionBuilder::<TestState, ()>::new()
            .when(|_, _| true)
            .build();

        assert!(matches!(result, Err(BuildError::MissingTarget)));
    }

    #[test]
    fn builder_validates_missing_condition() {
        let result = TransitionBuilder::<TestState, ()>::new()
            .to(TestState::Processing)
            .build();

        assert!(matches!(result, Err(BuildError::MissingCondition)));
    }

    struct Initial;

    impl State<TestState, u32> for Initial {
        fn id(&self) -> TestState {
            TestState::Initial
        }

        fn transitions(&self) -> Vec<Box<dyn Transition<TestState, u32>>> {
            vec![TransitionBuilder::new()
                .to(TestState::Processing)
                .when(|ctx: &Context<TestState, u32>, _| *ctx.data().lock() >= 2)
                .on_enter(|ctx: &Context<TestState, u32>| {
                    *ctx.data().lock() += 1;
                    Ok(())
                })
                .boxed()
                .unwrap()]
        }
    }

    struct Processing;

    impl State<TestState, u32> for Processing {
        fn id(&self) -> TestState {
            TestState::Processing
        }
    }

    #[test]
    fn built_transition_drives_machine() {
        let registry = Registry::new(Arc::new(ManualClock::new()), Arc::new(InlineSpawner));
        let machine = StateMachine::new(
            &registry,
            TestState::Initial,
            vec![Box::new(Initial), Box::new(Processing)],
            MachineOptions {
                manual_heartbeat: true,
            },
            1u32,
        )
        .unwrap();

        // on_enter of the transition ran once on the initial entry
        assert_eq!(*machine.data().lock(), 2);

        machine.execute_heartbeat_event(0.1).unwrap();
        assert_eq!(machine.current_state(), Some(TestState::Processing));
    }

    #[test]
    fn fluent_api_builds_transition() {
        let transition = TransitionBuilder::<TestState, ()>::new()
            .to(TestState::Processing)
            .when(|_, dt| dt > 1.0)
            .build()
            .unwrap();

        assert_eq!(transition.target(), TestState::Processing);
    }
}
