//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and macros for creating state
//! machines with minimal boilerplate while maintaining type safety.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use transition::{FnTransition, TransitionBuilder};

use crate::core::{Context, StateId, Transition};

/// Create a transition that fires once `seconds` of heartbeat time have
/// accumulated since the owning state was last entered.
///
/// # Example
///
/// ```
/// use tickstate::builder::after;
/// use tickstate::state_id;
///
/// state_id! {
///     enum Light {
///         Green,
///         Yellow,
///     }
/// }
///
/// let transition = after::<Light, ()>(Light::Yellow, 30.0);
/// ```
pub fn after<K, T>(target: K, seconds: f64) -> Box<dyn Transition<K, T>>
where
    K: StateId,
    T: Send + 'static,
{
    Box::new(Timer {
        target,
        seconds,
        elapsed: parking_lot::Mutex::new(0.0),
    })
}

/// Create a transition that fires whenever `predicate` holds.
///
/// # Example
///
/// ```
/// use tickstate::builder::guarded_transition;
/// use tickstate::state_id;
///
/// state_id! {
///     enum Health {
///         Alive,
///         Dead,
///     }
/// }
///
/// let transition = guarded_transition::<Health, i32, _>(Health::Dead, |ctx, _| {
///     *ctx.data().lock() <= 0
/// });
/// ```
pub fn guarded_transition<K, T, F>(target: K, predicate: F) -> Box<dyn Transition<K, T>>
where
    K: StateId,
    T: Send + 'static,
    F: Fn(&Context<K, T>, f64) -> bool + Send + Sync + 'static,
{
    Box::new(FnTransition::new(target, predicate))
}

struct Timer<K> {
    target: K,
    seconds: f64,
    elapsed: parking_lot::Mutex<f64>,
}

impl<K: StateId, T: Send + 'static> Transition<K, T> for Timer<K> {
    fn target(&self) -> K {
        self.target.clone()
    }

    fn on_heartbeat(&self, _ctx: &Context<K, T>, delta_time: f64) -> bool {
        let mut elapsed = self.elapsed.lock();
        *elapsed += delta_time;
        *elapsed >= self.seconds
    }

    fn on_enter(&self, _ctx: &Context<K, T>) -> crate::core::HookResult {
        *self.elapsed.lock() = 0.0;
        Ok(())
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
    use std::sync::Arc;

    state_id! {
        enum Light {
            Green,
            Yellow,
            Red,
        }
    }

    struct Lamp {
        id: Light,
        next: Light,
        seconds: f64,
    }

    impl State<Light, bool> for Lamp {
        fn id(&self) -> Light {
            self.id
        }

        fn transitions(&self) -> Vec<Box<dyn Transition<Light, bool>>> {
            vec![
                guarded_transition(Light::Red, |ctx: &Context<Light, bool>, _| {
                    *ctx.data().lock()
                }),
                after(self.next, self.seconds),
            ]
        }
    }

    fn traffic_light(clock: &ManualClock) -> StateMachine<Light, bool> {
        let registry = Registry::new(Arc::new(clock.clone()), Arc::new(InlineSpawner));
        StateMachineBuilder::new()
            .initial(Light::Green)
            .state(Lamp {
                id: Light::Green,
                next: Light::Yellow,
                seconds: 2.0,
            })
            .state(Lamp {
                id: Light::Yellow,
                next: Light::Red,
                seconds: 1.0,
            })
            .state(Lamp {
                id: Light::Red,
                next: Light::Green,
                seconds: 3.0,
            })
            .options(MachineOptions::default())
            .build(&registry)
            .unwrap()
    }

    #[test]
    fn timer_transition_cycles_states() {
        let clock = ManualClock::new();
        let light = traffic_light(&clock);

        clock.advance(1.0);
        assert_eq!(light.current_state(), Some(Light::Green));
        clock.advance(1.0);
        assert_eq!(light.current_state(), Some(Light::Yellow));
        clock.advance(1.0);
        assert_eq!(light.current_state(), Some(Light::Red));
        clock.advance(3.0);
        assert_eq!(light.current_state(), Some(Light::Green));

        light.destroy();
    }

    #[test]
    fn guarded_transition_takes_priority() {
        let clock = ManualClock::new();
        let light = traffic_light(&clock);

        *light.data().lock() = true;
        clock.advance(5.0);

        assert_eq!(light.current_state(), Some(Light::Red));
        light.destroy();
    }
}
