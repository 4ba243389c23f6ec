//! The State capability trait.

use crate::core::context::Context;
use crate::core::hook::HookResult;
use crate::core::id::StateId;
use crate::core::transition::Transition;

/// A unit of behavior owned by one machine.
///
/// Each state is instantiated once per machine and lives until the machine
/// is destroyed; entering the same state again reuses the same object, so
/// any per-state bookkeeping needs interior mutability.
///
/// Every hook except [`can_change_state`](State::can_change_state) is
/// dispatched through the machine's [`Spawner`](crate::runtime::Spawner)
/// and is never awaited.
///
/// # Example
///
/// ```rust
/// use tickstate::{state_id, Context, HookResult, State};
///
/// state_id! {
///     pub enum Light {
///         Green,
///         Red,
///     }
/// }
///
/// struct Green;
///
/// impl State<Light, u32> for Green {
///     fn id(&self) -> Light {
///         Light::Green
///     }
///
///     fn on_enter(&self, ctx: &Context<Light, u32>) -> HookResult {
///         *ctx.data().lock() += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait State<K: StateId, T>: Send + Sync + 'static {
    /// Stable identifier; must be unique within one machine.
    fn id(&self) -> K;

    /// Transitions owned by this state, in evaluation order.
    ///
    /// Called exactly once, while the machine is being constructed.
    fn transitions(&self) -> Vec<Box<dyn Transition<K, T>>> {
        Vec::new()
    }

    /// Guard consulted before the machine leaves this state.
    ///
    /// Runs inline with the caller and must not block.
    fn can_change_state(&self, _ctx: &Context<K, T>, _target: &K) -> bool {
        true
    }

    /// Called once after the machine instantiated this state.
    fn on_init(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }

    fn on_enter(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }

    fn on_leave(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }

    /// Called on every heartbeat while this state is current.
    fn on_heartbeat(&self, _ctx: &Context<K, T>, _delta_time: f64) -> HookResult {
        Ok(())
    }

    fn on_destroy(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }
}
