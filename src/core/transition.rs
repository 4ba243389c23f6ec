//! The Transition capability trait.

use crate::core::context::Context;
use crate::core::hook::HookResult;
use crate::core::id::StateId;

/// A guarded edge owned by exactly one [`State`](crate::State).
///
/// While the owning state is current, the machine calls
/// [`on_heartbeat`](Transition::on_heartbeat) on every tick. Returning `true`
/// asks the machine to switch to [`target`](Transition::target).
///
/// # Example
///
/// ```rust
/// use tickstate::{state_id, Context, Transition};
///
/// state_id! {
///     pub enum Phase {
///         Warmup,
///         Running,
///     }
/// }
///
/// /// Leaves warmup after two seconds of accumulated frame time.
/// struct WarmupElapsed;
///
/// impl Transition<Phase, f64> for WarmupElapsed {
///     fn target(&self) -> Phase {
///         Phase::Running
///     }
///
///     fn on_heartbeat(&self, ctx: &Context<Phase, f64>, delta_time: f64) -> bool {
///         let mut elapsed = ctx.data().lock();
///         *elapsed += delta_time;
///         *elapsed >= 2.0
///     }
/// }
/// ```
pub trait Transition<K: StateId, T>: Send + Sync + 'static {
    /// State to switch to when this transition fires.
    ///
    /// Resolved against the machine's state table at the moment it fires.
    fn target(&self) -> K;

    /// Decide whether to fire on this tick.
    ///
    /// Evaluated synchronously; must not block.
    fn on_heartbeat(&self, _ctx: &Context<K, T>, _delta_time: f64) -> bool {
        false
    }

    /// Called once, synchronously, while the machine is being constructed.
    /// An error aborts construction.
    fn on_init(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }

    /// Called whenever the owning state is entered.
    fn on_enter(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }

    /// Called whenever the owning state is left.
    fn on_leave(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }

    fn on_destroy(&self, _ctx: &Context<K, T>) -> HookResult {
        Ok(())
    }
}
