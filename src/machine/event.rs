//! Notification payload for state changes.

use crate::core::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fired by [`StateMachine::state_changed`](crate::StateMachine::state_changed)
/// after every successful state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateChanged<K: StateId> {
    /// The state that just became current
    pub new: K,
    /// The state that was current before the change
    pub old: K,
    /// When the change happened
    pub at: DateTime<Utc>,
}

impl<K: StateId> StateChanged<K> {
    pub fn new(new: K, old: K) -> Self {
        Self {
            new,
            old,
            at: Utc::now(),
        }
    }
}
