//! Lifecycle hook vocabulary shared by states and transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result returned by every fire-and-forget hook.
///
/// Failures never reach the machine; they are handed to the machine's
/// [`ErrorSink`](crate::runtime::ErrorSink).
pub type HookResult = anyhow::Result<()>;

/// Which lifecycle hook produced an event or failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookKind {
    Init,
    Enter,
    Leave,
    Heartbeat,
    Destroy,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "on_init",
            Self::Enter => "on_enter",
            Self::Leave => "on_leave",
            Self::Heartbeat => "on_heartbeat",
            Self::Destroy => "on_destroy",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of a hook: the state itself, or one of its transitions by
/// declaration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookOrigin {
    State,
    Transition(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_kind_displays_method_name() {
        assert_eq!(HookKind::Init.to_string(), "on_init");
        assert_eq!(HookKind::Heartbeat.to_string(), "on_heartbeat");
        assert_eq!(HookKind::Destroy.as_str(), "on_destroy");
    }
}
