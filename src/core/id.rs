//! Stable identifiers for state variants.
//!
//! Every state registered on a machine is keyed by a value implementing
//! [`StateId`]. Identifiers are usually fieldless enums, one variant per
//! state, so lookups never depend on run-time type names.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state identifiers.
///
/// # Required Traits
///
/// - `Clone` + `Eq` + `Hash`: identifiers key the machine's state table
/// - `Debug`: identifiers appear in diagnostics
/// - `Serialize` + `Deserialize`: identifiers travel inside [`StateChanged`](crate::StateChanged)
///
/// # Example
///
/// ```rust
/// use tickstate::core::StateId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
///     Locked,
/// }
///
/// impl StateId for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///             Self::Locked => "Locked",
///         }
///     }
/// }
///
/// assert_eq!(Door::Locked.name(), "Locked");
/// ```
pub trait StateId:
    Clone + Eq + Hash + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display, logging and named lookups.
    fn name(&self) -> &str;
}
