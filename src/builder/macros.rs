//! Macros for ergonomic state identifier declaration.

/// Declare a fieldless enum of state identifiers and implement
/// [`StateId`](crate::StateId) for it, naming each variant after itself.
///
/// # Example
///
/// ```
/// use tickstate::{state_id, StateId};
///
/// state_id! {
///     pub enum PlayerState {
///         Idle,
///         Running,
///         Jumping,
///     }
/// }
///
/// assert_eq!(PlayerState::Jumping.name(), "Jumping");
/// ```
#[macro_export]
macro_rules! state_id {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::StateId for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
