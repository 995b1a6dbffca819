//! Label traits for states and triggers, and the payload capability.
//!
//! States and triggers are opaque, comparable labels. The engine never
//! interprets them beyond equality, hashing, and a display name used in
//! diagnostics.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state labels.
///
/// Labels are compared for equality and used as map keys, so they must be
/// `Eq + Hash`. `Send + Sync` is required because a compiled machine is
/// shared across threads.
///
/// # Example
///
/// ```rust
/// use switchyard::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum OrderState {
///     Created,
///     Opened,
/// }
///
/// impl State for OrderState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Created => "Created",
///             Self::Opened => "Opened",
///         }
///     }
/// }
///
/// assert_eq!(OrderState::Opened.name(), "Opened");
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Get the state's label for display/logging.
    fn name(&self) -> &str;
}

/// Trait for trigger labels.
///
/// A trigger names an edge leaving a state. Like [`State`], any comparable
/// label works; `String` and `&'static str` are supported out of the box.
pub trait Trigger: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Get the trigger's label for display/logging.
    fn name(&self) -> &str;
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl State for &'static str {
    fn name(&self) -> &str {
        self
    }
}

impl Trigger for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl Trigger for &'static str {
    fn name(&self) -> &str {
        self
    }
}

/// The only thing the engine asks of a caller-owned payload.
///
/// The engine never writes the state back. Moving a payload into its new
/// state is the job of an entry or exit operation.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Payload;
///
/// struct Order {
///     state: &'static str,
/// }
///
/// impl Payload<&'static str> for Order {
///     fn current_state(&self) -> &'static str {
///         self.state
///     }
/// }
/// ```
pub trait Payload<S: State> {
    /// Report the payload's current state.
    fn current_state(&self) -> S;
}
