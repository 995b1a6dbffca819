//! Core vocabulary shared by the builder, the compiler, and the engine.
//!
//! - Label traits for states and triggers, and the payload capability
//! - Guard predicates
//! - The per-firing transition record
//! - The cancellation-carrying context handed to callbacks

mod context;
mod guard;
mod state;
mod transition;

pub use context::Context;
pub use guard::Guard;
pub use state::{Payload, State, Trigger};
pub use transition::TransitionRecord;

/// Error type returned by user-supplied guards, operations, and error handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
