//! The transition engine.
//!
//! A [`StateMachine`] is produced by compiling a
//! [`Definition`](crate::Definition). Firing a trigger runs, in order:
//!
//! 1. source state and trigger lookup
//! 2. the trigger guard
//! 3. `BeforeTransition` observers
//! 4. the source state's exit chain
//! 5. `BetweenStates` observers
//! 6. the destination state's entry chain
//! 7. `AfterTransition` observers
//!
//! A failed exit chain runs the source state's error chain and still
//! notifies `BetweenStates` observers. A failed entry chain runs the
//! destination's error chain and notifies no one.

mod engine;
mod error;

pub use engine::StateMachine;
pub use error::{Error, FireError, StateError, TriggerError};
