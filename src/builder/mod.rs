//! Builder API for declaring a state machine.
//!
//! A [`Definition`] collects states, their triggers and callback chains,
//! and the observers. Declaration mistakes are returned as [`BuildError`]
//! and leave the definition as it was.

mod definition;
mod error;
mod macros;
mod options;

pub use definition::{Definition, StateBuilder};
pub use error::BuildError;
pub use options::{OperationConfig, StateConfig};
