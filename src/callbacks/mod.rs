//! Ordered callback chains with per-step guards and fault containment.
//!
//! Every state owns an entry chain, an exit chain, and an error chain.
//! A panic inside any guard, operation, or error handler is caught at the
//! chain boundary and surfaced as a [`FaultError`].

mod chain;
mod fault;
pub(crate) mod naming;

pub use chain::{Callbacks, ErrorOperation, Operation};
pub(crate) use fault::contain;
pub use fault::{FaultCause, FaultError, OpaquePanic};
