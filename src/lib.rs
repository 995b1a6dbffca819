//! Switchyard: a declarative, callback-driven finite-state-machine engine
//!
//! A machine is declared once with a fluent builder, validated by a small
//! compiler, and then fired concurrently against caller-owned payloads.
//! The engine itself is stateless: it orchestrates guards, callback chains,
//! and observers, and leaves moving the payload to the entry and exit
//! operations.
//!
//! # Core Concepts
//!
//! - **State / Trigger**: caller-chosen labels via the `State` and `Trigger` traits
//! - **Payload**: any caller type that reports its current state
//! - **Callback chains**: ordered entry, exit, and error operations per state,
//!   with panics contained as structured faults
//! - **Observers**: phase-filtered, side-effect-only listeners
//! - **Compiler**: reports dangling destinations and dead-end states
//!
//! # Example
//!
//! ```rust
//! use switchyard::core::{BoxError, Context, Payload, TransitionRecord};
//! use switchyard::{state_enum, trigger_enum, Definition};
//!
//! state_enum! {
//!     enum Door {
//!         Closed,
//!         Open,
//!     }
//! }
//!
//! trigger_enum! {
//!     enum Push {
//!         Swing,
//!         Shut,
//!     }
//! }
//!
//! struct Visit {
//!     door: Door,
//! }
//!
//! impl Payload<Door> for Visit {
//!     fn current_state(&self) -> Door {
//!         self.door
//!     }
//! }
//!
//! fn move_door(_: &Context, visit: &mut Visit, tr: &TransitionRecord<Door, Push>) -> Result<(), BoxError> {
//!     visit.door = *tr.destination();
//!     Ok(())
//! }
//!
//! let mut definition = Definition::new();
//! definition
//!     .configure(Door::Closed)?
//!     .permit(Push::Swing, Door::Open)?
//!     .on_entry(move_door);
//! definition
//!     .configure(Door::Open)?
//!     .permit(Push::Shut, Door::Closed)?
//!     .on_entry(move_door);
//!
//! let output = definition.compile();
//! assert!(output.messages.is_empty());
//!
//! let machine = output.into_machine();
//! let mut visit = Visit { door: Door::Closed };
//! machine.fire(&Context::background(), &mut visit, Push::Swing)?;
//! assert_eq!(visit.door, Door::Open);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod callbacks;
pub mod compiler;
pub mod core;
pub mod graph;
pub mod machine;
pub mod observe;

// Re-export commonly used types
pub use builder::{BuildError, Definition, OperationConfig, StateBuilder, StateConfig};
pub use compiler::{CompilerMessage, CompilerOutput, Severity};
pub use core::{Context, Guard, Payload, State, Trigger, TransitionRecord};
pub use machine::{Error, FireError, StateMachine};
pub use observe::{Phase, PhaseFilter};
