//! Build errors for state machine definitions.

use thiserror::Error;

/// Errors raised while declaring states and triggers.
///
/// Both variants describe a malformed definition. They are returned at the
/// moment of declaration so the caller can decide whether that is fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("State: {state} - has already been defined, configuration invalid.")]
    DuplicateState { state: String },

    #[error("Trigger: {trigger} - has already been defined, configuration invalid.")]
    DuplicateTrigger { state: String, trigger: String },
}
