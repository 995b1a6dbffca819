//! Errors surfaced by the transition engine.

use crate::callbacks::FaultError;
use crate::core::{BoxError, State, Trigger, TransitionRecord};
use thiserror::Error;

/// The payload's state (or a trigger's destination) is not part of the graph.
///
/// This is a configuration defect and is not worth retrying.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StateError<S: State> {
    pub state: S,
    pub message: String,
}

impl<S: State> StateError<S> {
    pub fn new(state: S, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

/// The trigger is not declared for the state, or its guard rejected it.
///
/// Callers may retry after changing the payload or the conditions.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TriggerError<S: State, T: Trigger> {
    pub state: S,
    pub trigger: T,
    pub message: String,
}

impl<S: State, T: Trigger> TriggerError<S, T> {
    pub fn new(state: S, trigger: T, message: impl Into<String>) -> Self {
        Self {
            state,
            trigger,
            message: message.into(),
        }
    }
}

/// Everything that can go wrong while firing or checking a trigger.
#[derive(Debug, Error)]
pub enum Error<S: State, T: Trigger> {
    #[error(transparent)]
    State(#[from] StateError<S>),

    #[error(transparent)]
    Trigger(#[from] TriggerError<S, T>),

    /// A trigger guard's own rejection, reported verbatim by `can_fire`.
    #[error("{0}")]
    Guard(#[source] BoxError),

    #[error(transparent)]
    Fault(#[from] FaultError<S, T>),

    /// A business error returned by an entry, exit, or error operation.
    #[error("{0}")]
    Operation(#[source] BoxError),
}

impl<S: State, T: Trigger> Error<S, T> {
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::Trigger(_))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    pub fn as_fault(&self) -> Option<&FaultError<S, T>> {
        match self {
            Self::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// The business error, if an operation or error handler returned one.
    pub fn as_operation(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Operation(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Failure of a single `fire` call.
///
/// Whenever the engine got far enough to build a transition record, the
/// record travels with the error. Callers read destination overrides made
/// by error handlers from here, since the engine never touches the payload.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct FireError<S: State, T: Trigger> {
    #[source]
    error: Error<S, T>,
    transition: Option<TransitionRecord<S, T>>,
}

impl<S: State, T: Trigger> FireError<S, T> {
    pub(crate) fn new(error: Error<S, T>, transition: Option<TransitionRecord<S, T>>) -> Self {
        Self { error, transition }
    }

    pub fn error(&self) -> &Error<S, T> {
        &self.error
    }

    pub fn into_error(self) -> Error<S, T> {
        self.error
    }

    pub fn transition(&self) -> Option<&TransitionRecord<S, T>> {
        self.transition.as_ref()
    }
}

impl<S: State, T: Trigger> From<Error<S, T>> for FireError<S, T> {
    fn from(error: Error<S, T>) -> Self {
        Self::new(error, None)
    }
}
