//! Entry, exit, and error callback chains of a single state.

use super::fault::{contain, FaultError};
use crate::core::{BoxError, Context, Guard, State, Trigger, TransitionRecord};
use crate::machine::Error;
use std::sync::Arc;
use tracing::{trace, warn};

/// Entry or exit operation. It may rewrite the payload, typically to move
/// it into the transition's destination.
pub type Operation<S, T, P> =
    Arc<dyn Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError> + Send + Sync>;

/// Error handler. Receives the error that stopped an entry or exit chain and
/// the only mutable view of the transition.
pub type ErrorOperation<S, T, P> = Arc<
    dyn Fn(&Context, &mut P, &mut TransitionRecord<S, T>, &Error<S, T>) -> Result<(), BoxError>
        + Send
        + Sync,
>;

struct ChainedOperation<S: State, T: Trigger, P> {
    guard: Option<Guard<S, T, P>>,
    operation: Operation<S, T, P>,
    name: String,
}

struct ChainedErrorOperation<S: State, T: Trigger, P> {
    operation: ErrorOperation<S, T, P>,
    name: String,
}

enum Link {
    Ran,
    Skipped(BoxError),
}

/// The three callback chains owned by a state definition.
pub struct Callbacks<S: State, T: Trigger, P> {
    entry: Vec<ChainedOperation<S, T, P>>,
    exit: Vec<ChainedOperation<S, T, P>>,
    error: Vec<ChainedErrorOperation<S, T, P>>,
}

impl<S: State, T: Trigger, P> Callbacks<S, T, P> {
    pub fn new() -> Self {
        Self {
            entry: Vec::new(),
            exit: Vec::new(),
            error: Vec::new(),
        }
    }

    pub fn add_entry(
        &mut self,
        guard: Option<Guard<S, T, P>>,
        operation: Operation<S, T, P>,
        name: String,
    ) -> &mut Self {
        self.entry.push(ChainedOperation {
            guard,
            operation,
            name,
        });
        self
    }

    pub fn add_exit(
        &mut self,
        guard: Option<Guard<S, T, P>>,
        operation: Operation<S, T, P>,
        name: String,
    ) -> &mut Self {
        self.exit.push(ChainedOperation {
            guard,
            operation,
            name,
        });
        self
    }

    pub fn add_error(&mut self, operation: ErrorOperation<S, T, P>, name: String) -> &mut Self {
        self.error.push(ChainedErrorOperation { operation, name });
        self
    }

    pub fn entry_len(&self) -> usize {
        self.entry.len()
    }

    pub fn exit_len(&self) -> usize {
        self.exit.len()
    }

    pub fn error_len(&self) -> usize {
        self.error.len()
    }

    pub fn execute_entry_chain(
        &self,
        ctx: &Context,
        payload: &mut P,
        transition: &TransitionRecord<S, T>,
    ) -> Result<(), Error<S, T>> {
        execute_chain(ctx, &self.entry, payload, transition)
    }

    pub fn execute_exit_chain(
        &self,
        ctx: &Context,
        payload: &mut P,
        transition: &TransitionRecord<S, T>,
    ) -> Result<(), Error<S, T>> {
        execute_chain(ctx, &self.exit, payload, transition)
    }

    /// Run the error handlers for `error` and return the error that stands.
    ///
    /// Handlers run in order until one returns an error, which replaces
    /// `error`. If every handler succeeds, `error` itself is returned.
    pub fn execute_error_chain(
        &self,
        ctx: &Context,
        payload: &mut P,
        transition: &mut TransitionRecord<S, T>,
        error: Error<S, T>,
    ) -> Error<S, T> {
        for (step, handler) in self.error.iter().enumerate() {
            match contain(|| (handler.operation)(ctx, payload, transition, &error)) {
                Ok(Ok(())) => {}
                Ok(Err(replacement)) => return Error::Operation(replacement),
                Err((cause, stack)) => {
                    warn!(step, name = %handler.name, "error handler faulted");
                    return FaultError::new(step, handler.name.clone(), cause, stack, transition.clone())
                        .into();
                }
            }
        }
        error
    }
}

impl<S: State, T: Trigger, P> Default for Callbacks<S, T, P> {
    fn default() -> Self {
        Self::new()
    }
}

fn execute_chain<S: State, T: Trigger, P>(
    ctx: &Context,
    chain: &[ChainedOperation<S, T, P>],
    payload: &mut P,
    transition: &TransitionRecord<S, T>,
) -> Result<(), Error<S, T>> {
    let mut step = 0;

    for link in chain {
        let outcome = contain(|| {
            if let Some(guard) = &link.guard {
                if let Err(rejection) = guard.check(ctx, payload, transition) {
                    return Ok(Link::Skipped(rejection));
                }
            }
            (link.operation)(ctx, payload, transition).map(|()| Link::Ran)
        });

        match outcome {
            Ok(Ok(Link::Ran)) => step += 1,
            Ok(Ok(Link::Skipped(reason))) => {
                trace!(name = %link.name, %reason, "chained operation skipped by guard");
            }
            Ok(Err(err)) => return Err(Error::Operation(err)),
            Err((cause, stack)) => {
                warn!(step, name = %link.name, "chained operation faulted");
                return Err(
                    FaultError::new(step, link.name.clone(), cause, stack, transition.clone()).into(),
                );
            }
        }
    }

    Ok(())
}
