//! Guard predicates for triggers and chained operations.
//!
//! A guard passes by returning `Ok(())`. Any error is a rejection: on a
//! trigger it blocks the firing, on a chained operation it skips that one
//! operation.

use super::context::Context;
use super::state::{State, Trigger};
use super::transition::TransitionRecord;
use super::BoxError;
use std::fmt;
use std::sync::Arc;

type Predicate<S, T, P> =
    dyn Fn(&Context, &P, &TransitionRecord<S, T>) -> Result<(), BoxError> + Send + Sync;

/// Predicate evaluated against the payload and the in-flight transition.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{Context, Guard, TransitionRecord};
///
/// struct Order {
///     paid: bool,
/// }
///
/// let guard: Guard<&str, &str, Order> = Guard::when(|_, order: &Order, _| order.paid, "order is unpaid");
/// let record = TransitionRecord::new("Created", "Opened", "Open");
///
/// assert!(guard.check(&Context::background(), &Order { paid: true }, &record).is_ok());
/// assert!(guard.check(&Context::background(), &Order { paid: false }, &record).is_err());
/// ```
pub struct Guard<S: State, T: Trigger, P> {
    predicate: Arc<Predicate<S, T, P>>,
}

impl<S: State, T: Trigger, P> Guard<S, T, P> {
    /// Create a guard from a predicate that explains its rejections.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context, &P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Create a guard from a boolean predicate and a fixed rejection message.
    pub fn when<F>(predicate: F, rejection: impl Into<String>) -> Self
    where
        F: Fn(&Context, &P, &TransitionRecord<S, T>) -> bool + Send + Sync + 'static,
    {
        let rejection = rejection.into();
        Self::new(move |ctx, payload, transition| {
            if predicate(ctx, payload, transition) {
                Ok(())
            } else {
                Err(rejection.clone().into())
            }
        })
    }

    /// Guard that passes only while `trigger` is the one being fired.
    pub(crate) fn trigger_is(trigger: T, hook: &'static str) -> Self {
        Self::new(move |_, _, transition| {
            if *transition.trigger() == trigger {
                Ok(())
            } else {
                Err(format!("trigger '{}' not found for {}", trigger.name(), hook).into())
            }
        })
    }

    /// Evaluate the guard.
    pub fn check(
        &self,
        ctx: &Context,
        payload: &P,
        transition: &TransitionRecord<S, T>,
    ) -> Result<(), BoxError> {
        (self.predicate)(ctx, payload, transition)
    }
}

impl<S: State, T: Trigger, P> Clone for Guard<S, T, P> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: State, T: Trigger, P> fmt::Debug for Guard<S, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
