//! Immutable, shareable engine that fires triggers against payloads.

use super::error::{Error, FireError, StateError, TriggerError};
use crate::callbacks::{contain, FaultError};
use crate::core::{Context, Guard, Payload, State, Trigger, TransitionRecord};
use crate::graph::{Graph, Renderer, StateDefinition, StateGraph};
use crate::observe::{dispatch, Phase};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, debug_span, field, warn};

/// A compiled state machine.
///
/// The engine owns no per-firing state. Clones share one graph, and any
/// number of threads may fire concurrently, each with its own payload.
pub struct StateMachine<S: State, T: Trigger, P> {
    graph: Arc<StateGraph<S, T, P>>,
}

impl<S: State, T: Trigger, P> Clone for StateMachine<S, T, P> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<S: State, T: Trigger, P> StateMachine<S, T, P> {
    pub(crate) fn new(graph: StateGraph<S, T, P>) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }

    /// Read-only view for traversal.
    pub fn graph(&self) -> &dyn Graph<S, T> {
        self.graph.as_ref()
    }

    /// Hand the graph to an exporter.
    pub fn render<R: Renderer<S, T>>(&self, renderer: &mut R) -> Result<(), R::Error> {
        renderer.render(self.graph.as_ref())
    }
}

impl<S: State, T: Trigger, P: Payload<S>> StateMachine<S, T, P> {
    /// Fire `trigger` against `payload`.
    ///
    /// The engine never sets the payload's state; entry and exit operations
    /// do that. On success the returned record carries the final
    /// destination. On failure the record, when one was built, travels in
    /// the [`FireError`].
    pub fn fire(
        &self,
        ctx: &Context,
        payload: &mut P,
        trigger: T,
    ) -> Result<TransitionRecord<S, T>, FireError<S, T>> {
        let current = payload.current_state();
        let span = debug_span!(
            "fire",
            firing_id = field::Empty,
            state = current.name(),
            trigger = trigger.name()
        );
        let _entered = span.enter();

        let Some(source) = self.graph.states.get(&current) else {
            let message = format!("State not found in definition of states: {}", current.name());
            return Err(Error::from(StateError::new(current, message)).into());
        };

        let Some(declared) = source.triggers.get(&trigger) else {
            let message = format!(
                "Trigger '{}' not found in definition for state: {}",
                trigger.name(),
                current.name()
            );
            return Err(Error::from(TriggerError::new(current, trigger, message)).into());
        };

        let Some(target) = self.graph.states.get(&declared.destination) else {
            let destination = declared.destination.clone();
            let message = format!(
                "State not found in definition of states: {}",
                destination.name()
            );
            return Err(Error::from(StateError::new(destination, message)).into());
        };

        let mut transition =
            TransitionRecord::new(current.clone(), declared.destination.clone(), trigger.clone());
        span.record("firing_id", field::display(transition.id()));

        if let Some(guard) = &declared.guard {
            if let Err(rejection) = evaluate(guard, ctx, payload, &transition) {
                let error = match rejection {
                    Rejection::Fault(fault) => Error::Fault(fault),
                    Rejection::Refused(reason) => {
                        debug!(%reason, "trigger guard rejected");
                        let message = format!(
                            "Conditional Trigger '{}' conditions not met for state: {}",
                            trigger.name(),
                            current.name()
                        );
                        TriggerError::new(current, trigger, message).into()
                    }
                };
                return Err(FireError::new(error, Some(transition)));
            }
        }

        debug!(phase = %Phase::BeforeTransition, "dispatching");
        self.dispatch(ctx, Phase::BeforeTransition, payload, &transition);

        debug!("running exit chain");
        if let Err(error) = source.callbacks.execute_exit_chain(ctx, payload, &transition) {
            let error = self.recover(source, ctx, payload, &mut transition, error);
            self.dispatch(ctx, Phase::BetweenStates, payload, &transition);
            return Err(FireError::new(error, Some(transition)));
        }

        debug!(phase = %Phase::BetweenStates, "dispatching");
        self.dispatch(ctx, Phase::BetweenStates, payload, &transition);

        debug!("running entry chain");
        if let Err(error) = target.callbacks.execute_entry_chain(ctx, payload, &transition) {
            let error = self.recover(target, ctx, payload, &mut transition, error);
            return Err(FireError::new(error, Some(transition)));
        }

        debug!(phase = %Phase::AfterTransition, "dispatching");
        self.dispatch(ctx, Phase::AfterTransition, payload, &transition);

        debug!(
            destination = transition.destination().name(),
            elapsed_us = transition.elapsed().as_micros() as u64,
            "transition completed"
        );
        Ok(transition)
    }

    /// Check whether `trigger` could fire from the payload's current state.
    ///
    /// Runs the lookups and the trigger guard only. No callbacks run and no
    /// observers are notified. A guard rejection is returned as the guard's
    /// own error.
    pub fn can_fire(&self, ctx: &Context, payload: &P, trigger: T) -> Result<(), Error<S, T>> {
        let current = payload.current_state();

        let Some(source) = self.graph.states.get(&current) else {
            let message = format!("State '{}' not defined", current.name());
            return Err(StateError::new(current, message).into());
        };

        let Some(declared) = source.triggers.get(&trigger) else {
            let message = format!(
                "Trigger '{}' not defined for state '{}'",
                trigger.name(),
                current.name()
            );
            return Err(TriggerError::new(current, trigger, message).into());
        };

        let Some(guard) = &declared.guard else {
            return Ok(());
        };

        let transition = TransitionRecord::new(current, declared.destination.clone(), trigger);
        evaluate(guard, ctx, payload, &transition).map_err(|rejection| match rejection {
            Rejection::Fault(fault) => Error::Fault(fault),
            Rejection::Refused(reason) => Error::Guard(reason),
        })
    }

    /// The triggers declared for the payload's current state.
    pub fn enumerate_active_triggers(&self, payload: &P) -> Result<HashSet<T>, Error<S, T>> {
        let current = payload.current_state();

        match self.graph.states.get(&current) {
            Some(source) => Ok(source.triggers.keys().cloned().collect()),
            None => {
                let message = format!(
                    "State {} not found in state machine definition",
                    current.name()
                );
                Err(StateError::new(current, message).into())
            }
        }
    }

    fn dispatch(&self, ctx: &Context, phase: Phase, payload: &P, transition: &TransitionRecord<S, T>) {
        dispatch(
            ctx,
            phase,
            &self.graph.observers,
            payload,
            transition,
            transition.elapsed(),
        );
    }

    fn recover(
        &self,
        definition: &StateDefinition<S, T, P>,
        ctx: &Context,
        payload: &mut P,
        transition: &mut TransitionRecord<S, T>,
        error: Error<S, T>,
    ) -> Error<S, T> {
        warn!(
            state = definition.state.name(),
            handlers = definition.callbacks.error_len(),
            %error,
            "chain failed, running error chain"
        );
        definition
            .callbacks
            .execute_error_chain(ctx, payload, transition, error)
    }
}

impl<S: State, T: Trigger, P> Graph<S, T> for StateMachine<S, T, P> {
    fn for_each_node(&self, visit: &mut dyn FnMut(&S, &str, &str)) {
        self.graph.for_each_node(visit);
    }

    fn for_each_edge(&self, visit: &mut dyn FnMut(&S, &S, &T)) {
        self.graph.for_each_edge(visit);
    }
}

enum Rejection<S: State, T: Trigger> {
    Refused(crate::core::BoxError),
    Fault(FaultError<S, T>),
}

fn evaluate<S: State, T: Trigger, P>(
    guard: &Guard<S, T, P>,
    ctx: &Context,
    payload: &P,
    transition: &TransitionRecord<S, T>,
) -> Result<(), Rejection<S, T>> {
    match contain(|| guard.check(ctx, payload, transition)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(reason)) => Err(Rejection::Refused(reason)),
        Err((cause, stack)) => {
            warn!("trigger guard faulted");
            Err(Rejection::Fault(FaultError::new(
                0,
                format!("guard:{}", transition.trigger().name()),
                cause,
                stack,
                transition.clone(),
            )))
        }
    }
}
