//! Builder for declaring states, triggers, callbacks, and observers.

use crate::builder::error::BuildError;
use crate::builder::options::{OperationConfig, StateConfig};
use crate::callbacks::naming::operation_name;
use crate::compiler::{self, CompilerOutput};
use crate::core::{BoxError, Context, Guard, Payload, State, Trigger, TransitionRecord};
use crate::graph::{AbstractSyntax, Edge, Graph, Renderer, StateDefinition, StateGraph, TriggerDefinition};
use crate::machine::Error;
use crate::observe::{ObserverDefinition, Phase, PhaseFilter};
use indexmap::map::Entry;
use std::marker::PhantomData;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// A state machine definition under construction.
///
/// Declaration is single-threaded. Once [`compile`](Definition::compile) is
/// called the definition is frozen into a shareable
/// [`StateMachine`](crate::StateMachine).
///
/// # Example
///
/// ```rust
/// use switchyard::Definition;
/// use switchyard::core::Payload;
///
/// struct Order {
///     state: &'static str,
/// }
///
/// impl Payload<&'static str> for Order {
///     fn current_state(&self) -> &'static str {
///         self.state
///     }
/// }
///
/// let mut definition = Definition::<&str, &str, Order>::new();
/// definition
///     .configure("Created")?
///     .permit("Open", "Opened")?
///     .permit("Cancel", "Canceled")?;
/// definition.configure("Opened")?;
/// definition.configure("Canceled")?;
///
/// let output = definition.compile();
/// assert!(!output.has_errors());
/// # Ok::<(), switchyard::BuildError>(())
/// ```
pub struct Definition<S: State, T: Trigger, P> {
    graph: StateGraph<S, T, P>,
    _payload: PhantomData<fn(&P)>,
}

impl<S: State, T: Trigger, P: Payload<S>> Definition<S, T, P> {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self {
            graph: StateGraph::new(),
            _payload: PhantomData,
        }
    }

    /// Declare a state with default display metadata.
    pub fn configure(&mut self, state: S) -> Result<StateBuilder<'_, S, T, P>, BuildError> {
        self.configure_with(state, StateConfig::default())
    }

    /// Declare a state. Fails if the state was already declared.
    pub fn configure_with(
        &mut self,
        state: S,
        config: StateConfig,
    ) -> Result<StateBuilder<'_, S, T, P>, BuildError> {
        let graph = &mut self.graph;
        match graph.states.entry(state.clone()) {
            Entry::Occupied(_) => Err(BuildError::DuplicateState {
                state: state.name().to_string(),
            }),
            Entry::Vacant(slot) => {
                let (display_name, description) = config.resolve(state.name());
                graph.syntax.states.push(state.clone());
                let definition = slot.insert(StateDefinition::new(state, display_name, description));
                Ok(StateBuilder {
                    definition,
                    syntax: &mut graph.syntax,
                })
            }
        }
    }

    /// Register an observer for every phase.
    pub fn observe<F>(&mut self, observer: F) -> &mut Self
    where
        F: Fn(&Context, Phase, &P, &TransitionRecord<S, T>, Duration) + Send + Sync + 'static,
    {
        self.observe_filtered(PhaseFilter::ALL, observer)
    }

    /// Register an observer for the phases in `filter`.
    pub fn observe_filtered<F>(&mut self, filter: PhaseFilter, observer: F) -> &mut Self
    where
        F: Fn(&Context, Phase, &P, &TransitionRecord<S, T>, Duration) + Send + Sync + 'static,
    {
        self.graph.observers.push(ObserverDefinition {
            filter,
            observer: Arc::new(observer),
        });
        self
    }

    /// Validate the definition and freeze it into an engine.
    ///
    /// The engine is returned even when errors are reported; callers decide
    /// whether to proceed.
    pub fn compile(self) -> CompilerOutput<S, T, P> {
        compiler::compile(self.graph)
    }

    /// Hand the graph to an exporter.
    pub fn render<R: Renderer<S, T>>(&self, renderer: &mut R) -> Result<(), R::Error> {
        renderer.render(&self.graph)
    }
}

impl<S: State, T: Trigger, P: Payload<S>> Default for Definition<S, T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: Trigger, P> Graph<S, T> for Definition<S, T, P> {
    fn for_each_node(&self, visit: &mut dyn FnMut(&S, &str, &str)) {
        self.graph.for_each_node(visit);
    }

    fn for_each_edge(&self, visit: &mut dyn FnMut(&S, &S, &T)) {
        self.graph.for_each_edge(visit);
    }
}

/// Chained configuration of one declared state.
pub struct StateBuilder<'a, S: State, T: Trigger, P> {
    definition: &'a mut StateDefinition<S, T, P>,
    syntax: &'a mut AbstractSyntax<S, T>,
}

impl<'a, S: State, T: Trigger, P> StateBuilder<'a, S, T, P> {
    /// The state being configured.
    pub fn state(&self) -> &S {
        &self.definition.state
    }

    /// Allow `trigger` to move this state to `destination`.
    pub fn permit(self, trigger: T, destination: S) -> Result<Self, BuildError> {
        self.add_permit(trigger, destination, None)
    }

    /// Allow `trigger` to move this state to `destination` while `guard` passes.
    pub fn permit_if<F>(self, guard: F, trigger: T, destination: S) -> Result<Self, BuildError>
    where
        F: Fn(&Context, &P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.add_permit(trigger, destination, Some(Guard::new(guard)))
    }

    /// Allow `trigger` to re-enter this state.
    pub fn permit_reentry(self, trigger: T) -> Result<Self, BuildError> {
        let destination = self.definition.state.clone();
        self.add_permit(trigger, destination, None)
    }

    /// Allow `trigger` to re-enter this state while `guard` passes.
    pub fn permit_reentry_if<F>(self, guard: F, trigger: T) -> Result<Self, BuildError>
    where
        F: Fn(&Context, &P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        let destination = self.definition.state.clone();
        self.add_permit(trigger, destination, Some(Guard::new(guard)))
    }

    fn add_permit(
        self,
        trigger: T,
        destination: S,
        guard: Option<Guard<S, T, P>>,
    ) -> Result<Self, BuildError> {
        match self.definition.triggers.entry(trigger.clone()) {
            Entry::Occupied(_) => {
                return Err(BuildError::DuplicateTrigger {
                    state: self.definition.state.name().to_string(),
                    trigger: trigger.name().to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(TriggerDefinition {
                    destination: destination.clone(),
                    guard,
                });
            }
        }

        self.syntax.edges.push(Edge {
            source: self.definition.state.clone(),
            trigger,
            destination,
        });
        Ok(self)
    }

    /// Run `operation` whenever this state is entered.
    #[track_caller]
    pub fn on_entry<F>(self, operation: F) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.on_entry_with(operation, OperationConfig::default())
    }

    #[track_caller]
    pub fn on_entry_with<F>(self, operation: F, config: OperationConfig) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        let name = operation_name::<F>(config.explicit_name(), Location::caller());
        self.definition
            .callbacks
            .add_entry(None, Arc::new(operation), name);
        self
    }

    /// Run `operation` whenever this state is left.
    #[track_caller]
    pub fn on_exit<F>(self, operation: F) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.on_exit_with(operation, OperationConfig::default())
    }

    #[track_caller]
    pub fn on_exit_with<F>(self, operation: F, config: OperationConfig) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        let name = operation_name::<F>(config.explicit_name(), Location::caller());
        self.definition
            .callbacks
            .add_exit(None, Arc::new(operation), name);
        self
    }

    /// Run `operation` when this state is entered through `trigger`.
    ///
    /// The operation keeps its place in the entry chain relative to
    /// unconditional entries.
    #[track_caller]
    pub fn on_trigger_entry<F>(self, trigger: T, operation: F) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.on_trigger_entry_with(trigger, operation, OperationConfig::default())
    }

    #[track_caller]
    pub fn on_trigger_entry_with<F>(self, trigger: T, operation: F, config: OperationConfig) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        let name = operation_name::<F>(config.explicit_name(), Location::caller());
        self.definition.callbacks.add_entry(
            Some(Guard::trigger_is(trigger, "entry")),
            Arc::new(operation),
            name,
        );
        self
    }

    /// Run `operation` when this state is left through `trigger`.
    #[track_caller]
    pub fn on_trigger_exit<F>(self, trigger: T, operation: F) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.on_trigger_exit_with(trigger, operation, OperationConfig::default())
    }

    #[track_caller]
    pub fn on_trigger_exit_with<F>(self, trigger: T, operation: F, config: OperationConfig) -> Self
    where
        F: Fn(&Context, &mut P, &TransitionRecord<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        let name = operation_name::<F>(config.explicit_name(), Location::caller());
        self.definition.callbacks.add_exit(
            Some(Guard::trigger_is(trigger, "exit")),
            Arc::new(operation),
            name,
        );
        self
    }

    /// Handle a failed entry or exit chain of this state.
    #[track_caller]
    pub fn on_error<F>(self, operation: F) -> Self
    where
        F: Fn(&Context, &mut P, &mut TransitionRecord<S, T>, &Error<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.on_error_with(operation, OperationConfig::default())
    }

    #[track_caller]
    pub fn on_error_with<F>(self, operation: F, config: OperationConfig) -> Self
    where
        F: Fn(&Context, &mut P, &mut TransitionRecord<S, T>, &Error<S, T>) -> Result<(), BoxError>
            + Send
            + Sync
            + 'static,
    {
        let name = operation_name::<F>(config.explicit_name(), Location::caller());
        self.definition
            .callbacks
            .add_error(Arc::new(operation), name);
        self
    }
}
