//! The state/trigger graph and its read-only traversal interface.
//!
//! Renderers (Graphviz, PlantUML and the like) live outside this crate and
//! only ever see the graph through [`Graph`].

use crate::callbacks::Callbacks;
use crate::core::{Guard, State, Trigger};
use crate::observe::ObserverDefinition;
use indexmap::IndexMap;

/// Read-only, repeatable traversal of a definition.
///
/// Nodes are visited in declaration order, edges state by state in
/// declaration order, and within a state in `permit` order.
pub trait Graph<S: State, T: Trigger> {
    /// Visit every state with its display name and description.
    fn for_each_node(&self, visit: &mut dyn FnMut(&S, &str, &str));

    /// Visit every edge as `(source, destination, trigger)`.
    fn for_each_edge(&self, visit: &mut dyn FnMut(&S, &S, &T));
}

/// Exporter fed by [`Graph`] traversal.
///
/// # Example
///
/// ```rust
/// use switchyard::graph::{Graph, Renderer};
///
/// struct EdgeList(Vec<String>);
///
/// impl Renderer<&'static str, &'static str> for EdgeList {
///     type Error = std::convert::Infallible;
///
///     fn render(&mut self, graph: &dyn Graph<&'static str, &'static str>) -> Result<(), Self::Error> {
///         graph.for_each_edge(&mut |from, to, trigger| {
///             self.0.push(format!("{from} -{trigger}-> {to}"));
///         });
///         Ok(())
///     }
/// }
/// ```
pub trait Renderer<S: State, T: Trigger> {
    type Error;

    fn render(&mut self, graph: &dyn Graph<S, T>) -> Result<(), Self::Error>;
}

pub(crate) struct TriggerDefinition<S: State, T: Trigger, P> {
    pub destination: S,
    pub guard: Option<Guard<S, T, P>>,
}

pub(crate) struct StateDefinition<S: State, T: Trigger, P> {
    pub state: S,
    pub display_name: String,
    pub description: String,
    pub triggers: IndexMap<T, TriggerDefinition<S, T, P>>,
    pub callbacks: Callbacks<S, T, P>,
}

impl<S: State, T: Trigger, P> StateDefinition<S, T, P> {
    pub fn new(state: S, display_name: String, description: String) -> Self {
        Self {
            state,
            display_name,
            description,
            triggers: IndexMap::new(),
            callbacks: Callbacks::new(),
        }
    }
}

/// One `permit` declaration, independent of the state that owns it.
#[derive(Clone, Debug)]
pub(crate) struct Edge<S: State, T: Trigger> {
    pub source: S,
    pub trigger: T,
    pub destination: S,
}

/// Append-only, flattened record of every declaration, read by the compiler.
#[derive(Clone, Debug)]
pub(crate) struct AbstractSyntax<S: State, T: Trigger> {
    pub states: Vec<S>,
    pub edges: Vec<Edge<S, T>>,
}

impl<S: State, T: Trigger> Default for AbstractSyntax<S, T> {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            edges: Vec::new(),
        }
    }
}

pub(crate) struct StateGraph<S: State, T: Trigger, P> {
    pub states: IndexMap<S, StateDefinition<S, T, P>>,
    pub observers: Vec<ObserverDefinition<S, T, P>>,
    pub syntax: AbstractSyntax<S, T>,
}

impl<S: State, T: Trigger, P> StateGraph<S, T, P> {
    pub fn new() -> Self {
        Self {
            states: IndexMap::new(),
            observers: Vec::new(),
            syntax: AbstractSyntax::default(),
        }
    }
}

impl<S: State, T: Trigger, P> Graph<S, T> for StateGraph<S, T, P> {
    fn for_each_node(&self, visit: &mut dyn FnMut(&S, &str, &str)) {
        for definition in self.states.values() {
            visit(
                &definition.state,
                &definition.display_name,
                &definition.description,
            );
        }
    }

    // A state's permits are recorded contiguously, so the flat record is
    // already in state order, then permit order.
    fn for_each_edge(&self, visit: &mut dyn FnMut(&S, &S, &T)) {
        for edge in &self.syntax.edges {
            visit(&edge.source, &edge.destination, &edge.trigger);
        }
    }
}
