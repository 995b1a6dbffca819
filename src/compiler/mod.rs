//! Static validation of a finished definition.
//!
//! The compiler is a pure pass: it reads the flattened declaration record,
//! reports defects, and hands back an engine over the untouched graph.
//! Checks are accumulated with `Validation` so every defect is reported in
//! one pass instead of stopping at the first.

use crate::core::{State, Trigger};
use crate::graph::StateGraph;
use crate::machine::StateMachine;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

type Check = Validation<(), NonEmptyVec<CompilerMessage>>;

/// Severity of a compiler message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "Compile Error",
            Self::Warning => "Compile Warning",
        })
    }
}

/// One human-readable finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerMessage {
    pub severity: Severity,
    pub message: String,
}

impl CompilerMessage {
    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }
}

impl fmt::Display for CompilerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// The compiler's report plus an engine bound to the same graph.
pub struct CompilerOutput<S: State, T: Trigger, P> {
    pub messages: Vec<CompilerMessage>,
    pub machine: StateMachine<S, T, P>,
}

impl<S: State, T: Trigger, P> CompilerOutput<S, T, P> {
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &CompilerMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompilerMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Warning)
    }

    /// The messages as a JSON array.
    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.messages)
    }

    /// Discard the report and keep the engine.
    pub fn into_machine(self) -> StateMachine<S, T, P> {
        self.machine
    }
}

pub(crate) fn compile<S: State, T: Trigger, P>(graph: StateGraph<S, T, P>) -> CompilerOutput<S, T, P> {
    let messages = match Validation::all_vec(checks(&graph)) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(found) => found.iter().cloned().collect(),
    };

    let errors = messages
        .iter()
        .filter(|m| m.severity == Severity::Error)
        .count();
    debug!(
        states = graph.syntax.states.len(),
        triggers = graph.syntax.edges.len(),
        errors,
        warnings = messages.len() - errors,
        "definition compiled"
    );

    CompilerOutput {
        messages,
        machine: StateMachine::new(graph),
    }
}

fn checks<S: State, T: Trigger, P>(graph: &StateGraph<S, T, P>) -> Vec<Check> {
    let declared: HashSet<&S> = graph.syntax.states.iter().collect();
    let mut checks: Vec<Check> = Vec::new();

    // Dangling destinations
    for edge in &graph.syntax.edges {
        let check = if declared.contains(&edge.destination) {
            Validation::success(())
        } else {
            Validation::fail(CompilerMessage::error(format!(
                "State '{}' undefined: Trigger '{}' declares a transition to this undefined state.",
                edge.destination.name(),
                edge.trigger.name()
            )))
        };
        checks.push(check);
    }

    // Dead ends
    for definition in graph.states.values() {
        let check = if definition.triggers.is_empty() {
            Validation::fail(CompilerMessage::warning(format!(
                "State '{}' is a state without any triggers (deadend state).",
                definition.state.name()
            )))
        } else {
            Validation::success(())
        };
        checks.push(check);
    }

    checks
}
