//! Diagnostic options for states and operations.

use serde::{Deserialize, Serialize};

/// Display metadata for a state.
///
/// Unset fields default when the state is declared: the name to the state
/// label, the description to an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    name: Option<String>,
    description: Option<String>,
}

impl StateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the free-text description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn resolve(self, label: &str) -> (String, String) {
        (
            self.name.unwrap_or_else(|| label.to_string()),
            self.description.unwrap_or_default(),
        )
    }
}

/// Diagnostic metadata for an entry, exit, or error operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationConfig {
    name: Option<String>,
}

impl OperationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name reported when the operation faults.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
