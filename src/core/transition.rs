//! Per-firing transition record.

use super::state::{State, Trigger};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Record of a single firing attempt.
///
/// One record is created per [`fire`](crate::StateMachine::fire) call and is
/// passed by shared reference to guards, entry/exit operations, and
/// observers. Only error handlers receive `&mut TransitionRecord`, which is
/// what makes [`set_destination`](TransitionRecord::set_destination)
/// reachable from inside a firing.
///
/// # Example
///
/// ```rust
/// use switchyard::core::TransitionRecord;
///
/// let mut record = TransitionRecord::new("Created", "Opened", "Open");
/// assert_eq!(record.destination(), &"Opened");
///
/// record.set_destination("Rejected");
/// assert_eq!(record.destination(), &"Rejected");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(bound(serialize = "S: Serialize, T: Serialize"))]
pub struct TransitionRecord<S: State, T: Trigger> {
    id: Uuid,
    source: S,
    destination: S,
    trigger: T,
    started_at: DateTime<Utc>,
}

impl<S: State, T: Trigger> TransitionRecord<S, T> {
    /// Start a record with a fresh correlation id, stamped now.
    pub fn new(source: S, destination: S, trigger: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            destination,
            trigger,
            started_at: Utc::now(),
        }
    }

    /// Correlation id shared by every log line and callback of one firing.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The state the firing started from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The state the firing is heading to, including any override applied
    /// by an error handler.
    pub fn destination(&self) -> &S {
        &self.destination
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Redirect the reported destination. The payload is left untouched.
    pub fn set_destination(&mut self, state: S) {
        self.destination = state;
    }

    /// Time since the firing began (pure)
    pub fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
