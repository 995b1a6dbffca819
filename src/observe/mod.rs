//! Phase-filtered observers notified while a trigger fires.
//!
//! Observers are side-effect-only listeners for telemetry and auditing.
//! They return nothing, cannot fail, and cannot alter the transition.

use crate::core::{Context, State, Trigger, TransitionRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Point in a firing at which observers are notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// After guards pass, before the source state's exit chain.
    BeforeTransition,
    /// Between the source's exit chain and the destination's entry chain.
    BetweenStates,
    /// After the destination's entry chain succeeded.
    AfterTransition,
}

impl Phase {
    fn filter(self) -> PhaseFilter {
        match self {
            Self::BeforeTransition => PhaseFilter::BEFORE,
            Self::BetweenStates => PhaseFilter::BETWEEN,
            Self::AfterTransition => PhaseFilter::AFTER,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeforeTransition => "BeforeTransition",
            Self::BetweenStates => "MiddleTransition",
            Self::AfterTransition => "AfterTransition",
        })
    }
}

/// Bitmask of the phases an observer wants to hear about.
///
/// ```rust
/// use switchyard::observe::{Phase, PhaseFilter};
///
/// let filter = PhaseFilter::BEFORE | PhaseFilter::AFTER;
/// assert!(filter.allows(Phase::AfterTransition));
/// assert!(!filter.allows(Phase::BetweenStates));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseFilter(u8);

impl PhaseFilter {
    pub const NONE: Self = Self(0);
    pub const BEFORE: Self = Self(1);
    pub const BETWEEN: Self = Self(2);
    pub const AFTER: Self = Self(4);
    pub const ALL: Self = Self(1 | 2 | 4);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn allows(self, phase: Phase) -> bool {
        self.intersects(phase.filter())
    }
}

impl Default for PhaseFilter {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for PhaseFilter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Observer callback: phase, payload, transition, and time since the
/// firing began.
pub type Observer<S, T, P> =
    Arc<dyn Fn(&Context, Phase, &P, &TransitionRecord<S, T>, Duration) + Send + Sync>;

/// An observer together with the phases it is registered for.
pub struct ObserverDefinition<S: State, T: Trigger, P> {
    pub filter: PhaseFilter,
    pub observer: Observer<S, T, P>,
}

impl<S: State, T: Trigger, P> Clone for ObserverDefinition<S, T, P> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter,
            observer: Arc::clone(&self.observer),
        }
    }
}

/// Notify, in registration order, every observer whose filter admits
/// `phase`. Returns how many were invoked.
pub fn dispatch<S: State, T: Trigger, P>(
    ctx: &Context,
    phase: Phase,
    observers: &[ObserverDefinition<S, T, P>],
    payload: &P,
    transition: &TransitionRecord<S, T>,
    elapsed: Duration,
) -> usize {
    let mut invoked = 0;
    for definition in observers {
        if definition.filter.allows(phase) {
            (definition.observer)(ctx, phase, payload, transition, elapsed);
            invoked += 1;
        }
    }
    trace!(%phase, invoked, "observers notified");
    invoked
}
