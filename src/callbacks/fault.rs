//! Fault containment for callbacks that panic.

use crate::core::{BoxError, State, Trigger, TransitionRecord};
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::cell::{Cell, RefCell};
use std::sync::{Mutex, Once};
use thiserror::Error;

/// A guard, operation, or error handler panicked during a firing.
///
/// This signals a defect in the callback rather than a business condition.
/// Contained panics are not printed by the panic hook; the report lives here.
#[derive(Debug, Error)]
#[error(
    "step {step} '{step_name}' faulted while firing '{}' from '{}' to '{}': {cause}",
    .transition.trigger().name(),
    .transition.source().name(),
    .transition.destination().name()
)]
pub struct FaultError<S: State, T: Trigger> {
    step: usize,
    step_name: String,
    #[source]
    cause: FaultCause,
    stack: String,
    transition: TransitionRecord<S, T>,
}

impl<S: State, T: Trigger> FaultError<S, T> {
    pub(crate) fn new(
        step: usize,
        step_name: impl Into<String>,
        cause: FaultCause,
        stack: String,
        transition: TransitionRecord<S, T>,
    ) -> Self {
        Self {
            step,
            step_name: step_name.into(),
            cause,
            stack,
            transition,
        }
    }

    /// Number of operations actually invoked before the faulting one.
    /// Entries skipped by their guard are not counted.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Diagnostic name of the faulting step.
    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    pub fn cause(&self) -> &FaultCause {
        &self.cause
    }

    /// Backtrace captured at the panic site.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Snapshot of the transition as the faulting step saw it.
    pub fn transition(&self) -> &TransitionRecord<S, T> {
        &self.transition
    }
}

/// The panic payload of a contained fault.
#[derive(Debug, Error)]
pub enum FaultCause {
    /// The callback panicked with a boxed error (`std::panic::panic_any`).
    #[error("{0}")]
    Error(#[source] BoxError),

    /// The callback panicked with a message (`panic!`).
    #[error("{0}")]
    Message(String),

    /// Any other payload type.
    #[error("panic with a non-error payload")]
    Opaque(OpaquePanic),
}

impl FaultCause {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<BoxError>() {
            Ok(err) => return Self::Error(*err),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<String>() {
            Ok(message) => return Self::Message(*message),
            Err(payload) => payload,
        };
        match payload.downcast::<&'static str>() {
            Ok(message) => Self::Message((*message).to_string()),
            Err(payload) => Self::Opaque(OpaquePanic::new(payload)),
        }
    }
}

/// Holder for a panic payload that is neither an error nor a message.
pub struct OpaquePanic {
    payload: Mutex<Option<Box<dyn Any + Send>>>,
}

impl OpaquePanic {
    fn new(payload: Box<dyn Any + Send>) -> Self {
        Self {
            payload: Mutex::new(Some(payload)),
        }
    }

    /// Take the original payload out, e.g. to re-raise it with
    /// `std::panic::resume_unwind`. Returns `None` once taken.
    pub fn take(&self) -> Option<Box<dyn Any + Send>> {
        match self.payload.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl fmt::Debug for OpaquePanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaquePanic(..)")
    }
}

thread_local! {
    static CONTAINING: Cell<usize> = const { Cell::new(0) };
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

// Panics inside a `contain` scope are recorded silently with the backtrace
// of the panic site. Everything else goes to the hook that was installed
// before ours.
fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAINING.with(Cell::get) > 0 {
                let stack = Backtrace::force_capture().to_string();
                CAPTURED.with(|slot| *slot.borrow_mut() = Some(stack));
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f`, converting a panic into its cause and the backtrace taken at
/// the panic site.
///
/// Contained panics are not reported to the process panic hook.
pub(crate) fn contain<R>(f: impl FnOnce() -> R) -> Result<R, (FaultCause, String)> {
    install_hook();
    CAPTURED.with(|slot| *slot.borrow_mut() = None);

    CONTAINING.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CONTAINING.with(|depth| depth.set(depth.get() - 1));

    result.map_err(|payload| {
        // The slot stays empty if another hook replaced ours.
        let stack = CAPTURED
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string());
        (FaultCause::from_panic(payload), stack)
    })
}
