//! Cancellation-carrying context handed to every callback.

use tokio_util::sync::CancellationToken;

/// Context forwarded to guards, operations, error handlers, and observers.
///
/// The engine never inspects the context itself. Whether a callback honours
/// cancellation is left to the callback.
#[derive(Clone, Debug, Default)]
pub struct Context {
    cancellation: CancellationToken,
}

impl Context {
    /// A context that is never cancelled unless [`Context::cancel`] is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// Build a context around an existing token, e.g. one owned by a server.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// A context whose token is a child of this one.
    pub fn child(&self) -> Self {
        Self {
            cancellation: self.cancellation.child_token(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}
