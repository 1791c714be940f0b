use crate::{EndpointResult, Error};
use std::fmt::{Debug, Formatter};
use tokio::sync::oneshot::{self, Receiver};
use tracing::warn;

type Callback<T> = Box<dyn FnOnce(EndpointResult<T>) + Send + 'static>;

/// Single-use handle terminating one asynchronous call with either a value or an error.
///
/// Completing the handle consumes it, so the underlying callback cannot run twice.
/// A handle dropped without being completed reports [`Error::Abandoned`] to its callback,
/// so every call started with a `Completion` observes exactly one outcome.
///
/// # Examples
///
/// ```
/// use restpoint_core::Completion;
/// use std::sync::mpsc::channel;
///
/// let (sender, receiver) = channel();
/// let completion = Completion::new(move |outcome| sender.send(outcome).unwrap());
/// completion.succeed(7);
///
/// assert_eq!(receiver.recv().unwrap().unwrap(), 7);
/// ```
pub struct Completion<T> {
    callback: Option<Callback<T>>,
}

impl<T: Send + 'static> Completion<T> {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(EndpointResult<T>) + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Deliver the final outcome of the call
    pub fn complete(mut self, outcome: EndpointResult<T>) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }

    #[inline]
    pub fn succeed(self, value: T) {
        self.complete(Ok(value))
    }

    #[inline]
    pub fn fail<E: Into<Error>>(self, error: E) {
        self.complete(Err(error.into()))
    }

    /// Create a completion for an upstream step whose successful value is post-processed by
    /// `then` before reaching this completion. Upstream failures, abandonment included,
    /// are forwarded untouched and `then` never runs for them.
    pub fn chain<U, F>(self, then: F) -> Completion<U>
    where
        U: Send + 'static,
        F: FnOnce(U) -> EndpointResult<T> + Send + 'static,
    {
        Completion::new(move |outcome: EndpointResult<U>| match outcome {
            Ok(value) => self.complete(then(value)),
            Err(err) => self.complete(Err(err)),
        })
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            warn!("Completion dropped without an outcome, reporting the call as abandoned");
            callback(Err(Error::Abandoned));
        }
    }
}

impl<T> Debug for Completion<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// Create a completion whose outcome is handed over, in one step, to the returned receiver.
pub(crate) fn rendezvous<T: Send + 'static>() -> (Completion<T>, Receiver<EndpointResult<T>>) {
    let (sender, receiver) = oneshot::channel();
    let completion = Completion::new(move |outcome| {
        // The waiter may have given up (dropped future), nobody is left to notify then
        let _ = sender.send(outcome);
    });

    (completion, receiver)
}

/// Suspend the calling thread until the outcome carried by `receiver` is available.
///
/// # Panics
///
/// Panics when called from within an asynchronous execution context, see
/// [`tokio::sync::oneshot::Receiver::blocking_recv`].
pub(crate) fn wait<T>(receiver: Receiver<EndpointResult<T>>) -> EndpointResult<T> {
    receiver.blocking_recv().unwrap_or(Err(Error::Abandoned))
}

/// Resolve with the outcome carried by `receiver`.
pub(crate) async fn resolve<T>(receiver: Receiver<EndpointResult<T>>) -> EndpointResult<T> {
    receiver.await.unwrap_or(Err(Error::Abandoned))
}
