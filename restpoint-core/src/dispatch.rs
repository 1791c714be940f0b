use crate::completion::{rendezvous, resolve, wait};
use crate::endpoint::{Empty, Endpoint, In, InOut, Out, Route};
use crate::service::{Service, SharedService};
use crate::{Completion, EndpointResult};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{Span, debug, instrument};

/// Hand the request over to the service, then turn the raw response into the call's outcome
/// through `finish`. Transport failures reach `completion` without `finish` being invoked.
#[instrument(skip_all, fields(route = %route))]
fn execute<S, T, F>(
    service: &Arc<S>,
    route: Route,
    payload: Option<Bytes>,
    finish: F,
    completion: Completion<T>,
) where
    S: Service,
    T: Send + 'static,
    F: FnOnce(&S, &Route, Bytes) -> EndpointResult<T> + Send + 'static,
{
    let span = Span::current();
    let owned = Arc::clone(service);
    let target = route.clone();
    let transport = completion.chain(move |response: Bytes| {
        span.in_scope(|| {
            debug!("Transport completed with {} bytes", response.len());
            finish(&owned, &target, response)
        })
    });

    debug!("Performing transport call (payload: {})", payload.is_some());
    service.perform(route, payload, transport);
}

/// Encode `input` and execute the call, no transport happens if the encoding fails.
fn execute_with_input<S, I, T, F>(
    service: &Arc<S>,
    route: Route,
    input: &I,
    finish: F,
    completion: Completion<T>,
) where
    S: Service,
    I: Serialize + ?Sized,
    T: Send + 'static,
    F: FnOnce(&S, &Route, Bytes) -> EndpointResult<T> + Send + 'static,
{
    match service.encode(&route, input) {
        Ok(payload) => execute(service, route, Some(payload), finish, completion),
        Err(err) => {
            debug!("Failed to encode input for {route}: {err}");
            completion.fail(err)
        }
    }
}

#[inline]
fn discard<S: Service>(_: &S, _: &Route, _: Bytes) -> EndpointResult<()> {
    Ok(())
}

fn decode<S: Service, O: DeserializeOwned>(
    service: &S,
    route: &Route,
    response: Bytes,
) -> EndpointResult<O> {
    service.decode(route, response).map_err(|err| {
        debug!("Failed to decode response for {route}: {err}");
        err.into()
    })
}

/// Run `start` against the process-wide default service, or fail `completion` if none is available
fn with_shared<S, T, F>(completion: Completion<T>, start: F)
where
    S: SharedService,
    T: Send + 'static,
    F: FnOnce(&Arc<S>, Completion<T>),
{
    match S::shared() {
        Ok(service) => start(&service, completion),
        Err(err) => {
            debug!("Default service is unavailable: {err}");
            completion.fail(err)
        }
    }
}

/// Expands to the callback, blocking and `Future` calling conventions, on top of the
/// capability trait's `start` method, for both explicit and default services.
macro_rules! calling_conventions {
    ($output: ty $(, $input: ident: $input_ty: ty)?) => {
        /// Issue the call through `service`, `on_complete` is invoked exactly once with the
        /// outcome.
        fn request_with<F>(
            &self,
            service: &Arc<Self::Service>,
            $($input: &$input_ty,)?
            on_complete: F,
        )
        where
            F: FnOnce(EndpointResult<$output>) + Send + 'static,
        {
            Self::start(self, service, $($input,)? Completion::new(on_complete))
        }

        /// Issue the call through the default service, `on_complete` is invoked exactly once
        /// with the outcome.
        fn request<F>(&self, $($input: &$input_ty,)? on_complete: F)
        where
            Self::Service: SharedService,
            F: FnOnce(EndpointResult<$output>) + Send + 'static,
        {
            with_shared::<Self::Service, _, _>(Completion::new(on_complete), |service, completion| {
                Self::start(self, service, $($input,)? completion)
            })
        }

        /// Issue the call through `service` and suspend the calling thread until it completes.
        ///
        /// # Panics
        ///
        /// Panics when invoked from an asynchronous execution context. The calling thread must
        /// also differ from the one the service completes calls on, or it never wakes up.
        fn request_blocking_with(
            &self,
            service: &Arc<Self::Service>,
            $($input: &$input_ty,)?
        ) -> EndpointResult<$output> {
            let (completion, outcome) = rendezvous();
            Self::start(self, service, $($input,)? completion);
            wait(outcome)
        }

        /// Issue the call through the default service and suspend the calling thread until it
        /// completes.
        ///
        /// # Panics
        ///
        /// See [`Self::request_blocking_with`].
        fn request_blocking(&self, $($input: &$input_ty,)?) -> EndpointResult<$output>
        where
            Self::Service: SharedService,
        {
            let (completion, outcome) = rendezvous();
            with_shared::<Self::Service, _, _>(completion, |service, completion| {
                Self::start(self, service, $($input,)? completion)
            });
            wait(outcome)
        }

        /// Issue the call through `service` right away, the returned future resolves with its
        /// outcome.
        fn call_with(
            &self,
            service: &Arc<Self::Service>,
            $($input: &$input_ty,)?
        ) -> impl Future<Output = EndpointResult<$output>> + Send {
            let (completion, outcome) = rendezvous();
            Self::start(self, service, $($input,)? completion);
            resolve(outcome)
        }

        /// Issue the call through the default service right away, the returned future resolves
        /// with its outcome.
        fn call(
            &self,
            $($input: &$input_ty,)?
        ) -> impl Future<Output = EndpointResult<$output>> + Send
        where
            Self::Service: SharedService,
        {
            let (completion, outcome) = rendezvous();
            with_shared::<Self::Service, _, _>(completion, |service, completion| {
                Self::start(self, service, $($input,)? completion)
            });
            resolve(outcome)
        }
    };
}

/// Calling conventions of endpoints neither sending nor expecting a payload
pub trait EmptyEndpoint: Endpoint {
    /// Perform the call, the response body is ignored
    fn start(&self, service: &Arc<Self::Service>, completion: Completion<()>) {
        execute(service, self.route(), None, discard, completion)
    }

    calling_conventions!(());
}

impl<E> EmptyEndpoint for E where E: Endpoint<Shape = Empty> {}

/// Calling conventions of endpoints sending a payload and ignoring the response body
pub trait InEndpoint: Endpoint {
    type Input: Serialize;

    /// Encode `input` then perform the call, the response body is ignored
    fn start(&self, service: &Arc<Self::Service>, input: &Self::Input, completion: Completion<()>) {
        execute_with_input(service, self.route(), input, discard, completion)
    }

    calling_conventions!((), input: Self::Input);
}

impl<E, I> InEndpoint for E
where
    E: Endpoint<Shape = In<I>>,
    I: Serialize,
{
    type Input = I;
}

/// Calling conventions of endpoints sending no payload and expecting a response body
pub trait OutEndpoint: Endpoint {
    type Output: DeserializeOwned + Send + 'static;

    /// Perform the call then decode the response body
    fn start(&self, service: &Arc<Self::Service>, completion: Completion<Self::Output>) {
        execute(service, self.route(), None, decode, completion)
    }

    calling_conventions!(Self::Output);
}

impl<E, O> OutEndpoint for E
where
    E: Endpoint<Shape = Out<O>>,
    O: DeserializeOwned + Send + 'static,
{
    type Output = O;
}

/// Calling conventions of endpoints both sending a payload and expecting a response body
pub trait InOutEndpoint: Endpoint {
    type Input: Serialize;
    type Output: DeserializeOwned + Send + 'static;

    /// Encode `input`, perform the call then decode the response body
    fn start(
        &self,
        service: &Arc<Self::Service>,
        input: &Self::Input,
        completion: Completion<Self::Output>,
    ) {
        execute_with_input(service, self.route(), input, decode, completion)
    }

    calling_conventions!(Self::Output, input: Self::Input);
}

impl<E, I, O> InOutEndpoint for E
where
    E: Endpoint<Shape = InOut<I, O>>,
    I: Serialize,
    O: DeserializeOwned + Send + 'static,
{
    type Input = I;
    type Output = O;
}
