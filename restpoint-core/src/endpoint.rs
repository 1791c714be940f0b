use crate::service::Service;
use http::Method;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// Input/output shape of an endpoint, one of [`Empty`], [`In`], [`Out`] or [`InOut`].
///
/// This trait is sealed, the four shapes above are the only implementations.
pub trait Shape: sealed::Sealed {}

/// Endpoint sending no payload and ignoring the response body
pub enum Empty {}

/// Endpoint sending a payload of type `I` and ignoring the response body
pub struct In<I>(PhantomData<fn() -> I>);

/// Endpoint sending no payload and expecting a response body of type `O`
pub struct Out<O>(PhantomData<fn() -> O>);

/// Endpoint sending a payload of type `I` and expecting a response body of type `O`
pub struct InOut<I, O>(PhantomData<fn() -> (I, O)>);

impl sealed::Sealed for Empty {}
impl<I> sealed::Sealed for In<I> {}
impl<O> sealed::Sealed for Out<O> {}
impl<I, O> sealed::Sealed for InOut<I, O> {}

impl Shape for Empty {}
impl<I> Shape for In<I> {}
impl<O> Shape for Out<O> {}
impl<I, O> Shape for InOut<I, O> {}

/// Declares one network operation: a fixed HTTP method, a per-instance path, the shape of the
/// exchanged payloads and the only service type able to execute it.
///
/// Endpoints are plain values, created for a call and discarded afterward. Implementing this
/// trait unlocks the calling conventions of the matching capability trait, selected from
/// [`Endpoint::Shape`]:
///
/// | Shape            | Capability                         |
/// |------------------|------------------------------------|
/// | `Empty`          | [`crate::EmptyEndpoint`]           |
/// | `In<I>`          | [`crate::InEndpoint`]              |
/// | `Out<O>`         | [`crate::OutEndpoint`]             |
/// | `InOut<I, O>`    | [`crate::InOutEndpoint`]           |
///
/// # Examples
///
/// ```
/// use restpoint_core::{Endpoint, Out, Route};
/// # use restpoint_core::{Completion, DecodingError, EncodingError, Service};
/// # use bytes::Bytes;
/// # use serde::{Serialize, de::DeserializeOwned};
/// use std::borrow::Cow;
///
/// # struct Api;
/// # impl Service for Api {
/// #     fn encode<I: Serialize + ?Sized>(&self, _: &Route, _: &I) -> Result<Bytes, EncodingError> { unimplemented!() }
/// #     fn perform(&self, _: Route, _: Option<Bytes>, _: Completion<Bytes>) {}
/// #     fn decode<O: DeserializeOwned>(&self, _: &Route, _: Bytes) -> Result<O, DecodingError> { unimplemented!() }
/// # }
/// struct GetUser {
///     id: u32,
/// }
///
/// impl Endpoint for GetUser {
///     type Service = Api;
///     type Shape = Out<String>;
///     const METHOD: http::Method = http::Method::GET;
///
///     fn path(&self) -> Cow<'_, str> {
///         Cow::Owned(format!("/users/{}", self.id))
///     }
/// }
///
/// assert_eq!(GetUser { id: 7 }.route().to_string(), "GET /users/7");
/// ```
pub trait Endpoint {
    /// Service type executing this endpoint
    type Service: Service;

    /// Whether this endpoint sends and/or expects a payload
    type Shape: Shape;

    /// HTTP verb, identical for every instance of the endpoint
    const METHOD: Method;

    /// Path, relative to the service's base location
    fn path(&self) -> Cow<'_, str>;

    /// Transport-neutral description of the call targeting this endpoint
    #[inline]
    fn route(&self) -> Route {
        Route::new(Self::METHOD, self.path())
    }
}

/// Method and path of one call, as handed over to a [`Service`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    method: Method,
    path: String,
}

impl Route {
    pub fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
