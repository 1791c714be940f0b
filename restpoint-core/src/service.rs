use crate::endpoint::Route;
use crate::{Completion, Error};
use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Opaque, thread-safe, error produced by a service implementation
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The input of a call could not be serialized to the service's wire format
#[derive(Debug, ThisError)]
#[error("{0}")]
pub struct EncodingError(#[source] BoxError);

impl EncodingError {
    pub fn new<E: Into<BoxError>>(cause: E) -> Self {
        Self(cause.into())
    }
}

/// The raw response of a call does not match the expected output shape
#[derive(Debug, ThisError)]
#[error("{0}")]
pub struct DecodingError(#[source] BoxError);

impl DecodingError {
    pub fn new<E: Into<BoxError>>(cause: E) -> Self {
        Self(cause.into())
    }
}

/// The network, or service-level, part of a call failed
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Remote answered with status {status}")]
    Status { status: StatusCode, body: Bytes },

    #[error("Unable to build the request: {0}")]
    InvalidRequest(Cow<'static, str>),

    #[error("{0}")]
    Failed(#[source] BoxError),
}

impl TransportError {
    pub fn failed<E: Into<BoxError>>(cause: E) -> Self {
        Self::Failed(cause.into())
    }

    /// HTTP status returned by the remote, if the failure originates from one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Transport and codec collaborator performing the calls declared by endpoints.
///
/// The dispatcher only drives the `encode -> perform -> decode` sequence, every concern about
/// the wire (connection, URL, headers, status handling, serialization format) belongs to the
/// implementation.
///
/// # Contract
///
/// `perform` must eventually complete the provided [`Completion`], with either the raw response
/// or a [`TransportError`]. Blocking callers are suspended until it does. Dropping the
/// completion instead is reported to the caller as [`Error::Abandoned`].
///
/// Implementations are shared between threads and must tolerate concurrent calls.
pub trait Service: Send + Sync + 'static {
    /// Serialize `input` into a transport-neutral payload for `route`
    fn encode<I>(&self, route: &Route, input: &I) -> Result<Bytes, EncodingError>
    where
        I: Serialize + ?Sized;

    /// Execute `route`, with the optional `payload` as body, and complete with the raw response
    fn perform(&self, route: Route, payload: Option<Bytes>, completion: Completion<Bytes>);

    /// Deserialize the raw `response` of `route` into the expected output
    fn decode<O>(&self, route: &Route, response: Bytes) -> Result<O, DecodingError>
    where
        O: DeserializeOwned;
}

/// Service exposing a lazily initialized, process-wide, default instance.
///
/// Endpoint calls which do not receive an explicit service go through this instance.
pub trait SharedService: Service + Sized {
    fn shared() -> Result<Arc<Self>, Error>;
}
