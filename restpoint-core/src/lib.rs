mod completion;
mod dispatch;
mod endpoint;
pub mod environ;
mod service;

#[cfg(test)]
pub(crate) mod testing;

use std::borrow::Cow;

use crate::environ::EnvironmentError;
use thiserror::Error;

pub use completion::Completion;
pub use dispatch::{EmptyEndpoint, InEndpoint, InOutEndpoint, OutEndpoint};
pub use endpoint::{Empty, Endpoint, In, InOut, Out, Route, Shape};
pub use http;
pub use service::{
    BoxError, DecodingError, EncodingError, Service, SharedService, TransportError,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to encode request payload: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Transport call failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to decode response payload: {0}")]
    Decoding(#[from] DecodingError),

    #[error("The service dropped the request without completing it")]
    Abandoned,

    #[error("{0}")]
    Environment(#[from] EnvironmentError),

    #[error("{0}")]
    Runtime(Cow<'static, str>),
}

/// Result with predefined restpoint-core::Error as the Error type
pub type EndpointResult<T> = Result<T, Error>;
