//! In-process HTTP transport for `restpoint` endpoints.
//!
//! [`RouterService`] executes endpoints against an `axum::Router`, without any socket involved,
//! encoding bodies with a pluggable [`Codec`] ([`Json`] by default).

mod codec;
pub mod environ;
pub mod error;
pub mod headers;
mod routes;
mod service;

pub use codec::{Codec, Json};
pub use error::HttpError;
pub use routes::{Health, StatusRouter};
pub use service::{RouterConfig, RouterService};

pub type HttpResult<T> = Result<T, HttpError>;
