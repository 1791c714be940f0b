//! Typed REST endpoints dispatched through pluggable services.
//!
//! An endpoint declares its method, its path and the shape of its payloads, then gets called
//! through a callback, a blocking call or a `Future`, all three reporting the same outcome.
//!
//! # Examples
//!
//! ```
//! use axum::routing::get;
//! use axum::{Json, Router};
//! use restpoint::router::{RouterConfig, RouterService};
//! use restpoint::prelude::*;
//! use serde::Deserialize;
//! use std::borrow::Cow;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! struct GetUser {
//!     id: u32,
//! }
//!
//! impl Endpoint for GetUser {
//!     type Service = RouterService;
//!     type Shape = Out<User>;
//!     const METHOD: Method = Method::GET;
//!
//!     fn path(&self) -> Cow<'_, str> {
//!         Cow::Owned(format!("/users/{}", self.id))
//!     }
//! }
//!
//! let router = Router::new().route(
//!     "/users/{id}",
//!     get(|| async { Json(serde_json::json!({"id": 7, "name": "x"})) }),
//! );
//! let service = Arc::new(RouterService::new(router, RouterConfig::default()).unwrap());
//!
//! let user = GetUser { id: 7 }.request_blocking_with(&service).unwrap();
//! assert_eq!(user.id, 7);
//! assert_eq!(user.name, "x");
//! ```

pub use restpoint_core::*;

#[cfg(feature = "http")]
pub use restpoint_http as router;

/// Everything needed to declare and call endpoints
pub mod prelude {
    pub use restpoint_core::http::Method;
    pub use restpoint_core::{
        Empty, EmptyEndpoint, Endpoint, EndpointResult, Error, In, InEndpoint, InOut,
        InOutEndpoint, Out, OutEndpoint,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_http_names_the_same_crate_with_or_without_router() {
        let method: crate::http::Method = restpoint_core::http::Method::GET;
        assert_eq!(method, crate::prelude::Method::GET);
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_router_reexports_the_transport_crate() {
        let config = crate::router::RouterConfig::default();
        assert!(crate::router::RouterService::new(axum::Router::new(), config).is_ok());
    }
}
