use crate::RouterService;
use axum::Router;
use axum::http::{Method, StatusCode};
use axum::routing::get;
use restpoint_core::{Empty, Endpoint};
use std::borrow::Cow;
use tracing::instrument;

pub(crate) const HEALTH_PATH: &str = "/health";

#[instrument]
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Provides all the routes to report status
#[derive(Default)]
pub struct StatusRouter;

/// Convert the underlying `StatusRouter` to an `axum::Router` to be merged with the user's routes
impl From<StatusRouter> for Router {
    fn from(_: StatusRouter) -> Self {
        Router::new().route(HEALTH_PATH, get(health).head(health))
    }
}

/// Healthiness probe of the router behind a [`RouterService`]
#[derive(Copy, Clone, Debug, Default)]
pub struct Health;

impl Endpoint for Health {
    type Service = RouterService;
    type Shape = Empty;
    const METHOD: Method = Method::GET;

    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed(HEALTH_PATH)
    }
}
