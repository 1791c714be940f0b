use crate::codec::{Codec, Json};
use crate::environ::{BasePath, Timeout, WorkerThreads};
use crate::headers::RequestId;
use crate::routes::StatusRouter;
use crate::{HttpError, HttpResult};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use bytes::Bytes;
use headers::HeaderMapExt;
use http_body_util::BodyExt;
use restpoint_core::environ::{EnvironmentError, TryFromEnv};
use restpoint_core::{
    Completion, DecodingError, EncodingError, Error, Route, Service, SharedService,
    TransportError,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, OnceLock};
use tokio::runtime::{Builder, Handle, Runtime};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, error, info, instrument};

static DEFAULT_SERVICE: OnceLock<Arc<RouterService>> = OnceLock::new();

/// Settings of a [`RouterService`]
#[derive(Clone, Debug, Default)]
pub struct RouterConfig {
    /// Maximum duration of a route before it is answered with `408 Request Timeout`
    pub timeout: Timeout,

    /// Size of the runtime owned by the service, ignored when running on an existing runtime
    pub worker_threads: WorkerThreads,

    /// Prefix prepended to every endpoint path, the router given to the service is mounted
    /// under it and must declare its routes without the prefix
    pub base_path: BasePath,
}

impl RouterConfig {
    /// Read every setting from its environment variable, see [`crate::environ`]
    pub fn try_from_env() -> Result<Self, EnvironmentError> {
        Ok(Self {
            timeout: Timeout::try_from_env()?,
            worker_threads: WorkerThreads::try_from_env()?,
            base_path: BasePath::try_from_env()?,
        })
    }
}

/// Runtime owned by a service, shut down without waiting for in-flight calls.
///
/// The last reference to a service may be released from one of the runtime's own workers
/// (completions hold the service), where a blocking shutdown is not allowed.
struct BackgroundRuntime(Option<Runtime>);

impl Drop for BackgroundRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// [`Service`] executing endpoints against an in-process `axum::Router`.
///
/// Each call is turned into an HTTP request, body encoded with the service's [`Codec`], and
/// driven through the router on a tokio runtime. Completions are therefore always delivered
/// from a runtime worker, never from the thread issuing the call, which makes the blocking
/// calling conventions safe to use from any thread living outside of that runtime.
///
/// Responses with a non-success status fail with [`TransportError::Status`], keeping the
/// response body around for inspection.
///
/// Every router is wrapped with request tracing, `x-request-id` generation and propagation,
/// and the configured timeout. A `/health` route, matched by the [`crate::Health`] endpoint,
/// is mounted under the base path.
pub struct RouterService<C = Json> {
    router: Router,
    codec: C,
    base_path: BasePath,
    handle: Handle,
    _runtime: Option<BackgroundRuntime>,
}

impl RouterService<Json> {
    /// Create a service driving `router` on its own multi-threaded runtime.
    ///
    /// # Panics
    ///
    /// Panics if `router` already defines the `/health` route under the base path.
    pub fn new(router: Router, config: RouterConfig) -> HttpResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads.get())
            .thread_name("restpoint-transport")
            .enable_all()
            .build()?;

        let handle = runtime.handle().clone();
        Ok(Self::assemble(
            router,
            config,
            handle,
            Some(BackgroundRuntime(Some(runtime))),
        ))
    }

    /// Create a service driving `router` on its own runtime, configured from the environment.
    pub fn from_env(router: Router) -> HttpResult<Self> {
        let config = RouterConfig::try_from_env().map_err(Error::Environment)?;
        Self::new(router, config)
    }

    /// Create a service driving `router` on the runtime behind `handle`.
    ///
    /// Blocking calls must not be issued from that runtime's threads.
    pub fn with_handle(router: Router, config: RouterConfig, handle: Handle) -> Self {
        Self::assemble(router, config, handle, None)
    }

    /// Register this service as the process-wide default one, used by endpoints called
    /// without an explicit service.
    ///
    /// # Errors
    ///
    /// Fails with [`HttpError::AlreadyInstalled`] once a default service exists, including the
    /// one lazily created by the first call relying on it.
    pub fn install(self) -> HttpResult<Arc<Self>> {
        let service = Arc::new(self);
        DEFAULT_SERVICE
            .set(Arc::clone(&service))
            .map_err(|_| HttpError::AlreadyInstalled)?;

        info!("Installed default router service");
        Ok(service)
    }

    fn assemble(
        router: Router,
        config: RouterConfig,
        handle: Handle,
        runtime: Option<BackgroundRuntime>,
    ) -> Self {
        let router = router
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer::<TimeoutLayer>(config.timeout.into()),
            )
            .merge(Router::from(StatusRouter));

        let router = if config.base_path.as_str().is_empty() {
            router
        } else {
            Router::new().nest(config.base_path.as_str(), router)
        };

        Self {
            router,
            codec: Json,
            base_path: config.base_path,
            handle,
            _runtime: runtime,
        }
    }
}

impl<C: Codec> RouterService<C> {
    /// Swap the wire format used to encode inputs and decode outputs
    pub fn with_codec<D: Codec>(self, codec: D) -> RouterService<D> {
        RouterService {
            router: self.router,
            codec,
            base_path: self.base_path,
            handle: self.handle,
            _runtime: self._runtime,
        }
    }

    /// Runtime delivering the completions of this service
    #[inline]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn prepare(
        &self,
        route: &Route,
        payload: Option<Bytes>,
    ) -> Result<Request<Body>, TransportError> {
        let mut builder = Request::builder()
            .method(route.method().clone())
            .uri(self.base_path.join(route.path()))
            .header(header::ACCEPT, C::CONTENT_TYPE);

        let body = match payload {
            Some(payload) => {
                builder = builder.header(header::CONTENT_TYPE, C::CONTENT_TYPE);
                Body::from(payload)
            }
            None => Body::empty(),
        };

        builder
            .body(body)
            .map_err(|err| TransportError::InvalidRequest(err.to_string().into()))
    }
}

/// Drive `request` through `router` and collect the response body
async fn exchange(router: Router, request: Request<Body>) -> Result<Bytes, TransportError> {
    let response = router
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});

    let status = response.status();
    match response.headers().typed_get::<RequestId>() {
        Some(request_id) => debug!("Router answered {status} (x-request-id: {})", &*request_id),
        None => debug!("Router answered {status}"),
    }

    let body = response
        .into_body()
        .collect()
        .await
        .map_err(TransportError::failed)?
        .to_bytes();

    if status.is_success() {
        Ok(body)
    } else {
        Err(TransportError::Status { status, body })
    }
}

impl<C: Codec> Service for RouterService<C> {
    #[inline]
    fn encode<I>(&self, _: &Route, input: &I) -> Result<Bytes, EncodingError>
    where
        I: Serialize + ?Sized,
    {
        self.codec.encode(input)
    }

    #[instrument(skip_all, fields(route = %route))]
    fn perform(&self, route: Route, payload: Option<Bytes>, completion: Completion<Bytes>) {
        let request = match self.prepare(&route, payload) {
            Ok(request) => request,
            Err(err) => {
                error!("Unable to build request for {route}: {err}");
                return completion.fail(err);
            }
        };

        let router = self.router.clone();
        self.handle.spawn(
            async move {
                match exchange(router, request).await {
                    Ok(body) => completion.succeed(body),
                    Err(err) => {
                        error!("Transport call {route} failed: {err}");
                        completion.fail(err)
                    }
                }
            }
            .in_current_span(),
        );
    }

    #[inline]
    fn decode<O>(&self, _: &Route, response: Bytes) -> Result<O, DecodingError>
    where
        O: DeserializeOwned,
    {
        self.codec.decode(&response)
    }
}

impl SharedService for RouterService {
    /// Installed default service or, if none, a service configured from the environment which
    /// only exposes the status routes.
    fn shared() -> Result<Arc<Self>, Error> {
        if let Some(service) = DEFAULT_SERVICE.get() {
            return Ok(Arc::clone(service));
        }

        let fallback = RouterService::from_env(Router::new())?;
        Ok(Arc::clone(DEFAULT_SERVICE.get_or_init(|| Arc::new(fallback))))
    }
}
