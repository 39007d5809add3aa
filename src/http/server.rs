//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gate and forwarding handler
//! - Wire up middleware (request ID, tracing, timeout, gate)
//! - Publish reloaded policy generations atomically
//! - Forward allowed requests to the scope's upstream

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::{
    body::Body,
    extract::{Extension, State},
    http::{Request, StatusCode, Uri, Version},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::http::middleware::{legacy_gate_middleware, MatchedScope};
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::strip_hop_by_hop;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::ScopeRouter;

/// One published configuration generation.
#[derive(Debug)]
pub struct Runtime {
    pub generation: u64,
    pub router: ScopeRouter,
}

impl Runtime {
    pub fn new(generation: u64, router: ScopeRouter) -> Self {
        Self { generation, router }
    }
}

/// Current generation, swapped whole on reload.
pub type SharedRuntime = Arc<ArcSwap<Runtime>>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: SharedRuntime,
    pub client: Client<HttpConnector, Body>,
    pub in_flight: Arc<Semaphore>,
}

impl AppState {
    pub fn new(runtime: Runtime, config: &GateConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            runtime: Arc::new(ArcSwap::from_pointee(runtime)),
            client,
            in_flight: Arc::new(Semaphore::new(config.listener.max_in_flight)),
        }
    }
}

/// HTTP server fronted by the legacy protocol gate.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Self {
        let runtime = Runtime::new(0, ScopeRouter::from_config(&config));
        metrics::record_generation(0);
        let state = AppState::new(runtime, &config);
        let router = build_router(&config, state.clone());
        Self { router, state }
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Policy updates arriving on `config_updates` are published without
    /// interrupting in-flight requests. Listener, timeout and limit settings
    /// only take effect on restart.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        tokio::spawn(apply_reloads(self.state.runtime.clone(), config_updates));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signals::terminate() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GateConfig, state: AppState) -> Router {
    Router::new()
        .fallback(forward_handler)
        .layer(middleware::from_fn_with_state(
            state.runtime.clone(),
            legacy_gate_middleware,
        ))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Publish each validated configuration as a new generation.
async fn apply_reloads(runtime: SharedRuntime, mut updates: mpsc::UnboundedReceiver<GateConfig>) {
    while let Some(config) = updates.recv().await {
        let router = ScopeRouter::from_config(&config);
        let generation = runtime.load().generation + 1;
        runtime.store(Arc::new(Runtime::new(generation, router)));
        metrics::record_generation(generation);
        tracing::info!(generation, "Policy configuration reloaded");
    }
}

/// Forwards requests that passed the gate to the scope's upstream.
async fn forward_handler(
    State(state): State<AppState>,
    Extension(MatchedScope(scope)): Extension<MatchedScope>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let Some(upstream) = scope.upstream.as_deref() else {
        tracing::debug!(request_id = %request_id, scope = %scope.label, "No upstream configured");
        return (StatusCode::NOT_FOUND, "No upstream configured").into_response();
    };

    let Ok(_permit) = state.in_flight.acquire().await else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    let (mut parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Authority::from_str(upstream).ok();
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let Ok(uri) = Uri::from_parts(uri_parts) else {
        tracing::error!(request_id = %request_id, upstream = %upstream, "Invalid upstream URI");
        return (StatusCode::BAD_GATEWAY, "Invalid upstream").into_response();
    };

    parts.uri = uri;
    // The upstream leg always speaks HTTP/1.1, whatever the client negotiated.
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);

    tracing::debug!(request_id = %request_id, scope = %scope.label, upstream = %upstream, "Forwarding request");

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Upstream error");
            metrics::record_upstream_error();
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
