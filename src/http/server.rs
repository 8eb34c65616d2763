//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, request ID, timeout)
//! - Dispatch requests through the route table
//! - Forward requests to backend services and normalize the result

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{validate_config, LimitsConfig, ProxyConfig, ValidationError};
use crate::http::forwarder::{Forwarder, OutboundRequest};
use crate::http::request::{self, InboundRequest, MakeRequestUuidV4};
use crate::http::response::{self, FailureContext};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::routing::{RouteError, RouteMethod, RouteTable};
use crate::security::headers::HeaderPolicy;

/// Startup failure. The gateway refuses to serve on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    InvalidConfig(Vec<ValidationError>),

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Forwarder,
    pub headers: Arc<HeaderPolicy>,
    pub limits: LimitsConfig,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    routes: Arc<RouteTable>,
}

impl HttpServer {
    /// Validate the configuration and build the route table and client.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ServerError::InvalidConfig)?;

        let routes = Arc::new(RouteTable::build(&config.routes, &config.services)?);
        let state = AppState {
            routes: routes.clone(),
            forwarder: Forwarder::new(&config.timeouts, &config.limits),
            headers: Arc::new(HeaderPolicy::new(&config.forwarding.extra_headers)),
            limits: config.limits.clone(),
        };

        tracing::info!(routes = routes.len(), services = config.services.0.len(), "Route table ready");

        let router = Self::build_router(&config, state);
        Ok(Self { router, routes })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The gateway router, for embedding in another server.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The compiled route table.
    pub fn routes(&self) -> Arc<RouteTable> {
        self.routes.clone()
    }
}

/// Main gateway handler.
/// Resolves the route, forwards once, and normalizes the outcome.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request::request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // 1. Match route
    let route = RouteMethod::from_method(&method).and_then(|m| {
        state
            .routes
            .resolve(m, &path, request.uri().query())
            .map(|route| (m, route))
    });
    let Some((route_method, route)) = route else {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return response::error_response(StatusCode::NOT_FOUND, "Not Found");
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.route_name,
        service = %route.service,
        backend_path = %route.backend_path,
        "Forwarding request"
    );

    // 2. Capture inbound request
    let inbound = match InboundRequest::capture(
        request,
        route_method.carries_body(),
        state.limits.max_body_bytes,
    )
    .await
    {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!(request_id = %request_id, route = %route.route_name, error = %e, "Request body rejected");
            metrics::record_request(method.as_str(), 413, &route.service, start_time);
            return response::error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
    };

    // 3. Forward (single attempt)
    let outcome = match OutboundRequest::build(&inbound, &route, &state.headers) {
        Ok(outbound) => state.forwarder.send(outbound).await,
        Err(e) => Err(e),
    };

    // 4. Normalize
    let ctx = FailureContext {
        request_id: &request_id,
        route: &route.route_name,
        service: &route.service,
        method: method.as_str(),
        backend_path: &route.backend_path,
        error_message: route.error_message.as_deref(),
    };
    let response = response::normalize(outcome, &ctx);

    metrics::record_request(method.as_str(), response.status().as_u16(), &route.service, start_time);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;
    use crate::http::response::ErrorEnvelope;

    #[tokio::test]
    async fn test_unmatched_request_answers_locally() {
        let server = HttpServer::new(ProxyConfig::default()).unwrap();
        let res = server
            .router()
            .oneshot(
                Request::get("/api/admin/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert!(res.headers().contains_key(X_REQUEST_ID));

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error, "Not Found");
    }

    #[test]
    fn test_invalid_config_refused() {
        let mut config = ProxyConfig::default();
        config.timeouts.upstream_secs = config.timeouts.request_secs;
        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::InvalidConfig(errors)) if errors.len() == 1
        ));
    }
}
