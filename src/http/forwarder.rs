//! Request forwarding to backend services.
//!
//! # Responsibilities
//! - Build the outbound request (target URL, header subset, body)
//! - Send it to the backend exactly once
//! - Read the backend response into memory
//!
//! # Design Decisions
//! - No retries at any level: several routes (checkout, order status)
//!   are not idempotent, so the client never replays a request
//! - Bodies are opaque bytes; JSON is never parsed or re-serialized
//! - Connection, timeout and body-read failures all surface as `ForwardError`

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::{LimitsConfig, TimeoutConfig};
use crate::http::request::InboundRequest;
use crate::routing::{RouteMatch, RouteMethod};
use crate::security::headers::HeaderPolicy;

/// Failure to obtain a backend response.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid target URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        source: axum::http::uri::InvalidUri,
    },

    #[error("failed to build outbound request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("failed to read backend response body: {0}")]
    Body(axum::Error),
}

impl ForwardError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUri { .. } | Self::Build(_) => "request",
            Self::Transport(e) if e.is_connect() => "connect",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Body(_) => "body",
        }
    }
}

/// A request ready to be sent to a backend. Built once per inbound request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundRequest {
    /// Build the outbound request for a resolved route.
    ///
    /// POST, PUT and PATCH carry the inbound body unmodified; other methods
    /// are sent without a body.
    pub fn build(
        inbound: &InboundRequest,
        route: &RouteMatch,
        policy: &HeaderPolicy,
    ) -> Result<Self, ForwardError> {
        let uri = route
            .target
            .parse::<Uri>()
            .map_err(|source| ForwardError::InvalidUri {
                uri: route.target.clone(),
                source,
            })?;

        let with_body = RouteMethod::from_method(&inbound.method).is_some_and(RouteMethod::carries_body);

        Ok(Self {
            method: inbound.method.clone(),
            uri,
            headers: policy.outbound_headers(&inbound.headers, with_body),
            body: if with_body {
                inbound.body.clone()
            } else {
                Bytes::new()
            },
        })
    }
}

/// A fully-read backend response.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends outbound requests to backends.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
    max_response_body_bytes: usize,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig, limits: &LimitsConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        // A request the pool cancelled may already have reached the backend.
        let client = Client::builder(TokioExecutor::new())
            .retry_canceled_requests(false)
            .build(connector);

        Self {
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
            max_response_body_bytes: limits.max_response_body_bytes,
        }
    }

    /// Send the request once and read the full response.
    pub async fn send(&self, outbound: OutboundRequest) -> Result<BackendResponse, ForwardError> {
        tokio::time::timeout(self.upstream_timeout, self.exchange(outbound))
            .await
            .map_err(|_| ForwardError::Timeout(self.upstream_timeout))?
    }

    async fn exchange(&self, outbound: OutboundRequest) -> Result<BackendResponse, ForwardError> {
        let mut request = Request::builder()
            .method(outbound.method)
            .uri(outbound.uri)
            .body(Body::from(outbound.body))?;
        *request.headers_mut() = outbound.headers;

        let response: hyper::Response<hyper::body::Incoming> = self.client.request(request).await?;
        let (parts, body) = response.into_parts();

        let body = axum::body::to_bytes(Body::new(body), self.max_response_body_bytes)
            .await
            .map_err(ForwardError::Body)?;

        Ok(BackendResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
