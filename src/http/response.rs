//! Response normalization.
//!
//! # Responsibilities
//! - Re-emit backend responses unchanged (status, headers, body)
//! - Map forwarding failures to a uniform `{"error": ...}` envelope
//! - Log failures with routing context
//!
//! # Design Decisions
//! - Backend 4xx/5xx are not gateway errors; they pass through verbatim
//! - Transport failures always become 500, never a 2xx
//! - The envelope never carries hostnames, ports or error causes

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::forwarder::{BackendResponse, ForwardError};
use crate::observability::metrics;
use crate::security::headers::strip_hop_by_hop;

/// Message used when a route does not configure its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Backend service unavailable";

/// The error body returned by the gateway itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// Build an error envelope response.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Routing context attached to failure logs.
#[derive(Debug, Clone, Copy)]
pub struct FailureContext<'a> {
    pub request_id: &'a str,
    pub route: &'a str,
    pub service: &'a str,
    pub method: &'a str,
    pub backend_path: &'a str,
    pub error_message: Option<&'a str>,
}

/// Turn the forwarding outcome into the response sent to the caller.
pub fn normalize(outcome: Result<BackendResponse, ForwardError>, ctx: &FailureContext<'_>) -> Response {
    match outcome {
        Ok(backend) => pass_through(backend),
        Err(e) => {
            tracing::error!(
                request_id = %ctx.request_id,
                route = %ctx.route,
                service = %ctx.service,
                method = %ctx.method,
                backend_path = %ctx.backend_path,
                kind = e.kind(),
                error = %e,
                "Backend request failed"
            );
            metrics::record_upstream_failure(ctx.service, e.kind());
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ctx.error_message.unwrap_or(DEFAULT_ERROR_MESSAGE),
            )
        }
    }
}

/// Re-emit a backend response. Only connection-scoped headers are dropped.
pub fn pass_through(backend: BackendResponse) -> Response {
    let BackendResponse {
        status,
        mut headers,
        body,
    } = backend;
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
