//! Inbound request capture and request IDs.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Capture method, path, query, headers and body once
//! - Enforce the request body size limit
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Declared Content-Length checked before the body is read
//! - Bodies are only read for methods that forward them

use axum::body::{Body, Bytes};
use axum::http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH};
use axum::http::{Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for tower-http's request-id layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Extract the request ID from headers, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// The inbound body exceeded `limits.max_body_bytes`.
#[derive(Debug, thiserror::Error)]
#[error("request body exceeds {limit} bytes")]
pub struct BodyTooLarge {
    pub limit: usize,
}

/// A captured inbound request. Immutable once built.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl InboundRequest {
    /// Capture a request. The body is read (up to `max_body_bytes`) only
    /// when `read_body` is set; otherwise it is dropped unread.
    pub async fn capture(
        request: Request<Body>,
        read_body: bool,
        max_body_bytes: usize,
    ) -> Result<Self, BodyTooLarge> {
        let (parts, body) = request.into_parts();
        let too_large = BodyTooLarge {
            limit: max_body_bytes,
        };

        let body = if read_body {
            let declared = parts
                .headers
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared.is_some_and(|len| len > max_body_bytes) {
                return Err(too_large);
            }
            axum::body::to_bytes(body, max_body_bytes)
                .await
                .map_err(|_| too_large)?
        } else {
            Bytes::new()
        };

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
            body,
        })
    }

    pub fn request_id(&self) -> &str {
        request_id(&self.headers)
    }
}
