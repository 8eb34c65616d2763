//! Header forwarding policy.
//!
//! # Responsibilities
//! - Select which inbound request headers reach the backend
//! - Strip hop-by-hop headers from backend responses
//!
//! # Design Decisions
//! - Allowlist, not denylist: only credentials and content negotiation
//!   headers are forwarded by default
//! - `Host` is never forwarded; the client derives it from the target URL
//! - `Content-Type` only accompanies a forwarded body

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONNECTION, CONTENT_LENGTH,
    CONTENT_TYPE, COOKIE, HOST,
};

use crate::http::request::X_REQUEST_ID;

/// Headers that only apply to a single connection.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Which request headers are copied to the outbound request.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    forwarded: Vec<HeaderName>,
}

impl HeaderPolicy {
    /// Build the policy from the built-in set plus configured extras.
    /// Extras naming `Host`, `Content-Length` or a hop-by-hop header are ignored.
    pub fn new(extra_headers: &[String]) -> Self {
        let mut forwarded = vec![
            AUTHORIZATION,
            COOKIE,
            ACCEPT,
            ACCEPT_LANGUAGE,
            HeaderName::from_static(X_REQUEST_ID),
        ];

        for raw in extra_headers {
            let Ok(name) = HeaderName::from_bytes(raw.as_bytes()) else {
                tracing::warn!(header = %raw, "Ignoring invalid forwarded header name");
                continue;
            };
            if name == HOST || name == CONTENT_LENGTH || name == CONTENT_TYPE || is_hop_by_hop(&name) {
                tracing::warn!(header = %name, "Header cannot be forwarded, ignoring");
                continue;
            }
            if !forwarded.contains(&name) {
                forwarded.push(name);
            }
        }

        Self { forwarded }
    }

    /// Headers for the outbound request.
    pub fn outbound_headers(&self, inbound: &HeaderMap, with_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in &self.forwarded {
            if *name == COOKIE {
                if let Some(cookie) = joined_cookie(inbound) {
                    headers.insert(COOKIE, cookie);
                }
                continue;
            }
            for value in inbound.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        if with_body {
            if let Some(content_type) = inbound.get(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, content_type.clone());
            }
        }
        headers
    }
}

/// HTTP/2 clients may split cookies across several fields; an HTTP/1.1
/// request carries at most one `Cookie` line (RFC 6265 §5.4).
fn joined_cookie(inbound: &HeaderMap) -> Option<HeaderValue> {
    let mut values = inbound.get_all(COOKIE).iter();
    let first = values.next()?;

    let mut joined = first.as_bytes().to_vec();
    for value in values {
        joined.extend_from_slice(b"; ");
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok()
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`, and
/// `Content-Length` (recomputed from the buffered body).
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers.remove(CONTENT_LENGTH);
}
