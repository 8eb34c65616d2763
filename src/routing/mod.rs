//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → table.rs (route lookup, most specific pattern first)
//!     → pattern.rs (segment match, capture :params)
//!     → translator.rs (backend path + verbatim query)
//!     → Return: RouteMatch or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse patterns, verify translators, reject duplicates
//!     → Sort by specificity
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Misconfiguration is fatal at startup, never at request time
//! - Deterministic: same input always matches same route
//! - No wildcard fallback; unmatched requests are the HTTP layer's 404

pub mod pattern;
pub mod table;
pub mod translator;

use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};

pub use pattern::{PathParams, RoutePattern};
pub use table::{RouteInfo, RouteMatch, RouteTable};
pub use translator::{PathTranslator, TranslateError};

/// Methods a route table entry can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RouteMethod {
    /// Map an HTTP method onto the routable set. Anything else is unroutable.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::PATCH => Some(Self::Patch),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }

    /// Methods whose body is forwarded to the backend.
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route table misconfiguration. Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("route '{route}' declares no methods")]
    NoMethods { route: String },

    #[error("route '{route}' targets unknown service '{service}'")]
    UnknownService { route: String, service: String },

    #[error("route '{route}' must set exactly one of 'target' or 'rewrite'")]
    AmbiguousTranslation { route: String },

    #[error("route '{route}' has invalid target '{target}': must start with '/'")]
    InvalidTarget { route: String, target: String },

    #[error("route '{route}': rewrite prefix '{prefix}' is not a prefix of pattern '{pattern}'")]
    PrefixMismatch {
        route: String,
        prefix: String,
        pattern: String,
    },

    #[error("route '{route}': target uses ':{param}' which the pattern does not capture")]
    UnboundParam { route: String, param: String },

    #[error("routes '{first}' and '{second}' both register {method} {pattern}")]
    Duplicate {
        first: String,
        second: String,
        method: RouteMethod,
        pattern: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        assert_eq!(RouteMethod::from_method(&Method::PATCH), Some(RouteMethod::Patch));
        assert_eq!(RouteMethod::from_method(&Method::OPTIONS), None);
        assert_eq!(RouteMethod::Delete.as_method(), Method::DELETE);
    }

    #[test]
    fn test_body_methods() {
        assert!(RouteMethod::Post.carries_body());
        assert!(RouteMethod::Put.carries_body());
        assert!(RouteMethod::Patch.carries_body());
        assert!(!RouteMethod::Get.carries_body());
        assert!(!RouteMethod::Delete.carries_body());
    }
}
