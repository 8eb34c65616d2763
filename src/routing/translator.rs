//! Public path → backend path translation.
//!
//! # Responsibilities
//! - Replace a public prefix with a backend prefix, keeping the remainder
//! - Substitute captured parameters into a backend path template
//! - Append the inbound query string verbatim
//!
//! # Design Decisions
//! - Pure functions of their inputs; no state
//! - Identifiers pass through opaquely (never decoded or validated)
//! - No slash normalization: what the pattern matched is what is forwarded

use crate::routing::pattern::{PathParams, RoutePattern};
use crate::routing::RouteError;

/// Translation failure at request time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("path '{path}' does not start with registered prefix '{prefix}'")]
    PrefixMismatch { path: String, prefix: String },

    #[error("no value captured for parameter ':{0}'")]
    MissingParam(String),
}

/// How a route computes its backend path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTranslator {
    /// Substring prefix replacement.
    Prefix {
        public_prefix: String,
        backend_prefix: String,
    },
    /// Backend path template with `:name` placeholders.
    Template { target: String },
}

impl PathTranslator {
    pub fn prefix(public_prefix: impl Into<String>, backend_prefix: impl Into<String>) -> Self {
        Self::Prefix {
            public_prefix: public_prefix.into(),
            backend_prefix: backend_prefix.into(),
        }
    }

    pub fn template(target: impl Into<String>) -> Self {
        Self::Template {
            target: target.into(),
        }
    }

    /// Compute the backend path (plus query) for an inbound path.
    pub fn translate(
        &self,
        path: &str,
        params: &PathParams,
        query: Option<&str>,
    ) -> Result<String, TranslateError> {
        let mut translated = match self {
            Self::Prefix {
                public_prefix,
                backend_prefix,
            } => {
                let remainder = path.strip_prefix(public_prefix.as_str()).ok_or_else(|| {
                    TranslateError::PrefixMismatch {
                        path: path.to_string(),
                        prefix: public_prefix.clone(),
                    }
                })?;
                format!("{backend_prefix}{remainder}")
            }
            Self::Template { target } => {
                let mut out = String::with_capacity(target.len());
                for (i, part) in target.split('/').enumerate() {
                    if i > 0 {
                        out.push('/');
                    }
                    match part.strip_prefix(':') {
                        Some(name) => {
                            let value = params
                                .get(name)
                                .ok_or_else(|| TranslateError::MissingParam(name.to_string()))?;
                            out.push_str(value);
                        }
                        None => out.push_str(part),
                    }
                }
                out
            }
        };

        if let Some(q) = query {
            translated.push('?');
            translated.push_str(q);
        }
        Ok(translated)
    }

    /// Startup verification against the route's pattern. Every path the
    /// pattern can match must translate successfully.
    pub fn verify_against(&self, route: &str, pattern: &RoutePattern) -> Result<(), RouteError> {
        match self {
            Self::Prefix { public_prefix, .. } => {
                if !pattern.literal_prefix().starts_with(public_prefix.as_str()) {
                    return Err(RouteError::PrefixMismatch {
                        route: route.to_string(),
                        prefix: public_prefix.clone(),
                        pattern: pattern.as_str().to_string(),
                    });
                }
            }
            Self::Template { target } => {
                if !target.starts_with('/') {
                    return Err(RouteError::InvalidTarget {
                        route: route.to_string(),
                        target: target.clone(),
                    });
                }
                for name in target.split('/').filter_map(|p| p.strip_prefix(':')) {
                    if !pattern.has_param(name) {
                        return Err(RouteError::UnboundParam {
                            route: route.to_string(),
                            param: name.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Short human-readable form, e.g. `/api/admin/brands* -> /brands/admin*`.
    pub fn describe(&self) -> String {
        match self {
            Self::Prefix {
                public_prefix,
                backend_prefix,
            } => format!("{public_prefix}* -> {backend_prefix}*"),
            Self::Template { target } => target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_for(pattern: &str, path: &str) -> PathParams {
        RoutePattern::parse(pattern).unwrap().matches(path).unwrap()
    }

    #[test]
    fn test_prefix_keeps_remainder_and_query() {
        let t = PathTranslator::prefix("/api/admin/orders", "/orders/admin");
        let params = params_for("/api/admin/orders/:id", "/api/admin/orders/42");
        assert_eq!(
            t.translate("/api/admin/orders/42", &params, Some("foo=bar")).unwrap(),
            "/orders/admin/42?foo=bar"
        );
    }

    #[test]
    fn test_query_is_not_reencoded() {
        let t = PathTranslator::prefix("/api/products", "/products");
        let out = t
            .translate("/api/products", &PathParams::default(), Some("q=a%20b&tag=x&tag=y"))
            .unwrap();
        assert_eq!(out, "/products?q=a%20b&tag=x&tag=y");
    }

    #[test]
    fn test_absent_query_adds_nothing() {
        let t = PathTranslator::prefix("/api/admin/dashboard", "/dashboard");
        let out = t
            .translate("/api/admin/dashboard/revenue", &PathParams::default(), None)
            .unwrap();
        assert_eq!(out, "/dashboard/revenue");
    }

    #[test]
    fn test_prefix_mismatch() {
        let t = PathTranslator::prefix("/api/admin/brands", "/brands/admin");
        let err = t
            .translate("/api/brands", &PathParams::default(), None)
            .unwrap_err();
        assert!(matches!(err, TranslateError::PrefixMismatch { .. }));
    }

    #[test]
    fn test_template_substitution() {
        let t = PathTranslator::template("/orders/admin/:id/status");
        let params = params_for("/api/admin/orders/:id/status", "/api/admin/orders/7/status");
        assert_eq!(
            t.translate("/api/admin/orders/7/status", &params, None).unwrap(),
            "/orders/admin/7/status"
        );
    }

    #[test]
    fn test_translation_is_idempotent() {
        let t = PathTranslator::template("/collections/admin/:id");
        let params = params_for("/api/admin/collections/:id", "/api/admin/collections/abc");
        let first = t.translate("/api/admin/collections/abc", &params, Some("x=1")).unwrap();
        let second = t.translate("/api/admin/collections/abc", &params, Some("x=1")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_verify_against_pattern() {
        let pattern = RoutePattern::parse("/api/admin/orders/:id/status").unwrap();

        assert!(PathTranslator::prefix("/api/admin/orders", "/orders/admin")
            .verify_against("r", &pattern)
            .is_ok());
        assert!(PathTranslator::prefix("/api/admin/brands", "/brands/admin")
            .verify_against("r", &pattern)
            .is_err());
        assert!(PathTranslator::template("/orders/admin/:id/status")
            .verify_against("r", &pattern)
            .is_ok());
        assert!(matches!(
            PathTranslator::template("/orders/admin/:order_id")
                .verify_against("r", &pattern),
            Err(RouteError::UnboundParam { .. })
        ));
        assert!(PathTranslator::template("orders/admin")
            .verify_against("r", &pattern)
            .is_err());
    }
}
