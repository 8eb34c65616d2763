//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route records into an ordered table
//! - Look up the matching route for a (method, path) pair
//! - Return a resolved backend target or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over routes sorted by specificity (n is small)
//! - Explicit NoMatch rather than silent default

use serde::Serialize;

use crate::config::{RouteConfig, ServicesConfig};
use crate::routing::pattern::{PathParams, RoutePattern};
use crate::routing::translator::PathTranslator;
use crate::routing::{RouteError, RouteMethod};

/// A compiled route table entry.
#[derive(Debug, Clone)]
struct CompiledRoute {
    name: String,
    pattern: RoutePattern,
    methods: Vec<RouteMethod>,
    service: String,
    base_url: String,
    translator: PathTranslator,
    error_message: Option<String>,
}

/// Result of resolving a request against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route_name: String,
    pub service: String,
    /// Backend path plus query string.
    pub backend_path: String,
    /// Fully-qualified backend URL.
    pub target: String,
    pub params: PathParams,
    pub error_message: Option<String>,
}

/// Read-only description of a route, for the admin API and CLI.
#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub path: String,
    pub methods: Vec<RouteMethod>,
    pub service: String,
    pub translation: String,
}

/// The static routing table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile route records against the configured services.
    pub fn build(configs: &[RouteConfig], services: &ServicesConfig) -> Result<Self, RouteError> {
        let mut routes: Vec<CompiledRoute> = Vec::with_capacity(configs.len());

        for config in configs {
            let route = compile(config, services)?;

            for existing in &routes {
                if !existing.pattern.same_shape(&route.pattern) {
                    continue;
                }
                if let Some(method) = route.methods.iter().find(|m| existing.methods.contains(m)) {
                    return Err(RouteError::Duplicate {
                        first: existing.name.clone(),
                        second: route.name.clone(),
                        method: *method,
                        pattern: route.pattern.to_string(),
                    });
                }
            }
            routes.push(route);
        }

        // Stable: routes of equal specificity keep declaration order.
        routes.sort_by(|a, b| a.pattern.specificity_cmp(&b.pattern));

        tracing::debug!(routes = routes.len(), "Route table compiled");
        Ok(Self { routes })
    }

    /// Find the most specific route for the request and translate its path.
    pub fn resolve(&self, method: RouteMethod, path: &str, query: Option<&str>) -> Option<RouteMatch> {
        let (route, params) = self
            .routes
            .iter()
            .filter(|r| r.methods.contains(&method))
            .find_map(|r| r.pattern.matches(path).map(|p| (r, p)))?;

        // Translators are verified against their pattern at build time.
        let backend_path = match route.translator.translate(path, &params, query) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(route = %route.name, path = %path, error = %e, "Route translation failed");
                return None;
            }
        };

        Some(RouteMatch {
            route_name: route.name.clone(),
            service: route.service.clone(),
            target: format!("{}{}", route.base_url, backend_path),
            backend_path,
            params,
            error_message: route.error_message.clone(),
        })
    }

    /// Describe every compiled route, in match order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|r| RouteInfo {
                name: r.name.clone(),
                path: r.pattern.to_string(),
                methods: r.methods.clone(),
                service: r.service.clone(),
                translation: r.translator.describe(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn compile(config: &RouteConfig, services: &ServicesConfig) -> Result<CompiledRoute, RouteError> {
    let pattern = RoutePattern::parse(&config.path)?;

    if config.methods.is_empty() {
        return Err(RouteError::NoMethods {
            route: config.name.clone(),
        });
    }

    let base_url = services
        .base_url(&config.service)
        .ok_or_else(|| RouteError::UnknownService {
            route: config.name.clone(),
            service: config.service.clone(),
        })?
        .trim_end_matches('/')
        .to_string();

    let translator = match (&config.target, &config.rewrite) {
        (Some(target), None) => PathTranslator::template(target.clone()),
        (None, Some(rewrite)) => PathTranslator::prefix(rewrite.from.clone(), rewrite.to.clone()),
        _ => {
            return Err(RouteError::AmbiguousTranslation {
                route: config.name.clone(),
            })
        }
    };
    translator.verify_against(&config.name, &pattern)?;

    let mut methods = config.methods.clone();
    methods.sort();
    methods.dedup();

    Ok(CompiledRoute {
        name: config.name.clone(),
        pattern,
        methods,
        service: config.service.clone(),
        base_url,
        translator,
        error_message: config.error_message.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrefixRewrite;
    use RouteMethod::*;

    fn services() -> ServicesConfig {
        let mut s = ServicesConfig(Default::default());
        s.insert("catalog", "http://catalog.internal:4001/");
        s.insert("fulfillment", "http://fulfillment.internal:4003");
        s.insert("analytics", "http://analytics.internal:4004");
        s
    }

    fn route(name: &str, path: &str, methods: &[RouteMethod], service: &str, target: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path: path.into(),
            methods: methods.to_vec(),
            service: service.into(),
            target: Some(target.into()),
            rewrite: None,
            error_message: None,
        }
    }

    fn rewrite(name: &str, path: &str, methods: &[RouteMethod], service: &str, from: &str, to: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            path: path.into(),
            methods: methods.to_vec(),
            service: service.into(),
            target: None,
            rewrite: Some(PrefixRewrite {
                from: from.into(),
                to: to.into(),
            }),
            error_message: None,
        }
    }

    #[test]
    fn test_resolve_with_query() {
        let table = RouteTable::build(
            &[rewrite("orders", "/api/admin/orders/:id", &[Get, Patch, Delete], "fulfillment",
                "/api/admin/orders", "/orders/admin")],
            &services(),
        )
        .unwrap();

        let m = table.resolve(Get, "/api/admin/orders/42", Some("foo=bar")).unwrap();
        assert_eq!(m.backend_path, "/orders/admin/42?foo=bar");
        assert_eq!(m.target, "http://fulfillment.internal:4003/orders/admin/42?foo=bar");
        assert_eq!(m.params.get("id"), Some("42"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let table = RouteTable::build(
            &[route("brands", "/api/admin/brands", &[Get], "catalog", "/brands/admin")],
            &services(),
        )
        .unwrap();
        let m = table.resolve(Get, "/api/admin/brands", None).unwrap();
        assert_eq!(m.target, "http://catalog.internal:4001/brands/admin");
    }

    #[test]
    fn test_method_must_match() {
        let table = RouteTable::build(
            &[route("status", "/api/admin/orders/:id/status", &[Patch], "fulfillment",
                "/orders/admin/:id/status")],
            &services(),
        )
        .unwrap();
        assert!(table.resolve(Patch, "/api/admin/orders/7/status", None).is_some());
        assert!(table.resolve(Get, "/api/admin/orders/7/status", None).is_none());
        assert!(table.resolve(Patch, "/api/admin/orders/7/status/", None).is_none());
    }

    #[test]
    fn test_most_specific_wins_regardless_of_order() {
        let table = RouteTable::build(
            &[
                route("by-id", "/api/orders/:id", &[Get], "fulfillment", "/orders/:id"),
                route("latest", "/api/orders/latest", &[Get], "fulfillment", "/orders/latest"),
            ],
            &services(),
        )
        .unwrap();
        assert_eq!(table.resolve(Get, "/api/orders/latest", None).unwrap().route_name, "latest");
        assert_eq!(table.resolve(Get, "/api/orders/9", None).unwrap().route_name, "by-id");
    }

    #[test]
    fn test_duplicate_pattern_and_method_rejected() {
        let err = RouteTable::build(
            &[
                route("a", "/api/orders/:id", &[Get, Patch], "fulfillment", "/orders/:id"),
                route("b", "/api/orders/:order", &[Patch], "fulfillment", "/orders/:order"),
            ],
            &services(),
        )
        .unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { method: Patch, .. }));
    }

    #[test]
    fn test_same_pattern_disjoint_methods_allowed() {
        let table = RouteTable::build(
            &[
                route("read", "/api/orders/:id", &[Get], "fulfillment", "/orders/:id"),
                route("write", "/api/orders/:id", &[Patch], "fulfillment", "/orders/admin/:id"),
            ],
            &services(),
        )
        .unwrap();
        assert_eq!(table.resolve(Patch, "/api/orders/1", None).unwrap().backend_path, "/orders/admin/1");
    }

    #[test]
    fn test_configuration_errors() {
        let unknown = RouteTable::build(
            &[route("x", "/api/x", &[Get], "billing", "/x")],
            &services(),
        );
        assert!(matches!(unknown, Err(RouteError::UnknownService { .. })));

        let no_methods = RouteTable::build(&[route("x", "/api/x", &[], "catalog", "/x")], &services());
        assert!(matches!(no_methods, Err(RouteError::NoMethods { .. })));

        let mut both = route("x", "/api/x", &[Get], "catalog", "/x");
        both.rewrite = Some(PrefixRewrite { from: "/api".into(), to: "/".into() });
        assert!(matches!(
            RouteTable::build(&[both], &services()),
            Err(RouteError::AmbiguousTranslation { .. })
        ));

        let mismatch = RouteTable::build(
            &[rewrite("x", "/api/x", &[Get], "catalog", "/api/y", "/y")],
            &services(),
        );
        assert!(matches!(mismatch, Err(RouteError::PrefixMismatch { .. })));
    }

    #[test]
    fn test_routes_listing() {
        let table = RouteTable::build(
            &[rewrite("dash", "/api/admin/dashboard/:stat", &[Get], "analytics",
                "/api/admin/dashboard", "/dashboard")],
            &services(),
        )
        .unwrap();
        let info = table.routes();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].translation, "/api/admin/dashboard* -> /dashboard*");
    }
}
