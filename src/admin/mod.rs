//! Admin API.
//!
//! Served on its own listener (`admin.bind_address`) when enabled, behind a
//! bearer token. Exposes the compiled route table and service topology.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::config::ServicesConfig;
use crate::routing::RouteTable;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub routes: Arc<RouteTable>,
    pub services: Arc<ServicesConfig>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/services", get(get_services))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::defaults::{default_routes, default_services};

    fn admin() -> Router {
        let services = default_services();
        let routes = RouteTable::build(&default_routes(), &services).unwrap();
        setup_admin_router(AdminState {
            routes: Arc::new(routes),
            services: Arc::new(services),
            api_key: Arc::from("s3cret"),
        })
    }

    #[tokio::test]
    async fn test_requires_bearer_token() {
        let res = admin()
            .oneshot(Request::get("/admin/routes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = admin()
            .oneshot(
                Request::get("/admin/routes")
                    .header("authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_lists_routes() {
        let res = admin()
            .oneshot(
                Request::get("/admin/routes")
                    .header("authorization", "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let routes: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(routes.len(), default_routes().len());
        assert!(routes.iter().any(|r| r["name"] == "admin-order-status"
            && r["methods"] == serde_json::json!(["PATCH"])));
    }
}
