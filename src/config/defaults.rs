//! Built-in service topology and route table.
//!
//! Used when no config file is given, or when the file omits the
//! `services` / `routes` sections.

use crate::config::schema::{PrefixRewrite, RouteConfig, ServicesConfig};
use crate::routing::RouteMethod::{self, Delete, Get, Patch, Post, Put};

pub const CATALOG: &str = "catalog";
pub const IDENTITY: &str = "identity";
pub const FULFILLMENT: &str = "fulfillment";
pub const ANALYTICS: &str = "analytics";

/// Default base URLs for local development.
pub fn default_services() -> ServicesConfig {
    let mut services = ServicesConfig(Default::default());
    services.insert(CATALOG, "http://127.0.0.1:4001");
    services.insert(IDENTITY, "http://127.0.0.1:4002");
    services.insert(FULFILLMENT, "http://127.0.0.1:4003");
    services.insert(ANALYTICS, "http://127.0.0.1:4004");
    services
}

fn template(
    name: &str,
    path: &str,
    methods: &[RouteMethod],
    service: &str,
    target: &str,
    error_message: &str,
) -> RouteConfig {
    RouteConfig {
        name: name.to_string(),
        path: path.to_string(),
        methods: methods.to_vec(),
        service: service.to_string(),
        target: Some(target.to_string()),
        rewrite: None,
        error_message: Some(error_message.to_string()),
    }
}

fn prefix(
    name: &str,
    path: &str,
    methods: &[RouteMethod],
    service: &str,
    (from, to): (&str, &str),
    error_message: &str,
) -> RouteConfig {
    RouteConfig {
        name: name.to_string(),
        path: path.to_string(),
        methods: methods.to_vec(),
        service: service.to_string(),
        target: None,
        rewrite: Some(PrefixRewrite {
            from: from.to_string(),
            to: to.to_string(),
        }),
        error_message: Some(error_message.to_string()),
    }
}

/// The platform's route table: admin panel first, then storefront.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        // Admin: catalog
        prefix("admin-brands", "/api/admin/brands", &[Get, Post], CATALOG,
            ("/api/admin/brands", "/brands/admin"), "Failed to process brands request"),
        prefix("admin-brand", "/api/admin/brands/:id", &[Get, Patch, Delete], CATALOG,
            ("/api/admin/brands", "/brands/admin"), "Failed to process brand request"),
        prefix("admin-collections", "/api/admin/collections", &[Get, Post], CATALOG,
            ("/api/admin/collections", "/collections/admin"), "Failed to process collections request"),
        template("admin-collection", "/api/admin/collections/:id", &[Get, Patch, Delete], CATALOG,
            "/collections/admin/:id", "Failed to process collection request"),
        prefix("admin-products", "/api/admin/products", &[Get, Post], CATALOG,
            ("/api/admin/products", "/products/admin"), "Failed to process products request"),
        template("admin-product", "/api/admin/products/:id", &[Get, Patch, Delete], CATALOG,
            "/products/admin/:id", "Failed to process product request"),
        prefix("admin-assets", "/api/admin/assets", &[Get, Post], CATALOG,
            ("/api/admin/assets", "/assets/admin"), "Failed to process assets request"),
        template("admin-asset", "/api/admin/assets/:id", &[Delete], CATALOG,
            "/assets/admin/:id", "Failed to delete asset"),
        // Admin: identity
        prefix("admin-customers", "/api/admin/customers", &[Get, Post], IDENTITY,
            ("/api/admin/customers", "/customers/admin"), "Failed to process customers request"),
        template("admin-customer", "/api/admin/customers/:id", &[Get, Patch, Delete], IDENTITY,
            "/customers/admin/:id", "Failed to process customer request"),
        prefix("admin-users", "/api/admin/users", &[Get, Post], IDENTITY,
            ("/api/admin/users", "/users/admin"), "Failed to process users request"),
        template("admin-user", "/api/admin/users/:id", &[Get, Patch, Delete], IDENTITY,
            "/users/admin/:id", "Failed to process user request"),
        prefix("admin-settings", "/api/admin/settings", &[Get, Put], IDENTITY,
            ("/api/admin/settings", "/settings/admin"), "Failed to process settings request"),
        // Admin: fulfillment
        prefix("admin-orders", "/api/admin/orders", &[Get], FULFILLMENT,
            ("/api/admin/orders", "/orders/admin"), "Failed to fetch orders"),
        template("admin-order", "/api/admin/orders/:id", &[Get, Patch, Delete], FULFILLMENT,
            "/orders/admin/:id", "Failed to process order request"),
        template("admin-order-status", "/api/admin/orders/:id/status", &[Patch], FULFILLMENT,
            "/orders/admin/:id/status", "Failed to update order status"),
        // Admin: analytics
        prefix("admin-dashboard", "/api/admin/dashboard/:stat", &[Get], ANALYTICS,
            ("/api/admin/dashboard", "/dashboard"), "Failed to fetch dashboard statistics"),
        // Storefront
        prefix("store-products", "/api/products", &[Get], CATALOG,
            ("/api/products", "/products"), "Failed to fetch products"),
        template("store-product", "/api/products/:id", &[Get], CATALOG,
            "/products/:id", "Failed to fetch product"),
        prefix("store-collections", "/api/collections", &[Get], CATALOG,
            ("/api/collections", "/collections"), "Failed to fetch collections"),
        template("store-collection", "/api/collections/:id", &[Get], CATALOG,
            "/collections/:id", "Failed to fetch collection"),
        template("store-checkout", "/api/checkout", &[Post], FULFILLMENT,
            "/checkout", "Failed to complete checkout"),
        template("store-orders", "/api/orders", &[Get], FULFILLMENT,
            "/orders", "Failed to fetch orders"),
        template("store-order", "/api/orders/:id", &[Get], FULFILLMENT,
            "/orders/:id", "Failed to fetch order"),
        template("store-account", "/api/account", &[Get, Patch], IDENTITY,
            "/customers/me", "Failed to process account request"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteTable;

    #[test]
    fn test_default_table_compiles() {
        let table = RouteTable::build(&default_routes(), &default_services()).unwrap();
        assert_eq!(table.routes().len(), default_routes().len());
    }

    #[test]
    fn test_default_table_covers_representative_routes() {
        let table = RouteTable::build(&default_routes(), &default_services()).unwrap();

        let m = table.resolve(Get, "/api/admin/brands", None).unwrap();
        assert_eq!(m.target.as_str(), "http://127.0.0.1:4001/brands/admin");

        let m = table.resolve(Delete, "/api/admin/collections/c-9", None).unwrap();
        assert_eq!(m.target.as_str(), "http://127.0.0.1:4001/collections/admin/c-9");

        let m = table.resolve(Post, "/api/admin/customers", None).unwrap();
        assert_eq!(m.service, IDENTITY);

        let m = table.resolve(Patch, "/api/admin/orders/42/status", None).unwrap();
        assert_eq!(m.route_name, "admin-order-status");

        let m = table.resolve(Get, "/api/admin/dashboard/revenue", None).unwrap();
        assert_eq!(m.target.as_str(), "http://127.0.0.1:4004/dashboard/revenue");

        assert!(table.resolve(Put, "/api/admin/brands", None).is_none());
    }
}
