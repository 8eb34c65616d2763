//! Storefront gateway library.
//!
//! Routes browser-facing API calls from the storefront and admin panel to
//! the backend service that owns them, rewriting paths on the way.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
