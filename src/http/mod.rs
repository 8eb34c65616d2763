//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route lookup)
//!     → request.rs (request ID, capture method/path/query/headers/body)
//!     → forwarder.rs (outbound request, single backend call)
//!     → response.rs (pass-through or error envelope)
//!     → Send to client
//! ```

pub mod forwarder;
pub mod request;
pub mod response;
pub mod server;

pub use forwarder::{BackendResponse, ForwardError, Forwarder, OutboundRequest};
pub use request::{InboundRequest, X_REQUEST_ID};
pub use response::{ErrorEnvelope, DEFAULT_ERROR_MESSAGE};
pub use server::{AppState, HttpServer, ServerError};
