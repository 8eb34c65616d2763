//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → headers.rs (allowlisted request headers only; never Host)
//! Backend response:
//!     → headers.rs (strip hop-by-hop headers)
//! ```
//!
//! # Design Decisions
//! - Credentials are forwarded opaquely, never inspected
//! - No trust in client-supplied connection headers

pub mod headers;
