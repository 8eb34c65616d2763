//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or built-in defaults
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (GATEWAY_* environment overrides, once)
//!     → validation.rs (semantic checks, route table compilation)
//!     → ProxyConfig (validated, immutable)
//!     → passed by reference / Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, EnvOverride, LoadedConfig};
pub use schema::{
    AdminConfig, ForwardingConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    PrefixRewrite, ProxyConfig, RouteConfig, ServicesConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
