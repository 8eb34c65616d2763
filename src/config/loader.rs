//! Configuration loading from disk and environment.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "GATEWAY_";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A setting replaced from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOverride {
    BindAddress,
    ServiceUrl(String),
}

impl fmt::Display for EnvOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindAddress => f.write_str("listener.bind_address"),
            Self::ServiceUrl(service) => write!(f, "services.{service}"),
        }
    }
}

/// A validated configuration and the environment overrides applied to it.
///
/// Config is loaded before the subscriber exists, so overrides are kept
/// for the caller to log once logging is up.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ProxyConfig,
    pub overrides: Vec<EnvOverride>,
}

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
///
/// Without a path the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    let overrides = apply_env_overrides(&mut config, std::env::vars());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, overrides })
}

/// Apply `GATEWAY_*` overrides and report which settings changed.
///
/// - `GATEWAY_BIND_ADDRESS` replaces `listener.bind_address`
/// - `GATEWAY_<SERVICE>_URL` sets the base URL of `<service>` (lower-cased)
pub fn apply_env_overrides<I>(config: &mut ProxyConfig, vars: I) -> Vec<EnvOverride>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut applied = Vec::new();
    for (key, value) in vars {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        if name == "BIND_ADDRESS" {
            config.listener.bind_address = value;
            applied.push(EnvOverride::BindAddress);
        } else if let Some(service) = name.strip_suffix("_URL") {
            if service.is_empty() {
                continue;
            }
            let service = service.to_lowercase();
            config.services.insert(service.clone(), value);
            applied.push(EnvOverride::ServiceUrl(service));
        }
    }
    applied
}
