//! Client configuration with validation.

use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Registry document published by the protocol.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/Hats-Protocol/modules-registry/main/modules.json";

/// Modules client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where `prepare` fetches the registry when no document is supplied.
    pub registry_url: String,
    /// Bearer token sent with the registry request.
    pub registry_token: Option<String>,
    /// Fail registry fetches that have no token configured.
    pub require_token: bool,
    /// Registry fetch timeout in seconds.
    pub registry_timeout_secs: u64,
    /// Factory to deploy through. Defaults to the registry's factory.
    pub factory_address: Option<Address>,
    /// Simulate write calls before sending them.
    pub simulate_writes: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            registry_token: None,
            require_token: false,
            registry_timeout_secs: 30,
            factory_address: None,
            simulate_writes: true,
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HATS_MODULES_REGISTRY_URL`: registry document URL (default: the public registry)
    /// - `HATS_MODULES_REGISTRY_TOKEN`: bearer token for the registry request
    /// - `HATS_MODULES_REQUIRE_TOKEN`: refuse to fetch without a token (default: false)
    /// - `HATS_MODULES_REGISTRY_TIMEOUT_SECS`: fetch timeout (default: 30)
    /// - `HATS_MODULES_FACTORY_ADDRESS`: factory override
    /// - `HATS_MODULES_SIMULATE_WRITES`: simulate before sending (default: true)
    ///
    /// Unset variables take the defaults. A set variable that does not parse
    /// is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            registry_url: env::var("HATS_MODULES_REGISTRY_URL").unwrap_or(defaults.registry_url),

            registry_token: env::var("HATS_MODULES_REGISTRY_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),

            require_token: env::var("HATS_MODULES_REQUIRE_TOKEN")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.require_token),

            registry_timeout_secs: match env::var("HATS_MODULES_REGISTRY_TIMEOUT_SECS") {
                Ok(v) => v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "HATS_MODULES_REGISTRY_TIMEOUT_SECS",
                    value: v.clone(),
                })?,
                Err(_) => defaults.registry_timeout_secs,
            },

            factory_address: match env::var("HATS_MODULES_FACTORY_ADDRESS") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "HATS_MODULES_FACTORY_ADDRESS",
                    value: v.clone(),
                })?),
                Err(_) => defaults.factory_address,
            },

            simulate_writes: env::var("HATS_MODULES_SIMULATE_WRITES")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.simulate_writes),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.require_token && self.registry_token.is_none() {
            return Err(ConfigError::MissingToken(
                "require_token is set but no registry_token is configured".into(),
            ));
        }

        if !(self.registry_url.starts_with("https://") || self.registry_url.starts_with("http://")) {
            return Err(ConfigError::InvalidRegistryUrl(self.registry_url.clone()));
        }

        if self.registry_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "registry_timeout_secs cannot be 0".into(),
            ));
        }

        Ok(())
    }

    /// Registry fetch timeout.
    #[must_use]
    pub fn registry_timeout(&self) -> Duration {
        Duration::from_secs(self.registry_timeout_secs)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Registry URL is not an http(s) URL
    #[error("invalid registry url: {0}")]
    InvalidRegistryUrl(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// A token is required but none is configured
    #[error("missing registry token: {0}")]
    MissingToken(String),
    /// An environment variable is set to something unparseable
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}
