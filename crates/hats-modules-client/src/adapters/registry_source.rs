//! # Registry Sources
//!
//! `HttpRegistrySource` fetches the published registry document;
//! `StaticRegistrySource` serves an in-process document.

use crate::domain::config::ClientConfig;
use crate::domain::entities::Registry;
use crate::errors::ModulesError;
use crate::ports::outbound::RegistrySource;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Fetches the registry over HTTP(S).
pub struct HttpRegistrySource {
    client: Client,
    url: String,
    token: Option<String>,
    require_token: bool,
}

impl HttpRegistrySource {
    /// Create a source for `url` with the given timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ModulesError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ModulesError::ModulesRegistryFetchError(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            token: None,
            require_token: false,
        })
    }

    /// Create a source from the client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ModulesError> {
        let mut source = Self::new(config.registry_url.clone(), config.registry_timeout())?;
        source.token = config.registry_token.clone();
        source.require_token = config.require_token;
        Ok(source)
    }

    /// Send `token` as a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Refuse to fetch without a token.
    #[must_use]
    pub fn require_token(mut self, required: bool) -> Self {
        self.require_token = required;
        self
    }

    /// Document URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RegistrySource for HttpRegistrySource {
    async fn fetch(&self) -> Result<Registry, ModulesError> {
        if self.require_token && self.token.is_none() {
            return Err(ModulesError::MissingToken(format!(
                "a token is required to fetch the registry from {}",
                self.url
            )));
        }

        debug!(url = %self.url, "fetching modules registry");
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ModulesError::ModulesRegistryFetchError(format!("cannot connect to {}", self.url))
            } else {
                ModulesError::ModulesRegistryFetchError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModulesError::ModulesRegistryFetchError(format!(
                "{} answered with status {status}",
                self.url
            )));
        }

        response
            .json::<Registry>()
            .await
            .map_err(|e| ModulesError::ModulesRegistryFetchError(format!("invalid registry document: {e}")))
    }
}

/// Serves a registry held in memory.
#[derive(Clone, Debug)]
pub struct StaticRegistrySource {
    registry: Registry,
}

impl StaticRegistrySource {
    /// Serve `registry`.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ModulesError> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(|e| ModulesError::ModulesRegistryFetchError(format!("invalid registry document: {e}")))
    }
}

#[async_trait]
impl RegistrySource for StaticRegistrySource {
    async fn fetch(&self) -> Result<Registry, ModulesError> {
        Ok(self.registry.clone())
    }
}
