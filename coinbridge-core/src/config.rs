//! Per-adapter configuration.
//!
//! Everything a caller can tune lives here: credentials, sandbox mode,
//! transport knobs and the free-form `options` bag venues read their
//! tunables from (default network, broker tag, recvWindow and the like).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::credentials::SecretString;
use crate::error::{Error, Result};

/// Margin collateral mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    /// Shared collateral pool.
    Cross,
    /// Collateral dedicated to one position.
    Isolated,
}

impl std::fmt::Display for MarginMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cross => write!(f, "cross"),
            Self::Isolated => write!(f, "isolated"),
        }
    }
}

/// Exchange adapter configuration.
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfig {
    /// API key.
    pub api_key: Option<SecretString>,
    /// API secret.
    pub secret: Option<SecretString>,
    /// Passphrase/password, where the venue requires one.
    pub password: Option<SecretString>,
    /// Account/user id, where the venue requires one.
    pub uid: Option<String>,
    /// Route requests to the venue's sandbox/testnet environment.
    pub sandbox: bool,
    /// Transport timeout in seconds.
    pub timeout: Option<u64>,
    /// Custom User-Agent.
    pub user_agent: Option<String>,
    /// HTTP(S) proxy URL.
    pub proxy: Option<String>,
    /// Anti-replay receive window in milliseconds for venues that
    /// support one.
    pub recv_window: Option<u64>,
    /// Preferred network code for deposits/withdrawals.
    pub default_network: Option<String>,
    /// Preferred margin mode for derivative operations.
    pub default_margin_mode: Option<MarginMode>,
    /// Venue-specific tunables, merged over the venue's own defaults.
    pub options: HashMap<String, Value>,
    /// URL overrides keyed by url-map entry name (for mocking/testing).
    pub url_overrides: HashMap<String, String>,
}

impl ExchangeConfig {
    /// Creates a configuration builder.
    pub fn builder() -> ExchangeConfigBuilder {
        ExchangeConfigBuilder::default()
    }

    /// Fails fast when the credentials a private call needs are missing.
    ///
    /// `needs_password` is set by venues that sign with an additional
    /// passphrase.
    pub fn check_required_credentials(&self, needs_password: bool) -> Result<()> {
        if self.api_key.as_ref().is_none_or(SecretString::is_empty) {
            return Err(Error::authentication("apiKey credential is required"));
        }
        if self.secret.as_ref().is_none_or(SecretString::is_empty) {
            return Err(Error::authentication("secret credential is required"));
        }
        if needs_password && self.password.as_ref().is_none_or(SecretString::is_empty) {
            return Err(Error::authentication("password credential is required"));
        }
        Ok(())
    }

    /// Reads a string option, falling back to a default.
    pub fn option_str(&self, key: &str) -> Option<String> {
        self.options.get(key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Reads an integer option.
    pub fn option_integer(&self, key: &str) -> Option<i64> {
        self.options.get(key).and_then(Value::as_i64)
    }
}

/// Fluent builder for [`ExchangeConfig`].
///
/// # Example
///
/// ```rust
/// use coinbridge_core::config::ExchangeConfig;
///
/// let config = ExchangeConfig::builder()
///     .api_key("key")
///     .secret("secret")
///     .sandbox(true)
///     .recv_window(5000)
///     .build();
/// assert!(config.sandbox);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExchangeConfigBuilder {
    config: ExchangeConfig,
}

impl ExchangeConfigBuilder {
    /// Creates a builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Sets the API secret.
    pub fn secret(mut self, secret: impl Into<SecretString>) -> Self {
        self.config.secret = Some(secret.into());
        self
    }

    /// Sets the passphrase/password.
    pub fn password(mut self, password: impl Into<SecretString>) -> Self {
        self.config.password = Some(password.into());
        self
    }

    /// Sets the account/user id.
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.config.uid = Some(uid.into());
        self
    }

    /// Toggles sandbox/testnet mode.
    pub fn sandbox(mut self, enabled: bool) -> Self {
        self.config.sandbox = enabled;
        self
    }

    /// Sets the transport timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout = Some(seconds);
        self
    }

    /// Sets a custom User-Agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Sets an HTTP(S) proxy URL.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy.into());
        self
    }

    /// Sets the anti-replay receive window in milliseconds.
    pub fn recv_window(mut self, millis: u64) -> Self {
        self.config.recv_window = Some(millis);
        self
    }

    /// Sets the preferred deposit/withdrawal network code.
    pub fn default_network(mut self, network: impl Into<String>) -> Self {
        self.config.default_network = Some(network.into());
        self
    }

    /// Sets the preferred margin mode.
    pub fn default_margin_mode(mut self, mode: MarginMode) -> Self {
        self.config.default_margin_mode = Some(mode);
        self
    }

    /// Sets one venue-specific option.
    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.options.insert(key.into(), value);
        self
    }

    /// Overrides one url-map entry, e.g. to point at a mock server.
    pub fn url_override(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.config.url_overrides.insert(key.into(), url.into());
        self
    }

    /// Finalizes the configuration.
    pub fn build(self) -> ExchangeConfig {
        self.config
    }
}
