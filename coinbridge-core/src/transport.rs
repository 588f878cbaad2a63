//! HTTP transport abstraction.
//!
//! The core depends on one capability: perform an HTTP request and
//! return status, headers and body. Connection pooling, TLS, proxies and
//! timeouts live behind [`HttpTransport`]; retries, backoff and pacing
//! are deliberately absent: a failed call surfaces immediately and
//! retry policy belongs to the caller.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::ExchangeConfig;
use crate::endpoint::HttpVerb;
use crate::error::{Error, Result};

/// Default transport timeout when the config does not set one.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An outgoing request descriptor, fully built and signed.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Absolute URL including query string.
    pub url: String,
    /// HTTP verb.
    pub method: HttpVerb,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Body, for verbs that carry one.
    pub body: Option<String>,
}

impl HttpRequest {
    /// A bare GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpVerb::Get,
            headers: Vec::new(),
            body: None,
        }
    }
}

/// An HTTP response as the adapter layer sees it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, lowercased keys.
    pub headers: HashMap<String, String>,
    /// Raw body text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The abstract "perform HTTP request" capability.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Performs one request.
    ///
    /// Implementations return `Ok` for any response the server produced,
    /// whatever the status code; interpreting venue error envelopes is
    /// the adapter's `handle_errors` job. Only transport-level failures
    /// (connect, TLS, timeout) become `Err`.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Default transport backed by `reqwest`.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport from the adapter configuration.
    ///
    /// # Errors
    ///
    /// Fails when the underlying client cannot be constructed (bad proxy
    /// URL, TLS backend failure).
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("coinbridge/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(user_agent);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| Error::network(format!("invalid proxy url: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::network(format!("failed to build http client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            HttpVerb::Get => self.client.get(&request.url),
            HttpVerb::Post => self.client.post(&request.url),
            HttpVerb::Put => self.client.put(&request.url),
            HttpVerb::Delete => self.client.delete(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::timeout(format!("{} {}", request.method, request.url))
            } else {
                Error::network(format!("{} {}: {e}", request.method, request.url))
            }
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_lowercase(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
