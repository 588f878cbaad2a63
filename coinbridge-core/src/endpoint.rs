//! Explicit endpoint registry.
//!
//! Each venue declares its REST surface as a table of symbolic operation
//! names mapped to `(verb, path template, weight, scope)` records. One
//! generic resolver replaces string-built dynamic method dispatch: the
//! registry is data, lookups are explicit, and unknown operations fail
//! before anything touches the network.
//!
//! Weights are relative rate-limit costs, advisory metadata for an
//! external throttler. The adapters themselves never pace or queue.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpVerb {
    /// Canonical uppercase form, as used in signature payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication scope of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiScope {
    /// Unauthenticated.
    Public,
    /// Requires credentials and a signature.
    Private,
}

/// One REST endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    /// HTTP verb.
    pub verb: HttpVerb,
    /// Path template, absolute from the API root, with optional
    /// `{param}` placeholders.
    pub path: &'static str,
    /// Relative rate-limit weight.
    pub weight: u32,
    /// Authentication scope.
    pub scope: ApiScope,
}

impl Endpoint {
    /// A weight-1 public GET endpoint.
    pub const fn public_get(path: &'static str) -> Self {
        Self {
            verb: HttpVerb::Get,
            path,
            weight: 1,
            scope: ApiScope::Public,
        }
    }

    /// A weight-1 private endpoint with the given verb.
    pub const fn private(verb: HttpVerb, path: &'static str) -> Self {
        Self {
            verb,
            path,
            weight: 1,
            scope: ApiScope::Private,
        }
    }

    /// Returns a copy with a different weight.
    pub const fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

/// Registry of a venue's endpoints keyed by symbolic operation name.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<&'static str, Endpoint>,
}

impl EndpointRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an endpoint under a symbolic operation name.
    #[must_use]
    pub fn register(mut self, operation: &'static str, endpoint: Endpoint) -> Self {
        self.endpoints.insert(operation, endpoint);
        self
    }

    /// Resolves an operation name.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` for an operation the venue never declared;
    /// this is the pre-network failure mode for unimplemented methods.
    pub fn resolve(&self, operation: &str) -> Result<&Endpoint> {
        self.endpoints
            .get(operation)
            .ok_or_else(|| Error::not_supported(format!("no endpoint registered for {operation}")))
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Substitutes `{param}` placeholders in a path template.
///
/// Substituted parameters are consumed: the returned list contains only
/// the parameters that did not match a placeholder and should be sent as
/// query/body parameters instead.
pub fn interpolate_path(
    template: &str,
    params: Vec<(String, String)>,
) -> (String, Vec<(String, String)>) {
    let mut path = template.to_string();
    let mut rest = Vec::with_capacity(params.len());
    for (key, value) in params {
        let placeholder = format!("{{{key}}}");
        if path.contains(&placeholder) {
            path = path.replace(&placeholder, &value);
        } else {
            rest.push((key, value));
        }
    }
    (path, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_operation() {
        let registry = EndpointRegistry::new()
            .register("fetchTime", Endpoint::public_get("/api/v1/time"))
            .register(
                "createOrder",
                Endpoint::private(HttpVerb::Post, "/api/v1/spot/order").weight(5),
            );

        let endpoint = registry.resolve("createOrder").unwrap();
        assert_eq!(endpoint.verb, HttpVerb::Post);
        assert_eq!(endpoint.weight, 5);
        assert_eq!(endpoint.scope, ApiScope::Private);
    }

    #[test]
    fn test_resolve_unknown_is_not_supported() {
        let registry = EndpointRegistry::new();
        assert!(matches!(
            registry.resolve("fetchNothing"),
            Err(Error::NotSupported(_))
        ));
    }

    #[test]
    fn test_interpolate_path() {
        let (path, rest) = interpolate_path(
            "/api/v1/order/{orderId}",
            vec![
                ("orderId".to_string(), "12345".to_string()),
                ("symbol".to_string(), "BTCUSDT".to_string()),
            ],
        );
        assert_eq!(path, "/api/v1/order/12345");
        assert_eq!(rest, vec![("symbol".to_string(), "BTCUSDT".to_string())]);
    }
}
