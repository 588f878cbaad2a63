//! Venue description records.
//!
//! Each venue is described by one immutable [`VenueSpec`], composed once
//! at construction by structural merge of [`VenueSpec::base`] defaults
//! with the venue's overrides; there is no runtime mutation of the
//! record after that. Alias venues (same API, different brand) are a
//! clone of the parent spec with identity fields overridden, not a
//! subclass.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;

use crate::capability::Capabilities;
use crate::config::ExchangeConfig;
use crate::endpoint::EndpointRegistry;
use crate::error::{Error, ExceptionTable, Result};

/// Which credentials a venue's private API requires.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredCredentials {
    /// API key required.
    pub api_key: bool,
    /// API secret required.
    pub secret: bool,
    /// Additional passphrase required.
    pub password: bool,
}

/// Static fee schedule defaults.
#[derive(Debug, Clone, Default)]
pub struct FeeSchedule {
    /// Default maker rate.
    pub maker: Option<Decimal>,
    /// Default taker rate.
    pub taker: Option<Decimal>,
    /// Rates are percentages.
    pub percentage: bool,
    /// Rates depend on volume tier.
    pub tier_based: bool,
}

/// Immutable per-venue configuration record.
///
/// Everything a generic dispatcher needs to talk to one venue: identity,
/// capability declaration, URL map, endpoint registry, error
/// classification tables and assorted venue vocabulary tables.
#[derive(Debug, Clone)]
pub struct VenueSpec {
    /// Lowercase, URL-safe venue id (e.g. `hashkey`).
    pub id: String,
    /// Human-readable venue name.
    pub name: String,
    /// ISO country codes the venue operates from.
    pub countries: Vec<String>,
    /// Venue API version tag.
    pub version: String,
    /// Milliseconds between weight-1 requests, advisory metadata for an
    /// external throttler; the adapter itself never paces.
    pub rate_limit_ms: u32,
    /// Declared unified-method support.
    pub capabilities: Capabilities,
    /// API roots and related URLs, keyed by entry name (`public`,
    /// `private`, `sandbox`, `www`, `doc`).
    pub urls: HashMap<String, String>,
    /// REST surface.
    pub endpoints: EndpointRegistry,
    /// Unified timeframe → venue interval vocabulary.
    pub timeframes: HashMap<String, String>,
    /// Venue-specific default options; caller config merges over these.
    pub options: HashMap<String, Value>,
    /// Venue error-code classification.
    pub exceptions: ExceptionTable,
    /// Currency-code alias corrections (venue ticker → unified code).
    pub common_currencies: HashMap<String, String>,
    /// Venue network id → unified network code.
    pub networks_by_id: HashMap<String, String>,
    /// Unified network code → venue network id.
    pub networks: HashMap<String, String>,
    /// Credentials the private API needs.
    pub required_credentials: RequiredCredentials,
    /// Default fee schedule.
    pub fees: FeeSchedule,
}

impl VenueSpec {
    /// Shared defaults every venue spec starts from.
    ///
    /// Venue modules build their spec with struct-update syntax over
    /// this value, which is the whole merge mechanism: explicit and
    /// once, at construction.
    pub fn base() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            countries: Vec::new(),
            version: "v1".to_string(),
            rate_limit_ms: 50,
            capabilities: Capabilities::empty(),
            urls: HashMap::new(),
            endpoints: EndpointRegistry::new(),
            timeframes: HashMap::new(),
            options: HashMap::new(),
            exceptions: ExceptionTable::new(),
            common_currencies: HashMap::new(),
            networks_by_id: HashMap::new(),
            networks: HashMap::new(),
            required_credentials: RequiredCredentials {
                api_key: true,
                secret: true,
                password: false,
            },
            fees: FeeSchedule::default(),
        }
    }

    /// Derives an alias spec: the parent's behavior under a different
    /// identity.
    ///
    /// `override_identity` receives a clone of the parent spec and
    /// adjusts identity fields (id, name, countries, urls, fees); the
    /// endpoint tables, exception tables and capabilities carry over.
    pub fn alias(parent: &Self, override_identity: impl FnOnce(&mut Self)) -> Self {
        let mut spec = parent.clone();
        override_identity(&mut spec);
        spec
    }

    /// Resolves the API root for a url-map entry, honoring sandbox mode
    /// and per-config overrides.
    ///
    /// # Errors
    ///
    /// Fails when sandbox mode is requested but the venue declares no
    /// sandbox URL, or when the entry is missing entirely.
    pub fn api_url(&self, key: &str, config: &ExchangeConfig) -> Result<String> {
        if let Some(overridden) = config.url_overrides.get(key) {
            return Ok(overridden.clone());
        }
        if config.sandbox {
            return self.urls.get("sandbox").cloned().ok_or_else(|| {
                Error::not_supported(format!("{} does not provide a sandbox environment", self.id))
            });
        }
        self.urls
            .get(key)
            .cloned()
            .ok_or_else(|| Error::exchange(format!("{} has no url entry '{key}'", self.id)))
    }

    /// Maps a venue interval string from a unified timeframe.
    pub fn timeframe(&self, unified: &str) -> Result<String> {
        self.timeframes.get(unified).cloned().ok_or_else(|| {
            Error::not_supported(format!("{} does not support timeframe {unified}", self.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> VenueSpec {
        VenueSpec {
            id: "venue".to_string(),
            name: "Venue".to_string(),
            urls: HashMap::from([
                ("public".to_string(), "https://api.venue.com".to_string()),
                (
                    "sandbox".to_string(),
                    "https://api-sim.venue.com".to_string(),
                ),
            ]),
            timeframes: HashMap::from([("1m".to_string(), "1min".to_string())]),
            ..VenueSpec::base()
        }
    }

    #[test]
    fn test_base_merge_keeps_defaults() {
        let spec = sample_spec();
        assert_eq!(spec.id, "venue");
        assert!(spec.required_credentials.api_key);
        assert_eq!(spec.rate_limit_ms, 50);
    }

    #[test]
    fn test_api_url_resolution() {
        let spec = sample_spec();
        let config = ExchangeConfig::default();
        assert_eq!(
            spec.api_url("public", &config).unwrap(),
            "https://api.venue.com"
        );

        let sandboxed = ExchangeConfig::builder().sandbox(true).build();
        assert_eq!(
            spec.api_url("public", &sandboxed).unwrap(),
            "https://api-sim.venue.com"
        );

        let overridden = ExchangeConfig::builder()
            .url_override("public", "http://127.0.0.1:9999")
            .build();
        assert_eq!(
            spec.api_url("public", &overridden).unwrap(),
            "http://127.0.0.1:9999"
        );
    }

    #[test]
    fn test_alias_overrides_identity_only() {
        let parent = sample_spec();
        let alias = VenueSpec::alias(&parent, |spec| {
            spec.id = "venueus".to_string();
            spec.name = "Venue US".to_string();
        });
        assert_eq!(alias.id, "venueus");
        assert_eq!(alias.timeframes, parent.timeframes);
        assert_eq!(alias.rate_limit_ms, parent.rate_limit_ms);
    }

    #[test]
    fn test_timeframe_lookup() {
        let spec = sample_spec();
        assert_eq!(spec.timeframe("1m").unwrap(), "1min");
        assert!(spec.timeframe("3w").is_err());
    }
}
