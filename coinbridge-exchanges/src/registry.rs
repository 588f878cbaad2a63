//! Venue registry.
//!
//! Maps venue ids to adapter constructors. Alias venues (same API,
//! different brand) are configuration entries referencing another
//! venue's implementation with identity fields overridden, not
//! subclasses: `binanceus` builds the Binance adapter around a spec
//! whose id, name, countries and URLs differ.

use coinbridge_core::config::ExchangeConfig;
use coinbridge_core::describe::VenueSpec;
use coinbridge_core::error::{Error, Result};
use coinbridge_core::exchange::BoxedExchange;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::binance::{self, Binance};
use crate::hashkey::HashKey;

/// Ids of all supported venues, aliases included.
pub fn venues() -> Vec<&'static str> {
    vec!["hashkey", "binance", "binanceus"]
}

/// The Binance.US alias spec: Binance behavior under its own identity.
pub fn binanceus_spec() -> VenueSpec {
    VenueSpec::alias(&binance::describe::spec(), |spec| {
        spec.id = "binanceus".to_string();
        spec.name = "Binance US".to_string();
        spec.countries = vec!["US".to_string()];
        spec.urls = HashMap::from([
            (
                "public".to_string(),
                "https://api.binance.us".to_string(),
            ),
            (
                "private".to_string(),
                "https://api.binance.us".to_string(),
            ),
            ("www".to_string(), "https://www.binance.us".to_string()),
            (
                "doc".to_string(),
                "https://docs.binance.us".to_string(),
            ),
        ]);
        spec.fees.maker = Decimal::from_str("0.001").ok();
        spec.fees.taker = Decimal::from_str("0.001").ok();
    })
}

/// Builds an adapter for a venue id.
///
/// # Errors
///
/// Returns `NotSupported` for an unknown id.
pub fn build(id: &str, config: ExchangeConfig) -> Result<BoxedExchange> {
    match id {
        "hashkey" => Ok(Box::new(HashKey::new(config)?)),
        "binance" => Ok(Box::new(Binance::new(config)?)),
        "binanceus" => Ok(Box::new(Binance::with_spec(binanceus_spec(), config)?)),
        other => Err(Error::not_supported(format!("unknown venue id {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_known_venues() {
        for id in venues() {
            let exchange = build(id, ExchangeConfig::default()).unwrap();
            assert_eq!(exchange.id(), id);
        }
    }

    #[test]
    fn test_unknown_venue() {
        assert!(matches!(
            build("mtgox", ExchangeConfig::default()),
            Err(Error::NotSupported(_))
        ));
    }

    #[test]
    fn test_alias_overrides_identity_keeps_behavior() {
        let parent = binance::describe::spec();
        let alias = binanceus_spec();
        assert_eq!(alias.id, "binanceus");
        assert_eq!(
            alias.urls.get("public").unwrap(),
            "https://api.binance.us"
        );
        // behavior tables carry over from the parent
        assert_eq!(alias.endpoints.len(), parent.endpoints.len());
        assert_eq!(alias.capabilities, parent.capabilities);
        assert_eq!(
            alias.exceptions.classify(Some("-1021"), None),
            parent.exceptions.classify(Some("-1021"), None)
        );
        // the alias venue declares no sandbox
        assert!(alias.urls.get("sandbox").is_none());
    }
}
