//! Unified symbol assembly and parsing.
//!
//! The unified grammar is:
//!
//! ```text
//! BASE/QUOTE                      spot            BTC/USDT
//! BASE/QUOTE:SETTLE               perpetual swap  BTC/USDT:USDT
//! BASE/QUOTE:SETTLE-YYMMDD        dated future    BTC/USD:BTC-241227
//! BASE/QUOTE:SETTLE-YYMMDD-STRIKE-C|P  option     ETH/USDT:USDT-241227-3000-C
//! ```
//!
//! Symbols must be deterministically reconstructible from market
//! components per venue; [`market_symbol`] is that reconstruction, and
//! round-tripping a loaded market set through it is a tested invariant.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, ParseError, Result};
use crate::precise::number_to_string;
use crate::time::yymmdd;
use crate::types::{Market, MarketType};

/// Components of a unified symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSymbol {
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub quote: String,
    /// Settlement currency code, for contracts.
    pub settle: Option<String>,
    /// Expiry segment (`YYMMDD`), for dated contracts.
    pub expiry: Option<String>,
    /// Strike price, for options.
    pub strike: Option<Decimal>,
    /// `C` or `P`, for options.
    pub option_type: Option<String>,
}

impl ParsedSymbol {
    /// Market classification implied by the components.
    pub fn market_type(&self) -> MarketType {
        match (&self.settle, &self.expiry, &self.strike) {
            (Some(_), Some(_), Some(_)) => MarketType::Option,
            (Some(_), Some(_), None) => MarketType::Future,
            (Some(_), None, _) => MarketType::Swap,
            (None, _, _) => MarketType::Spot,
        }
    }
}

/// Assembles a unified symbol from its components.
pub fn build_symbol(
    base: &str,
    quote: &str,
    settle: Option<&str>,
    expiry: Option<&str>,
    strike: Option<Decimal>,
    option_type: Option<&str>,
) -> String {
    let mut symbol = format!("{base}/{quote}");
    if let Some(settle) = settle {
        symbol.push(':');
        symbol.push_str(settle);
        if let Some(expiry) = expiry {
            symbol.push('-');
            symbol.push_str(expiry);
            if let Some(strike) = strike {
                symbol.push('-');
                symbol.push_str(&number_to_string(strike));
                symbol.push('-');
                symbol.push_str(option_type.unwrap_or("C"));
            }
        }
    }
    symbol
}

/// Reconstructs a market's unified symbol from its component fields.
///
/// This is the canonical derivation used when loading markets; `symbol`
/// as stored and `market_symbol(market)` must agree for every market in
/// a loaded set.
pub fn market_symbol(market: &Market) -> String {
    let settle = market.settle.as_deref();
    let expiry = market.expiry.and_then(yymmdd);
    let option_type = market
        .option_type
        .as_deref()
        .map(|t| if t.eq_ignore_ascii_case("put") || t.eq_ignore_ascii_case("p") {
            "P"
        } else {
            "C"
        });
    match market.market_type {
        MarketType::Spot => build_symbol(&market.base, &market.quote, None, None, None, None),
        MarketType::Swap => build_symbol(&market.base, &market.quote, settle, None, None, None),
        MarketType::Future => build_symbol(
            &market.base,
            &market.quote,
            settle,
            expiry.as_deref(),
            None,
            None,
        ),
        MarketType::Option => build_symbol(
            &market.base,
            &market.quote,
            settle,
            expiry.as_deref(),
            market.strike,
            option_type,
        ),
    }
}

/// Parses a unified symbol into its components.
///
/// # Errors
///
/// Fails when the string does not match the unified grammar.
pub fn parse_symbol(symbol: &str) -> Result<ParsedSymbol> {
    let bad = |msg: &str| {
        Error::from(ParseError::invalid_value(
            "symbol",
            format!("{symbol}: {msg}"),
        ))
    };

    let (base, rest) = symbol
        .split_once('/')
        .ok_or_else(|| bad("missing '/' separator"))?;
    if base.is_empty() {
        return Err(bad("empty base"));
    }

    let (quote, contract) = match rest.split_once(':') {
        Some((quote, contract)) => (quote, Some(contract)),
        None => (rest, None),
    };
    if quote.is_empty() {
        return Err(bad("empty quote"));
    }

    let mut parsed = ParsedSymbol {
        base: base.to_string(),
        quote: quote.to_string(),
        settle: None,
        expiry: None,
        strike: None,
        option_type: None,
    };

    let Some(contract) = contract else {
        return Ok(parsed);
    };

    let mut segments = contract.split('-');
    let settle = segments.next().filter(|s| !s.is_empty());
    parsed.settle = Some(
        settle
            .ok_or_else(|| bad("empty settle"))?
            .to_string(),
    );

    if let Some(expiry) = segments.next() {
        if expiry.len() != 6 || !expiry.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("expiry is not YYMMDD"));
        }
        parsed.expiry = Some(expiry.to_string());
    }

    if let Some(strike) = segments.next() {
        parsed.strike =
            Some(Decimal::from_str(strike).map_err(|_| bad("strike is not a number"))?);
        let option_type = segments.next().ok_or_else(|| bad("missing option type"))?;
        match option_type {
            "C" | "P" => parsed.option_type = Some(option_type.to_string()),
            _ => return Err(bad("option type is not C or P")),
        }
    }

    if segments.next().is_some() {
        return Err(bad("trailing segments"));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_yymmdd;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_spot() {
        let parsed = parse_symbol("BTC/USDT").unwrap();
        assert_eq!(parsed.base, "BTC");
        assert_eq!(parsed.quote, "USDT");
        assert_eq!(parsed.market_type(), MarketType::Spot);
    }

    #[test]
    fn test_parse_swap() {
        let parsed = parse_symbol("BTC/USDT:USDT").unwrap();
        assert_eq!(parsed.settle.as_deref(), Some("USDT"));
        assert_eq!(parsed.market_type(), MarketType::Swap);
    }

    #[test]
    fn test_parse_future() {
        let parsed = parse_symbol("BTC/USD:BTC-241227").unwrap();
        assert_eq!(parsed.expiry.as_deref(), Some("241227"));
        assert_eq!(parsed.market_type(), MarketType::Future);
    }

    #[test]
    fn test_parse_option() {
        let parsed = parse_symbol("ETH/USDT:USDT-241227-3000-C").unwrap();
        assert_eq!(parsed.strike, Some(dec!(3000)));
        assert_eq!(parsed.option_type.as_deref(), Some("C"));
        assert_eq!(parsed.market_type(), MarketType::Option);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_symbol("BTCUSDT").is_err());
        assert!(parse_symbol("/USDT").is_err());
        assert!(parse_symbol("BTC/USDT:USDT-notadate").is_err());
        assert!(parse_symbol("ETH/USDT:USDT-241227-3000-X").is_err());
    }

    #[test]
    fn test_build_parse_round_trip() {
        let symbol = build_symbol("ETH", "USDT", Some("USDT"), Some("241227"), Some(dec!(3000)), Some("C"));
        assert_eq!(symbol, "ETH/USDT:USDT-241227-3000-C");
        let parsed = parse_symbol(&symbol).unwrap();
        assert_eq!(
            build_symbol(
                &parsed.base,
                &parsed.quote,
                parsed.settle.as_deref(),
                parsed.expiry.as_deref(),
                parsed.strike,
                parsed.option_type.as_deref(),
            ),
            symbol
        );
    }

    #[test]
    fn test_market_symbol_reconstruction() {
        let spot = Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT");
        assert_eq!(market_symbol(&spot), spot.symbol);

        let swap = Market {
            settle: Some("USDT".to_string()),
            market_type: MarketType::Swap,
            contract: true,
            ..Market::new_spot("BTCUSDT-PERPETUAL", "BTC/USDT:USDT", "BTC", "USDT")
        };
        assert_eq!(market_symbol(&swap), "BTC/USDT:USDT");

        let future = Market {
            settle: Some("BTC".to_string()),
            market_type: MarketType::Future,
            contract: true,
            expiry: parse_yymmdd("241227"),
            ..Market::new_spot("BTCUSD_241227", "BTC/USD:BTC-241227", "BTC", "USD")
        };
        assert_eq!(market_symbol(&future), "BTC/USD:BTC-241227");
    }
}
