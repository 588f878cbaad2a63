//! Property-based tests for unified symbol reconstruction.
//!
//! For every market in a loaded set, re-deriving the symbol from its
//! components must reproduce the stored symbol exactly; these
//! properties pin the grammar both ways.

use proptest::prelude::*;

use coinbridge_core::symbol::{build_symbol, market_symbol, parse_symbol};
use coinbridge_core::time::parse_yymmdd;
use coinbridge_core::types::{Market, MarketType};
use rust_decimal::Decimal;

fn currency_code() -> impl Strategy<Value = String> {
    "[A-Z]{2,6}"
}

fn expiry() -> impl Strategy<Value = String> {
    (24u32..30, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{y:02}{m:02}{d:02}"))
}

fn strike() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(Decimal::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// build → parse → build is the identity for every grammar shape.
    #[test]
    fn prop_build_parse_round_trip(
        base in currency_code(),
        quote in currency_code(),
        settle in currency_code(),
        expiry in expiry(),
        strike in strike(),
        is_put in any::<bool>(),
        shape in 0u8..4,
    ) {
        let option_type = if is_put { "P" } else { "C" };
        let symbol = match shape {
            0 => build_symbol(&base, &quote, None, None, None, None),
            1 => build_symbol(&base, &quote, Some(&settle), None, None, None),
            2 => build_symbol(&base, &quote, Some(&settle), Some(&expiry), None, None),
            _ => build_symbol(
                &base,
                &quote,
                Some(&settle),
                Some(&expiry),
                Some(strike),
                Some(option_type),
            ),
        };
        let parsed = parse_symbol(&symbol).unwrap();
        let rebuilt = build_symbol(
            &parsed.base,
            &parsed.quote,
            parsed.settle.as_deref(),
            parsed.expiry.as_deref(),
            parsed.strike,
            parsed.option_type.as_deref(),
        );
        prop_assert_eq!(rebuilt, symbol);
    }

    /// A market's stored symbol equals its component-derived symbol.
    #[test]
    fn prop_market_symbol_reconstruction(
        base in currency_code(),
        quote in currency_code(),
        expiry in expiry(),
        is_swap in any::<bool>(),
    ) {
        let market = if is_swap {
            Market {
                settle: Some(quote.clone()),
                market_type: MarketType::Swap,
                contract: true,
                ..Market::new_spot(
                    format!("{base}{quote}-PERPETUAL"),
                    format!("{base}/{quote}:{quote}"),
                    base.clone(),
                    quote.clone(),
                )
            }
        } else {
            Market {
                settle: Some(quote.clone()),
                market_type: MarketType::Future,
                contract: true,
                expiry: parse_yymmdd(&expiry),
                ..Market::new_spot(
                    format!("{base}{quote}_{expiry}"),
                    format!("{base}/{quote}:{quote}-{expiry}"),
                    base.clone(),
                    quote.clone(),
                )
            }
        };
        prop_assert_eq!(market_symbol(&market), market.symbol.clone());
    }
}
