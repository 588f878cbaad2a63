//! Market (tradable instrument) definition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{MinMax, Symbol};
use crate::error::Result;
use crate::precise::{self, RoundingMode};

/// Market classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Spot market.
    #[default]
    Spot,
    /// Perpetual swap.
    Swap,
    /// Dated future.
    Future,
    /// Option contract.
    Option,
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spot => write!(f, "spot"),
            Self::Swap => write!(f, "swap"),
            Self::Future => write!(f, "future"),
            Self::Option => write!(f, "option"),
        }
    }
}

/// Precision expressed as tick/step sizes.
///
/// Venues that publish digit counts are converted at parse time
/// (a count of 3 becomes a step of `0.001`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPrecision {
    /// Minimum amount step.
    pub amount: Option<Decimal>,
    /// Minimum price step.
    pub price: Option<Decimal>,
    /// Base currency precision (digits), when published separately.
    pub base: Option<u32>,
    /// Quote currency precision (digits), when published separately.
    pub quote: Option<u32>,
}

/// Order parameter limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketLimits {
    /// Order amount bounds.
    pub amount: Option<MinMax>,
    /// Order price bounds.
    pub price: Option<MinMax>,
    /// Order cost (price × amount) bounds.
    pub cost: Option<MinMax>,
    /// Leverage bounds.
    pub leverage: Option<MinMax>,
}

/// One tradable instrument on one venue.
///
/// The unified `symbol` is unique within a loaded market set and is
/// deterministically reconstructible from the component fields; `id` is
/// the venue-local identifier used on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Market {
    /// Venue-local market id (e.g. `BTCUSDT-PERPETUAL`).
    pub id: String,
    /// Unified symbol (e.g. `BTC/USDT:USDT`).
    pub symbol: Symbol,
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub quote: String,
    /// Settlement currency code, for contracts.
    pub settle: Option<String>,
    /// Venue-local base currency id.
    pub base_id: Option<String>,
    /// Venue-local quote currency id.
    pub quote_id: Option<String>,
    /// Venue-local settlement currency id.
    pub settle_id: Option<String>,
    /// Market classification.
    #[serde(rename = "type")]
    pub market_type: MarketType,
    /// Whether the market is currently tradable.
    pub active: bool,
    /// Whether margin trading is available.
    pub margin: bool,
    /// Whether this is any kind of contract market.
    pub contract: bool,
    /// Linear contract (settles in quote/stable).
    pub linear: Option<bool>,
    /// Inverse contract (settles in base).
    pub inverse: Option<bool>,
    /// Contract size in base units.
    pub contract_size: Option<Decimal>,
    /// Expiry timestamp (ms) for dated contracts.
    pub expiry: Option<i64>,
    /// Expiry as an ISO 8601 string.
    pub expiry_datetime: Option<String>,
    /// Strike price, for options.
    pub strike: Option<Decimal>,
    /// `call` or `put`, for options.
    pub option_type: Option<String>,
    /// Maker fee rate.
    pub maker: Option<Decimal>,
    /// Taker fee rate.
    pub taker: Option<Decimal>,
    /// Fees are percentages (vs fixed amounts).
    pub percentage: Option<bool>,
    /// Fees depend on volume tier.
    pub tier_based: Option<bool>,
    /// Which side of the pair fees are charged in.
    pub fee_side: Option<String>,
    /// Tick/step precision.
    pub precision: MarketPrecision,
    /// Order parameter limits.
    pub limits: MarketLimits,
    /// Timestamp the market definition was fetched (ms).
    pub created: Option<i64>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

impl Market {
    /// Minimal spot market, mostly useful in tests.
    pub fn new_spot(
        id: impl Into<String>,
        symbol: impl Into<String>,
        base: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            base: base.into(),
            quote: quote.into(),
            market_type: MarketType::Spot,
            active: true,
            ..Self::default()
        }
    }

    /// Whether this is a swap/future/option market.
    pub fn is_contract(&self) -> bool {
        self.contract
    }

    /// Formats an order price onto the market's price tick.
    ///
    /// Prices round to the nearest tick; a market without a published
    /// price step passes the value through.
    pub fn price_to_precision(&self, price: Decimal) -> Result<String> {
        match self.precision.price {
            Some(tick) => precise::apply_tick_size(price, tick, RoundingMode::Round),
            None => Ok(precise::number_to_string(price)),
        }
    }

    /// Formats an order amount onto the market's amount step.
    ///
    /// Amounts truncate toward zero; rounding an amount up can exceed
    /// the caller's balance.
    pub fn amount_to_precision(&self, amount: Decimal) -> Result<String> {
        match self.precision.amount {
            Some(step) => precise::apply_tick_size(amount, step, RoundingMode::RoundDown),
            None => Ok(precise::number_to_string(amount)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_spot() {
        let market = Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT");
        assert_eq!(market.symbol, "BTC/USDT");
        assert!(market.active);
        assert!(!market.is_contract());
    }

    #[test]
    fn test_price_to_precision_rounds_to_tick() {
        let market = Market {
            precision: MarketPrecision {
                price: Some(dec!(0.1)),
                ..MarketPrecision::default()
            },
            ..Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT")
        };
        assert_eq!(market.price_to_precision(dec!(67756.74)).unwrap(), "67756.7");
        assert_eq!(market.price_to_precision(dec!(67756.75)).unwrap(), "67756.8");
    }

    #[test]
    fn test_amount_to_precision_truncates() {
        let market = Market {
            precision: MarketPrecision {
                amount: Some(dec!(0.001)),
                ..MarketPrecision::default()
            },
            ..Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT")
        };
        assert_eq!(market.amount_to_precision(dec!(0.12999)).unwrap(), "0.129");
    }

    #[test]
    fn test_no_precision_passes_through() {
        let market = Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT");
        assert_eq!(market.price_to_precision(dec!(1.23456)).unwrap(), "1.23456");
    }
}
