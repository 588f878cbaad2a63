//! 24-hour rolling ticker.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Symbol, Timestamp};

/// Price/volume statistics for one market over the trailing 24 hours.
///
/// `last` and `close` mirror each other; the normalizer derives the
/// change/percentage/average/vwap fields from the others when the venue
/// omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ticker {
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Venue timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Venue timestamp as ISO 8601.
    pub datetime: Option<String>,
    /// Highest trade price.
    pub high: Option<Decimal>,
    /// Lowest trade price.
    pub low: Option<Decimal>,
    /// Best bid price.
    pub bid: Option<Decimal>,
    /// Amount at the best bid.
    pub bid_volume: Option<Decimal>,
    /// Best ask price.
    pub ask: Option<Decimal>,
    /// Amount at the best ask.
    pub ask_volume: Option<Decimal>,
    /// Volume-weighted average price.
    pub vwap: Option<Decimal>,
    /// Opening price.
    pub open: Option<Decimal>,
    /// Closing price (same as `last`).
    pub close: Option<Decimal>,
    /// Most recent trade price (same as `close`).
    pub last: Option<Decimal>,
    /// Close of the previous period.
    pub previous_close: Option<Decimal>,
    /// Absolute change, `last - open`.
    pub change: Option<Decimal>,
    /// Relative change in percent.
    pub percentage: Option<Decimal>,
    /// Midpoint of `open` and `last`.
    pub average: Option<Decimal>,
    /// Traded volume in base units.
    pub base_volume: Option<Decimal>,
    /// Traded volume in quote units.
    pub quote_volume: Option<Decimal>,
    /// Mark price, for contract markets.
    pub mark_price: Option<Decimal>,
    /// Index price, for contract markets.
    pub index_price: Option<Decimal>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
