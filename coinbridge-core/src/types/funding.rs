//! Funding rate and leverage tier definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Symbol, Timestamp};

/// Funding rate snapshot for a perpetual swap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundingRate {
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Snapshot timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Snapshot time as ISO 8601.
    pub datetime: Option<String>,
    /// Current funding rate per interval.
    pub funding_rate: Option<Decimal>,
    /// Next settlement timestamp (ms).
    pub next_funding_timestamp: Option<Timestamp>,
    /// Next settlement time as ISO 8601.
    pub next_funding_datetime: Option<String>,
    /// Current mark price.
    pub mark_price: Option<Decimal>,
    /// Current index price.
    pub index_price: Option<Decimal>,
    /// Funding interval, e.g. `8h`.
    pub interval: Option<String>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

/// One rung of a market's leverage/margin ladder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeverageTier {
    /// Tier ordinal, starting at 1.
    pub tier: Option<u32>,
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Currency the notional caps are denominated in.
    pub currency: Option<String>,
    /// Lower notional bound for this tier.
    pub min_notional: Option<Decimal>,
    /// Upper notional bound for this tier.
    pub max_notional: Option<Decimal>,
    /// Maintenance margin rate within the tier.
    pub maintenance_margin_rate: Option<Decimal>,
    /// Maximum leverage within the tier.
    pub max_leverage: Option<Decimal>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
