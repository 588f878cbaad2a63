//! Fee structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::Symbol;

/// A fee charged on an order, trade or transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    /// Unified currency code the fee is denominated in.
    pub currency: Option<String>,
    /// Fee amount.
    pub cost: Option<Decimal>,
    /// Fee rate, where the venue reports one.
    pub rate: Option<Decimal>,
}

/// Per-market trading fee schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradingFee {
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Maker rate.
    pub maker: Option<Decimal>,
    /// Taker rate.
    pub taker: Option<Decimal>,
    /// Rates are percentages.
    pub percentage: Option<bool>,
    /// Rates depend on volume tier.
    pub tier_based: Option<bool>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
