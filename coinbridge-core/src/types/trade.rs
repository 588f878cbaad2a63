//! Trade (execution) definition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Fee, OrderSide, Symbol, Timestamp};

/// Whether an execution added or removed book liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TakerOrMaker {
    /// Removed liquidity.
    Taker,
    /// Provided liquidity.
    Maker,
}

impl std::fmt::Display for TakerOrMaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taker => write!(f, "taker"),
            Self::Maker => write!(f, "maker"),
        }
    }
}

/// One execution, public or private.
///
/// `cost` is derived as `price × amount` with exact arithmetic when the
/// venue omits it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trade {
    /// Venue trade id.
    pub id: Option<String>,
    /// Id of the order this execution belongs to, for private trades.
    pub order: Option<String>,
    /// Execution timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Execution time as ISO 8601.
    pub datetime: Option<String>,
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Aggressor side.
    pub side: Option<OrderSide>,
    /// Liquidity role, for private trades.
    pub taker_or_maker: Option<TakerOrMaker>,
    /// Execution price.
    pub price: Option<Decimal>,
    /// Executed amount in base units.
    pub amount: Option<Decimal>,
    /// Executed cost in quote units.
    pub cost: Option<Decimal>,
    /// Fee charged.
    pub fee: Option<Fee>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
