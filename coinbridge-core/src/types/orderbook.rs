//! Order book definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Symbol, Timestamp};

/// One price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    /// Level price.
    pub price: Decimal,
    /// Amount resting at the level.
    pub amount: Decimal,
}

/// Order book snapshot.
///
/// Bids are sorted descending, asks ascending, as delivered by the venue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBook {
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Snapshot timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Snapshot time as ISO 8601.
    pub datetime: Option<String>,
    /// Venue sequence number, where one is published.
    pub nonce: Option<i64>,
    /// Buy side.
    pub bids: Vec<OrderBookEntry>,
    /// Sell side.
    pub asks: Vec<OrderBookEntry>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

impl OrderBook {
    /// Best bid, if any depth exists.
    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }

    /// Best ask, if any depth exists.
    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }
}
