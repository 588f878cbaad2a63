//! Order definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Fee, Symbol, Timestamp};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Unified order type.
///
/// Venue-specific subtypes (stop-market, limit-maker, …) normalize to
/// `Market` or `Limit`; a vocabulary the adapter does not recognize
/// passes through unchanged in `Other` rather than being silently
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OrderType {
    /// Market order.
    Market,
    /// Limit order.
    Limit,
    /// Unmapped venue vocabulary, preserved verbatim.
    Other(String),
}

impl From<OrderType> for String {
    fn from(t: OrderType) -> Self {
        match t {
            OrderType::Market => "market".to_string(),
            OrderType::Limit => "limit".to_string(),
            OrderType::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "market" => Self::Market,
            "limit" => Self::Limit,
            _ => Self::Other(s),
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Limit => write!(f, "limit"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Unified order status.
///
/// Raw venue vocabularies map one-way onto the five canonical values;
/// unmapped raw strings pass through unchanged in `Other`; this is an explicit
/// design choice, not a parsing gap. Status is always venue-authoritative
/// and re-fetched, never inferred locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OrderStatus {
    /// Resting or partially filled.
    Open,
    /// Fully filled.
    Closed,
    /// Canceled before completion.
    Canceled,
    /// Rejected by the venue.
    Rejected,
    /// Expired by time-in-force or venue policy.
    Expired,
    /// Unmapped venue vocabulary, preserved verbatim.
    Other(String),
}

impl From<OrderStatus> for String {
    fn from(s: OrderStatus) -> Self {
        match s {
            OrderStatus::Open => "open".to_string(),
            OrderStatus::Closed => "closed".to_string(),
            OrderStatus::Canceled => "canceled".to_string(),
            OrderStatus::Rejected => "rejected".to_string(),
            OrderStatus::Expired => "expired".to_string(),
            OrderStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            "canceled" => Self::Canceled,
            "rejected" => Self::Rejected,
            "expired" => Self::Expired,
            _ => Self::Other(s),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Canceled => write!(f, "canceled"),
            Self::Rejected => write!(f, "rejected"),
            Self::Expired => write!(f, "expired"),
            Self::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Order validity duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till canceled.
    #[serde(rename = "GTC")]
    Gtc,
    /// Immediate or cancel.
    #[serde(rename = "IOC")]
    Ioc,
    /// Fill or kill.
    #[serde(rename = "FOK")]
    Fok,
    /// Post only (maker only).
    #[serde(rename = "PO")]
    Po,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gtc => "GTC",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
            Self::Po => "PO",
        };
        write!(f, "{s}")
    }
}

/// One order, as the venue last reported it.
///
/// `filled + remaining == amount` is a target, not a guarantee: many
/// venues omit `remaining`, and the normalizer derives it only when both
/// `amount` and `filled` are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    /// Venue order id.
    pub id: Option<String>,
    /// Caller-supplied client order id.
    pub client_order_id: Option<String>,
    /// Creation timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Creation time as ISO 8601.
    pub datetime: Option<String>,
    /// Timestamp of the most recent fill (ms).
    pub last_trade_timestamp: Option<Timestamp>,
    /// Timestamp of the most recent order update (ms).
    pub last_update_timestamp: Option<Timestamp>,
    /// Unified status.
    pub status: Option<OrderStatus>,
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Unified order type.
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    /// Validity duration.
    pub time_in_force: Option<TimeInForce>,
    /// Side.
    pub side: Option<OrderSide>,
    /// Limit price.
    pub price: Option<Decimal>,
    /// Average fill price.
    pub average: Option<Decimal>,
    /// Ordered amount in base units.
    pub amount: Option<Decimal>,
    /// Filled amount in base units.
    pub filled: Option<Decimal>,
    /// Unfilled amount in base units.
    pub remaining: Option<Decimal>,
    /// Filled cost in quote units.
    pub cost: Option<Decimal>,
    /// Price that activates a conditional order.
    pub trigger_price: Option<Decimal>,
    /// Attached stop-loss price.
    pub stop_loss_price: Option<Decimal>,
    /// Attached take-profit price.
    pub take_profit_price: Option<Decimal>,
    /// Position-reducing only.
    pub reduce_only: Option<bool>,
    /// Maker only.
    pub post_only: Option<bool>,
    /// Fee charged so far.
    pub fee: Option<Fee>,
    /// All fees charged, when the venue itemizes them.
    pub fees: Vec<Fee>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
