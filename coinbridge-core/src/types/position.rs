//! Derivative position definition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Symbol, Timestamp};
use crate::config::MarginMode;

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    /// Long exposure.
    Long,
    /// Short exposure.
    Short,
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// One open derivative position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Position {
    /// Unified symbol.
    pub symbol: Option<Symbol>,
    /// Venue timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Venue timestamp as ISO 8601.
    pub datetime: Option<String>,
    /// Direction.
    pub side: Option<PositionSide>,
    /// Position size in contracts.
    pub contracts: Option<Decimal>,
    /// Contract size in base units.
    pub contract_size: Option<Decimal>,
    /// Position value in quote units.
    pub notional: Option<Decimal>,
    /// Average entry price.
    pub entry_price: Option<Decimal>,
    /// Current mark price.
    pub mark_price: Option<Decimal>,
    /// Liquidation price.
    pub liquidation_price: Option<Decimal>,
    /// Applied leverage.
    pub leverage: Option<Decimal>,
    /// Collateral mode.
    pub margin_mode: Option<MarginMode>,
    /// Initial margin in quote units.
    pub initial_margin: Option<Decimal>,
    /// Initial margin as a fraction of notional.
    pub initial_margin_percentage: Option<Decimal>,
    /// Maintenance margin in quote units.
    pub maintenance_margin: Option<Decimal>,
    /// Maintenance margin as a fraction of notional.
    pub maintenance_margin_percentage: Option<Decimal>,
    /// Collateral backing the position.
    pub collateral: Option<Decimal>,
    /// Unrealized profit/loss in quote units.
    pub unrealized_pnl: Option<Decimal>,
    /// Realized profit/loss in quote units.
    pub realized_pnl: Option<Decimal>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
