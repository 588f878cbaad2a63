//! Currency and network definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::MinMax;

/// One transfer network for a currency (e.g. ERC20, TRC20).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyNetwork {
    /// Unified network code.
    pub network: String,
    /// Venue-local network id.
    pub id: String,
    /// Whether the network is usable at all.
    pub active: Option<bool>,
    /// Deposits enabled.
    pub deposit: Option<bool>,
    /// Withdrawals enabled.
    pub withdraw: Option<bool>,
    /// Withdrawal fee in currency units.
    pub fee: Option<Decimal>,
    /// Amount precision on this network.
    pub precision: Option<Decimal>,
    /// Withdrawal amount bounds.
    pub limits: Option<MinMax>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

/// One asset on one venue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Currency {
    /// Unified currency code (uppercased, aliased).
    pub code: String,
    /// Venue-local currency id.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Whether the currency is usable at all.
    pub active: Option<bool>,
    /// Deposits enabled on at least one network.
    pub deposit: Option<bool>,
    /// Withdrawals enabled on at least one network.
    pub withdraw: Option<bool>,
    /// Default withdrawal fee.
    pub fee: Option<Decimal>,
    /// Amount precision (step size).
    pub precision: Option<Decimal>,
    /// Withdrawal amount bounds.
    pub limits: Option<MinMax>,
    /// Networks keyed by unified network code.
    pub networks: HashMap<String, CurrencyNetwork>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

impl Currency {
    /// Minimal currency, mostly useful in tests.
    pub fn new(code: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            id: id.into(),
            ..Self::default()
        }
    }
}
