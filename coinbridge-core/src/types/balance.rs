//! Account balance definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::Timestamp;

/// Funds in one currency.
///
/// `total = free + used`; the normalizer completes a missing leg from
/// the other two with exact arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Available for trading/withdrawal.
    pub free: Option<Decimal>,
    /// Locked in open orders or positions.
    pub used: Option<Decimal>,
    /// Total held.
    pub total: Option<Decimal>,
}

/// Full account balance snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Balance {
    /// Per-currency entries keyed by unified currency code.
    pub currencies: HashMap<String, BalanceEntry>,
    /// Snapshot timestamp (ms), where the venue reports one.
    pub timestamp: Option<Timestamp>,
    /// Snapshot time as ISO 8601.
    pub datetime: Option<String>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

impl Balance {
    /// Entry for one currency code, if present.
    pub fn get(&self, code: &str) -> Option<&BalanceEntry> {
        self.currencies.get(code)
    }
}
