//! Account ledger definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Fee, Timestamp};

/// Direction of a ledger movement relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerDirection {
    /// Funds entered the account.
    In,
    /// Funds left the account.
    Out,
}

impl std::fmt::Display for LedgerDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// One account ledger movement.
///
/// `type` uses the shared vocabulary `trade`/`fee`/`transfer`/`deposit`/
/// `withdrawal`/`rebate`; venue-specific types pass through verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Venue ledger entry id.
    pub id: Option<String>,
    /// Movement timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Movement time as ISO 8601.
    pub datetime: Option<String>,
    /// Account the movement applies to.
    pub account: Option<String>,
    /// Direction of the movement.
    pub direction: Option<LedgerDirection>,
    /// Movement type.
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    /// Unified currency code.
    pub currency: Option<String>,
    /// Moved amount (always positive; see `direction`).
    pub amount: Option<Decimal>,
    /// Running balance before the movement.
    pub before: Option<Decimal>,
    /// Running balance after the movement.
    pub after: Option<Decimal>,
    /// Movement status.
    pub status: Option<String>,
    /// Id of the object that caused the movement (trade, transfer…).
    pub reference_id: Option<String>,
    /// Fee charged on the movement.
    pub fee: Option<Fee>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
