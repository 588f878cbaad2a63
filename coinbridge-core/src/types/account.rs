//! Account, transfer and deposit-address definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::Timestamp;

/// One sub-account/wallet at a venue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// Venue account id.
    pub id: Option<String>,
    /// Account kind (`spot`, `swap`, `funding`, …), venue vocabulary.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Currency code, for single-currency accounts.
    pub code: Option<String>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

/// One internal transfer between accounts/wallets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferEntry {
    /// Venue transfer id.
    pub id: Option<String>,
    /// Transfer timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Transfer time as ISO 8601.
    pub datetime: Option<String>,
    /// Unified currency code.
    pub currency: Option<String>,
    /// Transferred amount.
    pub amount: Option<Decimal>,
    /// Source account.
    pub from_account: Option<String>,
    /// Destination account.
    pub to_account: Option<String>,
    /// Transfer status (`pending`/`ok`/`failed`/`canceled`).
    pub status: Option<String>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}

/// Deposit address for one currency on one network.
///
/// A result with no address is structurally invalid and is rejected at
/// parse time rather than returned half-formed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepositAddress {
    /// Unified currency code.
    pub currency: Option<String>,
    /// Unified network code.
    pub network: Option<String>,
    /// The address itself. Always present on a successfully parsed value.
    pub address: String,
    /// Tag/memo, for networks that require one.
    pub tag: Option<String>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
