//! Deposit/withdrawal definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{Fee, Timestamp};

/// Direction of a chain transaction relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Funds deposited into the venue.
    Deposit,
    /// Funds withdrawn from the venue.
    Withdrawal,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// One deposit or withdrawal.
///
/// `status` uses the shared vocabulary `pending`/`ok`/`failed`/
/// `canceled`; venue-specific statuses pass through verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Venue transaction id.
    pub id: Option<String>,
    /// On-chain transaction hash.
    pub txid: Option<String>,
    /// Transaction timestamp (ms).
    pub timestamp: Option<Timestamp>,
    /// Transaction time as ISO 8601.
    pub datetime: Option<String>,
    /// Direction.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Unified currency code.
    pub currency: Option<String>,
    /// Transferred amount.
    pub amount: Option<Decimal>,
    /// Unified network code.
    pub network: Option<String>,
    /// Destination address.
    pub address: Option<String>,
    /// Destination tag/memo.
    pub tag: Option<String>,
    /// Source address, where the venue reports one.
    pub address_from: Option<String>,
    /// Destination address, where the venue distinguishes it.
    pub address_to: Option<String>,
    /// Transaction status.
    pub status: Option<String>,
    /// Last status update timestamp (ms).
    pub updated: Option<Timestamp>,
    /// Fee charged.
    pub fee: Option<Fee>,
    /// Raw venue payload.
    pub info: HashMap<String, Value>,
}
