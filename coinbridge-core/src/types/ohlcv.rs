//! OHLCV candle definition.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Timestamp;

/// One candle: open time plus open/high/low/close/volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Candle open timestamp (ms).
    pub timestamp: Timestamp,
    /// Open price.
    pub open: Option<Decimal>,
    /// High price.
    pub high: Option<Decimal>,
    /// Low price.
    pub low: Option<Decimal>,
    /// Close price.
    pub close: Option<Decimal>,
    /// Base volume.
    pub volume: Option<Decimal>,
}
