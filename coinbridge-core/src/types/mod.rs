//! Canonical data structures shared by every venue adapter.
//!
//! Each structure has a fixed, documented key set; anything a venue did
//! not report is an explicit `None`, never a silently wrong default, and
//! every structure carries an `info` map holding the original raw payload
//! verbatim for debuggability.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

mod account;
mod balance;
mod currency;
mod fee;
mod funding;
mod ledger;
mod market;
mod ohlcv;
mod order;
mod order_request;
mod orderbook;
mod position;
mod ticker;
mod trade;
mod transaction;

pub use account::{Account, DepositAddress, TransferEntry};
pub use balance::{Balance, BalanceEntry};
pub use currency::{Currency, CurrencyNetwork};
pub use fee::{Fee, TradingFee};
pub use funding::{FundingRate, LeverageTier};
pub use ledger::{LedgerDirection, LedgerEntry};
pub use market::{Market, MarketLimits, MarketPrecision, MarketType};
pub use ohlcv::Ohlcv;
pub use order::{Order, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use order_request::OrderRequest;
pub use orderbook::{OrderBook, OrderBookEntry};
pub use position::{Position, PositionSide};
pub use ticker::Ticker;
pub use trade::{TakerOrMaker, Trade};
pub use transaction::{Transaction, TransactionType};

/// Unified symbol, e.g. `BTC/USDT` or `BTC/USDT:USDT`.
pub type Symbol = String;

/// Millisecond Unix timestamp.
pub type Timestamp = i64;

/// An inclusive numeric range with optionally open ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    /// Lower bound, if the venue publishes one.
    pub min: Option<Decimal>,
    /// Upper bound, if the venue publishes one.
    pub max: Option<Decimal>,
}

impl MinMax {
    /// A range with both ends set.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}
