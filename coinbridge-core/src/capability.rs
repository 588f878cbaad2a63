//! Venue capability declaration.
//!
//! Every venue declares which unified methods it supports; callers
//! feature-detect with [`Capabilities::has`] before calling rather than
//! probing with requests. Stored as bitflags: one word instead of forty
//! booleans.

use bitflags::bitflags;

bitflags! {
    /// Set of unified methods a venue supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u64 {
        /// `fetch_markets`
        const FETCH_MARKETS = 1 << 0;
        /// `fetch_currencies`
        const FETCH_CURRENCIES = 1 << 1;
        /// `fetch_ticker`
        const FETCH_TICKER = 1 << 2;
        /// `fetch_tickers`
        const FETCH_TICKERS = 1 << 3;
        /// `fetch_order_book`
        const FETCH_ORDER_BOOK = 1 << 4;
        /// `fetch_trades`
        const FETCH_TRADES = 1 << 5;
        /// `fetch_ohlcv`
        const FETCH_OHLCV = 1 << 6;
        /// `fetch_time`
        const FETCH_TIME = 1 << 7;
        /// `fetch_balance`
        const FETCH_BALANCE = 1 << 8;
        /// `create_order`
        const CREATE_ORDER = 1 << 9;
        /// `cancel_order`
        const CANCEL_ORDER = 1 << 10;
        /// `cancel_orders`
        const CANCEL_ORDERS = 1 << 11;
        /// `fetch_order`
        const FETCH_ORDER = 1 << 12;
        /// `fetch_orders`
        const FETCH_ORDERS = 1 << 13;
        /// `fetch_open_orders`
        const FETCH_OPEN_ORDERS = 1 << 14;
        /// `fetch_closed_orders`
        const FETCH_CLOSED_ORDERS = 1 << 15;
        /// `fetch_my_trades`
        const FETCH_MY_TRADES = 1 << 16;
        /// `fetch_positions`
        const FETCH_POSITIONS = 1 << 17;
        /// `fetch_funding_rate`
        const FETCH_FUNDING_RATE = 1 << 18;
        /// `fetch_funding_rates`
        const FETCH_FUNDING_RATES = 1 << 19;
        /// `set_leverage`
        const SET_LEVERAGE = 1 << 20;
        /// `fetch_leverage_tiers`
        const FETCH_LEVERAGE_TIERS = 1 << 21;
        /// `fetch_ledger`
        const FETCH_LEDGER = 1 << 22;
        /// `fetch_deposits`
        const FETCH_DEPOSITS = 1 << 23;
        /// `fetch_withdrawals`
        const FETCH_WITHDRAWALS = 1 << 24;
        /// `withdraw`
        const WITHDRAW = 1 << 25;
        /// `transfer`
        const TRANSFER = 1 << 26;
        /// `fetch_accounts`
        const FETCH_ACCOUNTS = 1 << 27;
        /// `fetch_deposit_address`
        const FETCH_DEPOSIT_ADDRESS = 1 << 28;
        /// `fetch_trading_fees`
        const FETCH_TRADING_FEES = 1 << 29;
    }
}

impl Capabilities {
    /// The public market-data subset.
    pub fn market_data() -> Self {
        Self::FETCH_MARKETS
            | Self::FETCH_TICKER
            | Self::FETCH_TICKERS
            | Self::FETCH_ORDER_BOOK
            | Self::FETCH_TRADES
            | Self::FETCH_OHLCV
            | Self::FETCH_TIME
    }

    /// The private trading subset.
    pub fn trading() -> Self {
        Self::FETCH_BALANCE
            | Self::CREATE_ORDER
            | Self::CANCEL_ORDER
            | Self::FETCH_ORDER
            | Self::FETCH_OPEN_ORDERS
            | Self::FETCH_CLOSED_ORDERS
            | Self::FETCH_MY_TRADES
    }

    /// Looks a capability up by its unified camelCase method name.
    ///
    /// Returns `None` for a name that is not a unified method, so the
    /// caller can distinguish "venue says no" from "no such method".
    pub fn has(&self, method: &str) -> Option<bool> {
        let flag = match method {
            "fetchMarkets" => Self::FETCH_MARKETS,
            "fetchCurrencies" => Self::FETCH_CURRENCIES,
            "fetchTicker" => Self::FETCH_TICKER,
            "fetchTickers" => Self::FETCH_TICKERS,
            "fetchOrderBook" => Self::FETCH_ORDER_BOOK,
            "fetchTrades" => Self::FETCH_TRADES,
            "fetchOHLCV" => Self::FETCH_OHLCV,
            "fetchTime" => Self::FETCH_TIME,
            "fetchBalance" => Self::FETCH_BALANCE,
            "createOrder" => Self::CREATE_ORDER,
            "cancelOrder" => Self::CANCEL_ORDER,
            "cancelOrders" => Self::CANCEL_ORDERS,
            "fetchOrder" => Self::FETCH_ORDER,
            "fetchOrders" => Self::FETCH_ORDERS,
            "fetchOpenOrders" => Self::FETCH_OPEN_ORDERS,
            "fetchClosedOrders" => Self::FETCH_CLOSED_ORDERS,
            "fetchMyTrades" => Self::FETCH_MY_TRADES,
            "fetchPositions" => Self::FETCH_POSITIONS,
            "fetchFundingRate" => Self::FETCH_FUNDING_RATE,
            "fetchFundingRates" => Self::FETCH_FUNDING_RATES,
            "setLeverage" => Self::SET_LEVERAGE,
            "fetchLeverageTiers" => Self::FETCH_LEVERAGE_TIERS,
            "fetchLedger" => Self::FETCH_LEDGER,
            "fetchDeposits" => Self::FETCH_DEPOSITS,
            "fetchWithdrawals" => Self::FETCH_WITHDRAWALS,
            "withdraw" => Self::WITHDRAW,
            "transfer" => Self::TRANSFER,
            "fetchAccounts" => Self::FETCH_ACCOUNTS,
            "fetchDepositAddress" => Self::FETCH_DEPOSIT_ADDRESS,
            "fetchTradingFees" => Self::FETCH_TRADING_FEES,
            _ => return None,
        };
        Some(self.contains(flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_by_name() {
        let caps = Capabilities::market_data() | Capabilities::CREATE_ORDER;
        assert_eq!(caps.has("fetchTicker"), Some(true));
        assert_eq!(caps.has("createOrder"), Some(true));
        assert_eq!(caps.has("withdraw"), Some(false));
        assert_eq!(caps.has("noSuchMethod"), None);
    }

    #[test]
    fn test_subsets_disjoint_from_unset() {
        let caps = Capabilities::trading();
        assert!(caps.contains(Capabilities::CREATE_ORDER));
        assert!(!caps.contains(Capabilities::FETCH_TICKER));
    }
}
