//! The unified exchange trait.
//!
//! One parameter/return contract per operation across all venues; every
//! return shape is a canonical structure from [`crate::types`]. Defaults
//! return `NotSupported`, so an adapter implements exactly the surface
//! its [`VenueSpec`](crate::describe::VenueSpec) capabilities declare,
//! and callers feature-detect via [`Exchange::has`] before calling.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::describe::VenueSpec;
use crate::error::{Error, Result};
use crate::types::{
    Account, Balance, Currency, DepositAddress, FundingRate, LedgerEntry, LeverageTier, Market,
    Ohlcv, Order, OrderBook, OrderRequest, Position, Ticker, Trade, TradingFee, Transaction,
    TransferEntry,
};

/// Owned exchange trait object.
pub type BoxedExchange = Box<dyn Exchange>;

/// Shared exchange trait object.
pub type ArcExchange = Arc<dyn Exchange>;

fn unsupported<T>(spec: &VenueSpec, method: &str) -> Result<T> {
    Err(Error::not_supported(format!(
        "{} does not implement {method}",
        spec.id
    )))
}

/// Unified, venue-agnostic exchange interface.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// The venue's immutable description record.
    fn spec(&self) -> &VenueSpec;

    /// Venue id (lowercase, URL-safe).
    fn id(&self) -> &str {
        &self.spec().id
    }

    /// Human-readable venue name.
    fn name(&self) -> &str {
        &self.spec().name
    }

    /// Whether a unified method (camelCase name) is declared supported.
    ///
    /// `None` means the name is not a unified method at all.
    fn has(&self, method: &str) -> Option<bool> {
        self.spec().capabilities.has(method)
    }

    // ==================== markets ====================

    /// Fetches the venue's market list.
    async fn fetch_markets(&self) -> Result<Vec<Market>> {
        unsupported(self.spec(), "fetch_markets")
    }

    /// Fetches the venue's currency list.
    async fn fetch_currencies(&self) -> Result<Vec<Currency>> {
        unsupported(self.spec(), "fetch_currencies")
    }

    /// Loads (or returns the cached) market set.
    ///
    /// Concurrent callers are de-duplicated; `reload` forces a refetch.
    async fn load_markets(&self, reload: bool) -> Result<HashMap<String, Arc<Market>>> {
        let _ = reload;
        unsupported(self.spec(), "load_markets")
    }

    /// Fetches the venue's server time in milliseconds.
    async fn fetch_time(&self) -> Result<i64> {
        unsupported(self.spec(), "fetch_time")
    }

    // ==================== market data ====================

    /// Fetches the 24h ticker for one symbol.
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker> {
        let _ = symbol;
        unsupported(self.spec(), "fetch_ticker")
    }

    /// Fetches 24h tickers, optionally restricted to `symbols`.
    async fn fetch_tickers(&self, symbols: Option<&[&str]>) -> Result<Vec<Ticker>> {
        let _ = symbols;
        unsupported(self.spec(), "fetch_tickers")
    }

    /// Fetches an order book snapshot.
    async fn fetch_order_book(&self, symbol: &str, limit: Option<u32>) -> Result<OrderBook> {
        let _ = (symbol, limit);
        unsupported(self.spec(), "fetch_order_book")
    }

    /// Fetches recent public trades.
    async fn fetch_trades(
        &self,
        symbol: &str,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>> {
        let _ = (symbol, since, limit);
        unsupported(self.spec(), "fetch_trades")
    }

    /// Fetches OHLCV candles for a unified timeframe (`1m`, `1h`, `1d`…).
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Ohlcv>> {
        let _ = (symbol, timeframe, since, limit);
        unsupported(self.spec(), "fetch_ohlcv")
    }

    // ==================== trading ====================

    /// Fetches the account balance.
    async fn fetch_balance(&self) -> Result<Balance> {
        unsupported(self.spec(), "fetch_balance")
    }

    /// Places an order.
    async fn create_order(&self, request: &OrderRequest) -> Result<Order> {
        let _ = request;
        unsupported(self.spec(), "create_order")
    }

    /// Cancels one order.
    async fn cancel_order(&self, id: &str, symbol: Option<&str>) -> Result<Order> {
        let _ = (id, symbol);
        unsupported(self.spec(), "cancel_order")
    }

    /// Cancels several orders.
    ///
    /// Returns one entry per requested id, in order: venues report
    /// partial batch failure inside a successful envelope, and each
    /// per-item failure surfaces as the `Err` arm of its own entry
    /// rather than failing or hiding the rest of the batch.
    async fn cancel_orders(
        &self,
        ids: &[&str],
        symbol: Option<&str>,
    ) -> Result<Vec<Result<Order>>> {
        let _ = (ids, symbol);
        unsupported(self.spec(), "cancel_orders")
    }

    /// Fetches one order by id.
    async fn fetch_order(&self, id: &str, symbol: Option<&str>) -> Result<Order> {
        let _ = (id, symbol);
        unsupported(self.spec(), "fetch_order")
    }

    /// Fetches order history.
    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        let _ = (symbol, since, limit);
        unsupported(self.spec(), "fetch_orders")
    }

    /// Fetches open orders.
    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        let _ = (symbol, since, limit);
        unsupported(self.spec(), "fetch_open_orders")
    }

    /// Fetches closed orders.
    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        let _ = (symbol, since, limit);
        unsupported(self.spec(), "fetch_closed_orders")
    }

    /// Fetches the account's own trades.
    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>> {
        let _ = (symbol, since, limit);
        unsupported(self.spec(), "fetch_my_trades")
    }

    // ==================== derivatives ====================

    /// Fetches open positions, optionally restricted to `symbols`.
    async fn fetch_positions(&self, symbols: Option<&[&str]>) -> Result<Vec<Position>> {
        let _ = symbols;
        unsupported(self.spec(), "fetch_positions")
    }

    /// Fetches the current funding rate for one swap market.
    async fn fetch_funding_rate(&self, symbol: &str) -> Result<FundingRate> {
        let _ = symbol;
        unsupported(self.spec(), "fetch_funding_rate")
    }

    /// Fetches funding rates for several swap markets.
    async fn fetch_funding_rates(&self, symbols: Option<&[&str]>) -> Result<Vec<FundingRate>> {
        let _ = symbols;
        unsupported(self.spec(), "fetch_funding_rates")
    }

    /// Sets leverage for a market.
    async fn set_leverage(&self, leverage: u32, symbol: &str) -> Result<()> {
        let _ = (leverage, symbol);
        unsupported(self.spec(), "set_leverage")
    }

    /// Fetches leverage/margin tiers keyed by unified symbol.
    async fn fetch_leverage_tiers(
        &self,
        symbols: Option<&[&str]>,
    ) -> Result<HashMap<String, Vec<LeverageTier>>> {
        let _ = symbols;
        unsupported(self.spec(), "fetch_leverage_tiers")
    }

    // ==================== funding ====================

    /// Fetches account ledger movements.
    async fn fetch_ledger(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntry>> {
        let _ = (code, since, limit);
        unsupported(self.spec(), "fetch_ledger")
    }

    /// Fetches deposit history.
    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>> {
        let _ = (code, since, limit);
        unsupported(self.spec(), "fetch_deposits")
    }

    /// Fetches withdrawal history.
    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>> {
        let _ = (code, since, limit);
        unsupported(self.spec(), "fetch_withdrawals")
    }

    /// Requests a withdrawal.
    async fn withdraw(
        &self,
        code: &str,
        amount: Decimal,
        address: &str,
        tag: Option<&str>,
        network: Option<&str>,
    ) -> Result<Transaction> {
        let _ = (code, amount, address, tag, network);
        unsupported(self.spec(), "withdraw")
    }

    /// Transfers funds between accounts/wallets.
    async fn transfer(
        &self,
        code: &str,
        amount: Decimal,
        from_account: &str,
        to_account: &str,
    ) -> Result<TransferEntry> {
        let _ = (code, amount, from_account, to_account);
        unsupported(self.spec(), "transfer")
    }

    /// Fetches the venue's sub-accounts/wallets.
    async fn fetch_accounts(&self) -> Result<Vec<Account>> {
        unsupported(self.spec(), "fetch_accounts")
    }

    /// Fetches a deposit address for one currency.
    async fn fetch_deposit_address(
        &self,
        code: &str,
        network: Option<&str>,
    ) -> Result<DepositAddress> {
        let _ = (code, network);
        unsupported(self.spec(), "fetch_deposit_address")
    }

    /// Fetches per-market trading fees keyed by unified symbol.
    async fn fetch_trading_fees(&self) -> Result<HashMap<String, TradingFee>> {
        unsupported(self.spec(), "fetch_trading_fees")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capabilities;

    #[derive(Debug)]
    struct Stub {
        spec: VenueSpec,
    }

    #[async_trait]
    impl Exchange for Stub {
        fn spec(&self) -> &VenueSpec {
            &self.spec
        }
    }

    fn stub() -> Stub {
        Stub {
            spec: VenueSpec {
                id: "stub".to_string(),
                name: "Stub".to_string(),
                capabilities: Capabilities::FETCH_TICKER,
                ..VenueSpec::base()
            },
        }
    }

    #[tokio::test]
    async fn test_defaults_are_not_supported() {
        let exchange = stub();
        assert!(matches!(
            exchange.fetch_balance().await,
            Err(Error::NotSupported(_))
        ));
        assert!(matches!(
            exchange.fetch_ticker("BTC/USDT").await,
            Err(Error::NotSupported(_))
        ));
    }

    #[test]
    fn test_feature_detection() {
        let exchange = stub();
        assert_eq!(exchange.has("fetchTicker"), Some(true));
        assert_eq!(exchange.has("createOrder"), Some(false));
        assert_eq!(exchange.has("bogus"), None);
        assert_eq!(exchange.id(), "stub");
    }
}
