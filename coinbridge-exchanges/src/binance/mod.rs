//! Binance spot adapter.
//!
//! Private requests are signed with HMAC-SHA256 over the urlencoded
//! parameters with `timestamp` (and `recvWindow`) appended last; the
//! signature rides as the final query/body parameter and the API key in
//! the `X-MBX-APIKEY` header.

pub mod describe;
mod parser;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use coinbridge_core::auth::{hmac_sign, url_encode_pairs, DigestFormat, HashAlgorithm};
use coinbridge_core::config::ExchangeConfig;
use coinbridge_core::describe::VenueSpec;
use coinbridge_core::endpoint::{interpolate_path, ApiScope, Endpoint, HttpVerb};
use coinbridge_core::error::{Error, ParseError, Result};
use coinbridge_core::exchange::Exchange;
use coinbridge_core::extract::{safe_integer, safe_list, safe_string, safe_string_2};
use coinbridge_core::market_cache::MarketCache;
use coinbridge_core::time::milliseconds;
use coinbridge_core::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use coinbridge_core::types::{
    Balance, Currency, DepositAddress, Market, Ohlcv, Order, OrderBook, OrderRequest, OrderStatus,
    OrderType, Ticker, TimeInForce, Trade, TradingFee, Transaction, TransactionType,
    TransferEntry,
};

use parser::ParseContext;

/// Binance spot exchange adapter.
#[derive(Debug)]
pub struct Binance {
    spec: Arc<VenueSpec>,
    config: ExchangeConfig,
    transport: Arc<dyn HttpTransport>,
    cache: MarketCache,
}

impl Binance {
    /// Creates an adapter with the default transport.
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        Self::with_spec(describe::spec(), config)
    }

    /// Creates an adapter around an alternative venue record.
    ///
    /// Alias venues (Binance.US) reuse this implementation with a spec
    /// that overrides identity fields only.
    pub fn with_spec(spec: VenueSpec, config: ExchangeConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(spec, config, transport))
    }

    /// Creates an adapter over a custom transport (tests).
    pub fn with_transport(
        spec: VenueSpec,
        config: ExchangeConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            spec: Arc::new(spec),
            config,
            transport,
            cache: MarketCache::new(),
        }
    }

    fn recv_window(&self) -> Option<u64> {
        self.config.recv_window.or_else(|| {
            self.config
                .option_integer("recvWindow")
                .or_else(|| self.spec.options.get("recvWindow").and_then(Value::as_i64))
                .and_then(|w| u64::try_from(w).ok())
        })
    }

    fn sign(
        &self,
        endpoint: &Endpoint,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<HttpRequest> {
        let scope_key = match endpoint.scope {
            ApiScope::Public => "public",
            ApiScope::Private => "private",
        };
        let root = self.spec.api_url(scope_key, &self.config)?;

        if endpoint.scope == ApiScope::Public {
            let query = url_encode_pairs(&params);
            let url = if query.is_empty() {
                format!("{root}{path}")
            } else {
                format!("{root}{path}?{query}")
            };
            return Ok(HttpRequest {
                url,
                method: endpoint.verb,
                headers: Vec::new(),
                body: None,
            });
        }

        self.config
            .check_required_credentials(self.spec.required_credentials.password)?;
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| Error::authentication("apiKey credential is required"))?;
        let secret = self
            .config
            .secret
            .as_ref()
            .ok_or_else(|| Error::authentication("secret credential is required"))?;

        let (serialized, _signature) = sign_payload(
            secret.expose_secret(),
            milliseconds(),
            self.recv_window(),
            params,
        )?;

        let mut headers = vec![(
            "X-MBX-APIKEY".to_string(),
            api_key.expose_secret().to_string(),
        )];

        if endpoint.verb == HttpVerb::Post {
            headers.push((
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ));
            Ok(HttpRequest {
                url: format!("{root}{path}"),
                method: endpoint.verb,
                headers,
                body: Some(serialized),
            })
        } else {
            Ok(HttpRequest {
                url: format!("{root}{path}?{serialized}"),
                method: endpoint.verb,
                headers,
                body: None,
            })
        }
    }

    /// Classifies a venue error response.
    fn handle_errors(&self, response: &HttpResponse) -> Result<()> {
        let body: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
        let code = safe_string(&body, "code");
        let message = safe_string_2(&body, "msg", "message");

        let code_failed = code
            .as_deref()
            .is_some_and(|c| !matches!(c, "0" | "200"));
        if response.is_success() && !code_failed {
            return Ok(());
        }

        let detail = format!("{} {}", self.spec.id, response.body);
        if let Some(kind) = self
            .spec
            .exceptions
            .classify(code.as_deref(), message.as_deref())
        {
            return Err(Error::from_kind(kind, detail));
        }
        Err(match response.status {
            418 => Error::from_kind(coinbridge_core::ErrorKind::DdosProtection, detail),
            429 => Error::from_kind(coinbridge_core::ErrorKind::RateLimitExceeded, detail),
            500..=599 => Error::exchange_not_available(detail),
            _ => Error::exchange(detail),
        })
    }

    async fn request(
        &self,
        operation: &'static str,
        params: Vec<(String, String)>,
    ) -> Result<Value> {
        let endpoint = self.spec.endpoints.resolve(operation)?;
        let (path, params) = interpolate_path(endpoint.path, params);
        let request = self.sign(endpoint, &path, params)?;
        debug!(venue = %self.spec.id, operation, weight = endpoint.weight, "dispatching");
        let response = self.transport.request(request).await?;
        self.handle_errors(&response)?;
        serde_json::from_str(&response.body).map_err(|e| Error::from(ParseError::from(e)))
    }

    async fn resolve_market(&self, symbol: &str) -> Result<Arc<Market>> {
        self.load_markets(false).await?;
        self.cache.market(symbol).await
    }

    async fn parse_ctx(&self) -> HashMap<String, Arc<Market>> {
        self.cache.markets_by_id().await
    }

    fn build_order(market: &Market, request: &OrderRequest) -> Result<Vec<(String, String)>> {
        let is_trigger = request.trigger_price.is_some();
        let venue_type = match (&request.order_type, request.post_only, is_trigger) {
            (OrderType::Limit, Some(true), false) => "LIMIT_MAKER",
            (OrderType::Limit, _, false) => "LIMIT",
            (OrderType::Limit, _, true) => "STOP_LOSS_LIMIT",
            (OrderType::Market, _, false) => "MARKET",
            (OrderType::Market, _, true) => "STOP_LOSS",
            (OrderType::Other(t), ..) => {
                return Err(Error::invalid_order(format!(
                    "binance does not accept order type {t}"
                )));
            }
        };

        let mut params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("side".to_string(), request.side.to_string().to_uppercase()),
            ("type".to_string(), venue_type.to_string()),
            (
                "quantity".to_string(),
                market.amount_to_precision(request.amount)?,
            ),
        ];
        if matches!(request.order_type, OrderType::Limit) {
            let price = request
                .price
                .ok_or_else(|| Error::invalid_order("binance requires a price for limit orders"))?;
            params.push(("price".to_string(), market.price_to_precision(price)?));
            if venue_type != "LIMIT_MAKER" {
                let tif = request.time_in_force.unwrap_or(TimeInForce::Gtc);
                let tif = match tif {
                    TimeInForce::Po => TimeInForce::Gtc,
                    other => other,
                };
                params.push(("timeInForce".to_string(), tif.to_string()));
            }
        }
        if let Some(trigger) = request.trigger_price {
            params.push(("stopPrice".to_string(), market.price_to_precision(trigger)?));
        }
        if let Some(client_order_id) = &request.client_order_id {
            params.push(("newClientOrderId".to_string(), client_order_id.clone()));
        }
        Ok(params)
    }

    fn since_limit_params(
        params: &mut Vec<(String, String)>,
        since: Option<i64>,
        limit: Option<u32>,
    ) {
        if let Some(since) = since {
            params.push(("startTime".to_string(), since.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
    }
}

/// Canonicalizes and signs one private request payload.
///
/// The message is the urlencoded parameters in insertion order with
/// `timestamp` appended, then `recvWindow` when configured; the venue
/// verifies this exact byte sequence, so parameter order is load-bearing.
pub(crate) fn sign_payload(
    secret: &str,
    timestamp: i64,
    recv_window: Option<u64>,
    params: Vec<(String, String)>,
) -> Result<(String, String)> {
    let mut total = params;
    total.push(("timestamp".to_string(), timestamp.to_string()));
    if let Some(window) = recv_window {
        total.push(("recvWindow".to_string(), window.to_string()));
    }

    let payload = url_encode_pairs(&total);
    let signature = hmac_sign(&payload, secret, HashAlgorithm::Sha256, DigestFormat::Hex)?;
    total.push(("signature".to_string(), signature.clone()));
    Ok((url_encode_pairs(&total), signature))
}

#[async_trait]
impl Exchange for Binance {
    fn spec(&self) -> &VenueSpec {
        &self.spec
    }

    async fn fetch_time(&self) -> Result<i64> {
        let response = self.request("fetchTime", Vec::new()).await?;
        safe_integer(&response, "serverTime")
            .ok_or_else(|| Error::from(ParseError::missing_field("serverTime")))
    }

    async fn fetch_markets(&self) -> Result<Vec<Market>> {
        let response = self.request("fetchMarkets", Vec::new()).await?;
        safe_list(&response, "symbols")
            .unwrap_or_default()
            .iter()
            .map(|entry| parser::parse_market(entry, &self.spec))
            .collect()
    }

    async fn fetch_currencies(&self) -> Result<Vec<Currency>> {
        let response = self.request("fetchCurrencies", Vec::new()).await?;
        response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_currency(entry, &self.spec))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn load_markets(&self, reload: bool) -> Result<HashMap<String, Arc<Market>>> {
        self.cache
            .load_with(&self.spec.id, reload, || async {
                let response = self.request("fetchMarkets", Vec::new()).await?;
                let markets = safe_list(&response, "symbols")
                    .unwrap_or_default()
                    .iter()
                    .map(|entry| parser::parse_market(entry, &self.spec))
                    .collect::<Result<Vec<_>>>()?;
                // Currency metadata needs a private endpoint; markets
                // alone are enough for symbol resolution.
                Ok((markets, None))
            })
            .await
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker> {
        let market = self.resolve_market(symbol).await?;
        let params = vec![("symbol".to_string(), market.id.clone())];
        let response = self.request("fetchTickers", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_ticker(&response, Some(&market), &ctx))
    }

    async fn fetch_tickers(&self, symbols: Option<&[&str]>) -> Result<Vec<Ticker>> {
        self.load_markets(false).await?;
        let response = self.request("fetchTickers", Vec::new()).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        let tickers: Vec<Ticker> = response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_ticker(entry, None, &ctx))
                    .collect()
            })
            .unwrap_or_default();
        match symbols {
            Some(wanted) => Ok(tickers
                .into_iter()
                .filter(|t| t.symbol.as_deref().is_some_and(|s| wanted.contains(&s)))
                .collect()),
            None => Ok(tickers),
        }
    }

    async fn fetch_order_book(&self, symbol: &str, limit: Option<u32>) -> Result<OrderBook> {
        let market = self.resolve_market(symbol).await?;
        let mut params = vec![("symbol".to_string(), market.id.clone())];
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        let response = self.request("fetchOrderBook", params).await?;
        Ok(parser::parse_order_book(
            &response,
            market.symbol.clone(),
            milliseconds(),
        ))
    }

    async fn fetch_trades(
        &self,
        symbol: &str,
        _since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>> {
        let market = self.resolve_market(symbol).await?;
        let mut params = vec![("symbol".to_string(), market.id.clone())];
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        let response = self.request("fetchTrades", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_trade(entry, Some(&market), &ctx))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Ohlcv>> {
        let market = self.resolve_market(symbol).await?;
        let interval = self.spec.timeframe(timeframe)?;
        let mut params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("interval".to_string(), interval),
        ];
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request("fetchOHLCV", params).await?;
        Ok(response
            .as_array()
            .map(|rows| rows.iter().filter_map(parser::parse_ohlcv).collect())
            .unwrap_or_default())
    }

    async fn fetch_balance(&self) -> Result<Balance> {
        self.load_markets(false).await?;
        let response = self.request("fetchBalance", Vec::new()).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_balance(&response, &ctx))
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<Order> {
        let market = self.resolve_market(&request.symbol).await?;
        let params = Self::build_order(&market, request)?;
        let response = self.request("createOrder", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_order(&response, Some(&market), &ctx))
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>) -> Result<Order> {
        let symbol = symbol.ok_or_else(|| {
            Error::arguments_required("binance cancelOrder() requires a symbol argument")
        })?;
        let market = self.resolve_market(symbol).await?;
        let params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("orderId".to_string(), id.to_string()),
        ];
        let response = self.request("cancelOrder", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_order(&response, Some(&market), &ctx))
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>) -> Result<Order> {
        let symbol = symbol.ok_or_else(|| {
            Error::arguments_required("binance fetchOrder() requires a symbol argument")
        })?;
        let market = self.resolve_market(symbol).await?;
        let params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("orderId".to_string(), id.to_string()),
        ];
        let response = self.request("fetchOrder", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_order(&response, Some(&market), &ctx))
    }

    async fn fetch_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        let symbol = symbol.ok_or_else(|| {
            Error::arguments_required("binance fetchOrders() requires a symbol argument")
        })?;
        let market = self.resolve_market(symbol).await?;
        let mut params = vec![("symbol".to_string(), market.id.clone())];
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request("fetchOrders", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_order(entry, Some(&market), &ctx))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        _since: Option<i64>,
        _limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        self.load_markets(false).await?;
        let market = match symbol {
            Some(symbol) => Some(self.cache.market(symbol).await?),
            None => None,
        };
        let mut params = Vec::new();
        if let Some(market) = &market {
            params.push(("symbol".to_string(), market.id.clone()));
        }
        let response = self.request("fetchOpenOrders", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_order(entry, market.as_deref(), &ctx))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_closed_orders(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        let orders = self.fetch_orders(symbol, since, limit).await?;
        Ok(orders
            .into_iter()
            .filter(|o| {
                matches!(
                    o.status,
                    Some(OrderStatus::Closed | OrderStatus::Canceled | OrderStatus::Expired)
                )
            })
            .collect())
    }

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>> {
        let symbol = symbol.ok_or_else(|| {
            Error::arguments_required("binance fetchMyTrades() requires a symbol argument")
        })?;
        let market = self.resolve_market(symbol).await?;
        let mut params = vec![("symbol".to_string(), market.id.clone())];
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request("fetchMyTrades", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_trade(entry, Some(&market), &ctx))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_deposits(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>> {
        let mut params = Vec::new();
        if let Some(code) = code {
            params.push(("coin".to_string(), code.to_string()));
        }
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request("fetchDeposits", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_transaction(entry, TransactionType::Deposit, &ctx))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_withdrawals(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Transaction>> {
        let mut params = Vec::new();
        if let Some(code) = code {
            params.push(("coin".to_string(), code.to_string()));
        }
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request("fetchWithdrawals", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| {
                        parser::parse_transaction(entry, TransactionType::Withdrawal, &ctx)
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn withdraw(
        &self,
        code: &str,
        amount: Decimal,
        address: &str,
        tag: Option<&str>,
        network: Option<&str>,
    ) -> Result<Transaction> {
        let mut params = vec![
            ("coin".to_string(), code.to_string()),
            ("address".to_string(), address.to_string()),
            (
                "amount".to_string(),
                coinbridge_core::precise::number_to_string(amount),
            ),
        ];
        if let Some(tag) = tag {
            params.push(("addressTag".to_string(), tag.to_string()));
        }
        let network = network
            .map(str::to_string)
            .or_else(|| self.config.default_network.clone());
        if let Some(network) = network {
            let venue_network = self
                .spec
                .networks
                .get(&network)
                .cloned()
                .unwrap_or(network);
            params.push(("network".to_string(), venue_network));
        }
        let response = self.request("withdraw", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_transaction(
            &response,
            TransactionType::Withdrawal,
            &ctx,
        ))
    }

    async fn transfer(
        &self,
        code: &str,
        amount: Decimal,
        from_account: &str,
        to_account: &str,
    ) -> Result<TransferEntry> {
        // The venue encodes the route as a single transfer-type token.
        let transfer_type = format!(
            "{}_{}",
            from_account.to_uppercase(),
            to_account.to_uppercase()
        );
        let params = vec![
            ("type".to_string(), transfer_type),
            ("asset".to_string(), code.to_string()),
            (
                "amount".to_string(),
                coinbridge_core::precise::number_to_string(amount),
            ),
        ];
        let response = self.request("transfer", params).await?;
        Ok(parser::parse_transfer(
            &response,
            Some(code.to_string()),
            Some(amount),
            Some(from_account.to_string()),
            Some(to_account.to_string()),
        ))
    }

    async fn fetch_deposit_address(
        &self,
        code: &str,
        network: Option<&str>,
    ) -> Result<DepositAddress> {
        let mut params = vec![("coin".to_string(), code.to_string())];
        let network = network
            .map(str::to_string)
            .or_else(|| self.config.default_network.clone());
        if let Some(network) = &network {
            let venue_network = self
                .spec
                .networks
                .get(network)
                .cloned()
                .unwrap_or_else(|| network.clone());
            params.push(("network".to_string(), venue_network));
        }
        let response = self.request("fetchDepositAddress", params).await?;
        parser::parse_deposit_address(&response, Some(code.to_string()), network)
    }

    async fn fetch_trading_fees(&self) -> Result<HashMap<String, TradingFee>> {
        self.load_markets(false).await?;
        let response = self.request("fetchTradingFees", Vec::new()).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        let mut fees = HashMap::new();
        for entry in response.as_array().map(Vec::as_slice).unwrap_or_default() {
            let fee = parser::parse_trading_fee(entry, &ctx);
            if let Some(symbol) = fee.symbol.clone() {
                fees.insert(symbol, fee);
            }
        }
        Ok(fees)
    }
}
