//! HashKey Global adapter.
//!
//! Spot and linear perpetual markets (`BTCUSDT-PERPETUAL` maps to
//! `BTC/USDT:USDT`). Private requests are signed with HMAC-SHA256 over
//! the urlencoded parameters, timestamp first; the canonical encoding
//! keeps `,` literal, which matters for the batch-cancel id list. The
//! API key travels in the `X-HK-APIKEY` header.

pub mod describe;
mod parser;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use coinbridge_core::auth::{
    hmac_sign, url_encode_pairs, url_encode_pairs_comma, DigestFormat, HashAlgorithm,
};
use coinbridge_core::config::ExchangeConfig;
use coinbridge_core::describe::VenueSpec;
use coinbridge_core::endpoint::{interpolate_path, ApiScope, Endpoint, HttpVerb};
use coinbridge_core::error::{Error, ParseError, Result};
use coinbridge_core::exchange::Exchange;
use coinbridge_core::extract::{safe_list, safe_string, safe_string_2};
use coinbridge_core::market_cache::MarketCache;
use coinbridge_core::time::milliseconds;
use coinbridge_core::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use coinbridge_core::types::{
    Account, Balance, Currency, DepositAddress, FundingRate, LedgerEntry, LeverageTier, Market,
    MarketType, Ohlcv, Order, OrderBook, OrderRequest, OrderSide, OrderStatus, OrderType,
    Position, Ticker, TimeInForce, Trade, Transaction, TransactionType, TransferEntry,
};

use parser::ParseContext;

/// Venue success code in enveloped responses.
const SUCCESS_CODES: [&str; 3] = ["0000", "0", "200"];

/// HashKey Global exchange adapter.
#[derive(Debug)]
pub struct HashKey {
    spec: Arc<VenueSpec>,
    config: ExchangeConfig,
    transport: Arc<dyn HttpTransport>,
    cache: MarketCache,
}

impl HashKey {
    /// Creates an adapter with the default transport.
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(describe::spec(), config, transport))
    }

    /// Creates an adapter over a custom spec and transport.
    ///
    /// Used by alias venues and by tests that inject a mock transport.
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
                .and_then(|w| u64::try_from(w).ok())
        })
    }

    /// Builds the signed request descriptor for one endpoint call.
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
            "X-HK-APIKEY".to_string(),
            api_key.expose_secret().to_string(),
        )];

        if endpoint.verb == HttpVerb::Get {
            Ok(HttpRequest {
                url: format!("{root}{path}?{serialized}"),
                method: endpoint.verb,
                headers,
                body: None,
            })
        } else {
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
        }
    }

    /// Classifies a venue error response.
    ///
    /// The venue reports failures both through HTTP status and through a
    /// `code` field inside a `200 OK` envelope; both paths land here.
    fn handle_errors(&self, response: &HttpResponse) -> Result<()> {
        let body: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
        let code = safe_string(&body, "code");
        let message = safe_string_2(&body, "msg", "message");

        let code_failed = code
            .as_deref()
            .is_some_and(|c| !SUCCESS_CODES.contains(&c));
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

    /// Resolves, signs, dispatches and decodes one endpoint call.
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
        serde_json::from_str(&response.body)
            .map_err(|e| Error::from(ParseError::from(e)))
    }

    async fn parse_ctx(&self) -> HashMap<String, Arc<Market>> {
        self.cache.markets_by_id().await
    }

    async fn resolve_market(&self, symbol: &str) -> Result<Arc<Market>> {
        self.load_markets(false).await?;
        self.cache.market(symbol).await
    }

    /// Rejects the venue-specific misuse of the `type` parameter.
    ///
    /// A few swap endpoints use `type` for the order subtype, while the
    /// unified contract reserves it for the market type; a value that
    /// names neither market type is a caller bug caught before any
    /// network call.
    fn check_type_param(&self, method: &str, params: &HashMap<String, Value>) -> Result<()> {
        if let Some(Value::String(t)) = params.get("type") {
            if t != "spot" && t != "swap" {
                return Err(Error::bad_request(format!(
                    "{} {method}() type parameter cannot be \"{t}\"; it selects the market \
                     type (\"spot\" or \"swap\"); use the trigger parameter for trigger orders",
                    self.spec.id
                )));
            }
        }
        Ok(())
    }

    /// Market scope for methods callable without a symbol: the market's
    /// own type when one is resolved, otherwise the configured default
    /// (`type`/`defaultType` option), otherwise spot.
    fn market_type_for(&self, market: Option<&Market>) -> MarketType {
        if let Some(market) = market {
            return market.market_type;
        }
        match self
            .config
            .option_str("type")
            .or_else(|| self.config.option_str("defaultType"))
            .as_deref()
        {
            Some("swap") => MarketType::Swap,
            _ => MarketType::Spot,
        }
    }

    fn build_spot_order(market: &Market, request: &OrderRequest) -> Result<Vec<(String, String)>> {
        let venue_type = match (&request.order_type, request.post_only) {
            (OrderType::Limit, Some(true)) => "LIMIT_MAKER",
            (OrderType::Limit, _) => "LIMIT",
            (OrderType::Market, _) => "MARKET",
            (OrderType::Other(t), _) => {
                return Err(Error::invalid_order(format!(
                    "hashkey does not accept spot order type {t}"
                )));
            }
        };

        let mut params = vec![
            ("symbol".to_string(), market.id.clone()),
            (
                "side".to_string(),
                request.side.to_string().to_uppercase(),
            ),
            ("type".to_string(), venue_type.to_string()),
            (
                "quantity".to_string(),
                market.amount_to_precision(request.amount)?,
            ),
        ];
        if let OrderType::Limit = request.order_type {
            let price = request.price.ok_or_else(|| {
                Error::invalid_order("hashkey requires a price for limit orders")
            })?;
            params.push(("price".to_string(), market.price_to_precision(price)?));
        }
        if let Some(tif) = request.time_in_force {
            if request.post_only != Some(true) {
                params.push(("timeInForce".to_string(), tif.to_string()));
            }
        }
        if let Some(client_order_id) = &request.client_order_id {
            params.push(("newClientOrderId".to_string(), client_order_id.clone()));
        }
        Ok(params)
    }

    fn build_swap_order(market: &Market, request: &OrderRequest) -> Result<Vec<(String, String)>> {
        let close = request.reduce_only.unwrap_or(false);
        let side = match (request.side, close) {
            (OrderSide::Buy, false) => "BUY_OPEN",
            (OrderSide::Buy, true) => "BUY_CLOSE",
            (OrderSide::Sell, false) => "SELL_OPEN",
            (OrderSide::Sell, true) => "SELL_CLOSE",
        };

        let is_trigger = request.trigger_price.is_some();
        let venue_type = if is_trigger { "STOP" } else { "LIMIT" };
        let price_type = match request.order_type {
            OrderType::Market => "MARKET",
            _ => "INPUT",
        };

        let mut params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("side".to_string(), side.to_string()),
            ("type".to_string(), venue_type.to_string()),
            ("priceType".to_string(), price_type.to_string()),
            (
                "quantity".to_string(),
                market.amount_to_precision(request.amount)?,
            ),
        ];
        if let Some(price) = request.price {
            params.push(("price".to_string(), market.price_to_precision(price)?));
        }
        if let Some(trigger) = request.trigger_price {
            params.push(("stopPrice".to_string(), market.price_to_precision(trigger)?));
        }
        let tif = match (request.post_only, request.time_in_force) {
            (Some(true), _) => Some("LIMIT_MAKER".to_string()),
            (_, Some(TimeInForce::Po)) => Some("LIMIT_MAKER".to_string()),
            (_, Some(tif)) => Some(tif.to_string()),
            _ => None,
        };
        if let Some(tif) = tif {
            params.push(("timeInForce".to_string(), tif));
        }
        if let Some(client_order_id) = &request.client_order_id {
            params.push(("clientOrderId".to_string(), client_order_id.clone()));
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
/// Returns the final serialized parameter string (signature appended)
/// and the signature itself. The message layout is `timestamp` first,
/// then `recvWindow` when configured, then the call parameters, all
/// urlencoded with `,` kept literal; the venue verifies this exact
/// byte sequence.
pub(crate) fn sign_payload(
    secret: &str,
    timestamp: i64,
    recv_window: Option<u64>,
    params: Vec<(String, String)>,
) -> Result<(String, String)> {
    let mut total = vec![("timestamp".to_string(), timestamp.to_string())];
    if let Some(window) = recv_window {
        total.push(("recvWindow".to_string(), window.to_string()));
    }
    total.extend(params);

    let payload = url_encode_pairs_comma(&total);
    let signature = hmac_sign(&payload, secret, HashAlgorithm::Sha256, DigestFormat::Hex)?;
    total.push(("signature".to_string(), signature.clone()));
    Ok((url_encode_pairs_comma(&total), signature))
}

#[async_trait]
impl Exchange for HashKey {
    fn spec(&self) -> &VenueSpec {
        &self.spec
    }

    async fn fetch_time(&self) -> Result<i64> {
        let response = self.request("fetchTime", Vec::new()).await?;
        coinbridge_core::extract::safe_integer(&response, "serverTime")
            .ok_or_else(|| Error::from(ParseError::missing_field("serverTime")))
    }

    async fn fetch_markets(&self) -> Result<Vec<Market>> {
        let response = self.request("fetchMarkets", Vec::new()).await?;
        let mut markets = Vec::new();
        for key in ["symbols", "contracts"] {
            for entry in safe_list(&response, key).unwrap_or_default() {
                markets.push(parser::parse_market(entry, &self.spec)?);
            }
        }
        Ok(markets)
    }

    async fn fetch_currencies(&self) -> Result<Vec<Currency>> {
        let response = self.request("fetchMarkets", Vec::new()).await?;
        safe_list(&response, "coins")
            .unwrap_or_default()
            .iter()
            .map(|entry| parser::parse_currency(entry, &self.spec))
            .collect()
    }

    async fn load_markets(&self, reload: bool) -> Result<HashMap<String, Arc<Market>>> {
        self.cache
            .load_with(&self.spec.id, reload, || async {
                let response = self.request("fetchMarkets", Vec::new()).await?;
                let mut markets = Vec::new();
                for key in ["symbols", "contracts"] {
                    for entry in safe_list(&response, key).unwrap_or_default() {
                        markets.push(parser::parse_market(entry, &self.spec)?);
                    }
                }
                let currencies = safe_list(&response, "coins")
                    .unwrap_or_default()
                    .iter()
                    .map(|entry| parser::parse_currency(entry, &self.spec))
                    .collect::<Result<Vec<_>>>()?;
                Ok((markets, Some(currencies)))
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
        let entry = response
            .as_array()
            .and_then(|list| list.first())
            .ok_or_else(|| Error::bad_symbol(format!("no ticker returned for {symbol}")))?;
        Ok(parser::parse_ticker(entry, Some(&market), &ctx))
    }

    async fn fetch_tickers(&self, symbols: Option<&[&str]>) -> Result<Vec<Ticker>> {
        self.load_markets(false).await?;
        let response = self.request("fetchTickers", Vec::new()).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        let tickers = response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_ticker(entry, None, &ctx))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        match symbols {
            Some(wanted) => Ok(tickers
                .into_iter()
                .filter(|t| {
                    t.symbol
                        .as_deref()
                        .is_some_and(|s| wanted.contains(&s))
                })
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
        Ok(parser::parse_order_book(&response, market.symbol.clone()))
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
        let mut params = Vec::new();
        if let Some(account_id) = self.config.option_str("accountId") {
            params.push(("accountId".to_string(), account_id));
        }
        let response = self.request("fetchBalance", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_balance(&response, &ctx))
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<Order> {
        self.check_type_param("createOrder", &request.params)?;
        let market = self.resolve_market(&request.symbol).await?;

        let (operation, params) = match market.market_type {
            MarketType::Swap => ("createSwapOrder", Self::build_swap_order(&market, request)?),
            MarketType::Spot => ("createSpotOrder", Self::build_spot_order(&market, request)?),
            other => {
                return Err(Error::not_supported(format!(
                    "hashkey createOrder() is not supported for {other} markets"
                )));
            }
        };

        let response = self.request(operation, params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_order(&response, Some(&market), &ctx))
    }

    async fn cancel_order(&self, id: &str, symbol: Option<&str>) -> Result<Order> {
        let market = match symbol {
            Some(symbol) => Some(self.resolve_market(symbol).await?),
            None => None,
        };
        let operation = match self.market_type_for(market.as_deref()) {
            MarketType::Swap => "cancelSwapOrder",
            _ => "cancelSpotOrder",
        };
        let params = vec![("orderId".to_string(), id.to_string())];
        let response = self.request(operation, params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_order(&response, market.as_deref(), &ctx))
    }

    async fn cancel_orders(
        &self,
        ids: &[&str],
        symbol: Option<&str>,
    ) -> Result<Vec<Result<Order>>> {
        if let Some(symbol) = symbol {
            self.resolve_market(symbol).await?;
        }
        let params = vec![("ids".to_string(), ids.join(","))];
        let response = self.request("cancelSpotOrdersByIds", params).await?;

        // The venue reports per-item outcomes inside a 200 envelope;
        // each failed id becomes its own error entry, the rest parse.
        let results = safe_list(&response, "result").unwrap_or_default();
        let outcome_by_id: HashMap<String, Option<String>> = results
            .iter()
            .filter_map(|item| {
                safe_string(item, "orderId").map(|id| (id, safe_string(item, "code")))
            })
            .collect();

        Ok(ids
            .iter()
            .map(|id| {
                let code = outcome_by_id.get(*id).cloned().flatten();
                match code {
                    Some(code) if !SUCCESS_CODES.contains(&code.as_str()) => {
                        let detail = format!("{} order {id} code {code}", self.spec.id);
                        Err(match self.spec.exceptions.classify(Some(&code), None) {
                            Some(kind) => Error::from_kind(kind, detail),
                            None => Error::exchange(detail),
                        })
                    }
                    _ => Ok(Order {
                        id: Some((*id).to_string()),
                        status: Some(OrderStatus::Canceled),
                        ..Order::default()
                    }),
                }
            })
            .collect())
    }

    async fn fetch_order(&self, id: &str, symbol: Option<&str>) -> Result<Order> {
        let market = match symbol {
            Some(symbol) => Some(self.resolve_market(symbol).await?),
            None => None,
        };
        let operation = match self.market_type_for(market.as_deref()) {
            MarketType::Swap => "fetchSwapOrder",
            _ => "fetchSpotOrder",
        };
        let params = vec![("orderId".to_string(), id.to_string())];
        let response = self.request(operation, params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(parser::parse_order(&response, market.as_deref(), &ctx))
    }

    async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
        _since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Order>> {
        self.load_markets(false).await?;
        let market = match symbol {
            Some(symbol) => Some(self.cache.market(symbol).await?),
            None => None,
        };
        let operation = match self.market_type_for(market.as_deref()) {
            MarketType::Swap => "fetchSwapOpenOrders",
            _ => "fetchSpotOpenOrders",
        };
        let mut params = Vec::new();
        if let Some(market) = &market {
            params.push(("symbol".to_string(), market.id.clone()));
        }
        if let Some(limit) = limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        let response = self.request(operation, params).await?;
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
        self.load_markets(false).await?;
        let market = match symbol {
            Some(symbol) => Some(self.cache.market(symbol).await?),
            None => None,
        };
        let operation = match self.market_type_for(market.as_deref()) {
            MarketType::Swap => "fetchSwapHistoryOrders",
            _ => "fetchSpotTradeOrders",
        };
        let mut params = Vec::new();
        if let Some(market) = &market {
            params.push(("symbol".to_string(), market.id.clone()));
        }
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request(operation, params).await?;
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

    async fn fetch_my_trades(
        &self,
        symbol: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<Trade>> {
        self.load_markets(false).await?;
        let market = match symbol {
            Some(symbol) => Some(self.cache.market(symbol).await?),
            None => None,
        };
        let market_type = self.market_type_for(market.as_deref());
        // Derivative trade history is per-contract on this venue; spot
        // history is account-wide.
        if market_type == MarketType::Swap && market.is_none() {
            return Err(Error::arguments_required(
                "hashkey fetchMyTrades() requires a symbol for swap markets",
            ));
        }
        let operation = match market_type {
            MarketType::Swap => "fetchSwapMyTrades",
            _ => "fetchSpotMyTrades",
        };
        let mut params = Vec::new();
        if let Some(market) = &market {
            params.push(("symbol".to_string(), market.id.clone()));
        }
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request(operation, params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_trade(entry, market.as_deref(), &ctx))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_positions(&self, symbols: Option<&[&str]>) -> Result<Vec<Position>> {
        self.load_markets(false).await?;
        let mut params = Vec::new();
        if let Some([symbol]) = symbols {
            let market = self.cache.market(symbol).await?;
            params.push(("symbol".to_string(), market.id.clone()));
        }
        let response = self.request("fetchPositions", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        let positions: Vec<Position> = response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_position(entry, None, &ctx))
                    .collect()
            })
            .unwrap_or_default();
        match symbols {
            Some(wanted) if wanted.len() > 1 => Ok(positions
                .into_iter()
                .filter(|p| p.symbol.as_deref().is_some_and(|s| wanted.contains(&s)))
                .collect()),
            _ => Ok(positions),
        }
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<FundingRate> {
        let market = self.resolve_market(symbol).await?;
        if !market.is_contract() {
            return Err(Error::bad_symbol(format!(
                "hashkey fetchFundingRate() requires a swap symbol, got {symbol}"
            )));
        }
        let params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("timestamp".to_string(), milliseconds().to_string()),
        ];
        let response = self.request("fetchFundingRates", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        let entry = response
            .as_array()
            .and_then(|list| list.first())
            .ok_or_else(|| Error::bad_symbol(format!("no funding rate returned for {symbol}")))?;
        Ok(parser::parse_funding_rate(entry, Some(&market), &ctx))
    }

    async fn fetch_funding_rates(&self, symbols: Option<&[&str]>) -> Result<Vec<FundingRate>> {
        self.load_markets(false).await?;
        let params = vec![("timestamp".to_string(), milliseconds().to_string())];
        let response = self.request("fetchFundingRates", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        let rates: Vec<FundingRate> = response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_funding_rate(entry, None, &ctx))
                    .collect()
            })
            .unwrap_or_default();
        match symbols {
            Some(wanted) => Ok(rates
                .into_iter()
                .filter(|r| r.symbol.as_deref().is_some_and(|s| wanted.contains(&s)))
                .collect()),
            None => Ok(rates),
        }
    }

    async fn set_leverage(&self, leverage: u32, symbol: &str) -> Result<()> {
        let market = self.resolve_market(symbol).await?;
        if !market.is_contract() {
            return Err(Error::bad_symbol(
                "hashkey setLeverage() requires a swap symbol",
            ));
        }
        let params = vec![
            ("symbol".to_string(), market.id.clone()),
            ("leverage".to_string(), leverage.to_string()),
        ];
        self.request("setLeverage", params).await?;
        Ok(())
    }

    async fn fetch_leverage_tiers(
        &self,
        symbols: Option<&[&str]>,
    ) -> Result<HashMap<String, Vec<LeverageTier>>> {
        self.load_markets(false).await?;
        let response = self.request("fetchMarkets", Vec::new()).await?;
        let mut tiers = HashMap::new();
        for entry in safe_list(&response, "contracts").unwrap_or_default() {
            let market = parser::parse_market(entry, &self.spec)?;
            if let Some(wanted) = symbols {
                if !wanted.contains(&market.symbol.as_str()) {
                    continue;
                }
            }
            let market_tiers = parser::parse_leverage_tiers(entry, &market);
            if !market_tiers.is_empty() {
                tiers.insert(market.symbol.clone(), market_tiers);
            }
        }
        Ok(tiers)
    }

    async fn fetch_ledger(
        &self,
        code: Option<&str>,
        since: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntry>> {
        self.load_markets(false).await?;
        let mut params = Vec::new();
        if let Some(code) = code {
            if let Some(currency) = self.cache.currency(code).await {
                params.push(("coinId".to_string(), currency.id.clone()));
            }
        }
        Self::since_limit_params(&mut params, since, limit);
        let response = self.request("fetchLedger", params).await?;
        let markets_by_id = self.parse_ctx().await;
        let ctx = ParseContext {
            spec: &self.spec,
            markets_by_id: &markets_by_id,
        };
        Ok(response
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|entry| parser::parse_ledger_entry(entry, &ctx))
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
        self.load_markets(false).await?;
        let mut params = Vec::new();
        if let Some(code) = code {
            if let Some(currency) = self.cache.currency(code).await {
                params.push(("coin".to_string(), currency.id.clone()));
            }
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
        self.load_markets(false).await?;
        let mut params = Vec::new();
        if let Some(code) = code {
            if let Some(currency) = self.cache.currency(code).await {
                params.push(("coin".to_string(), currency.id.clone()));
            }
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
        self.load_markets(false).await?;
        let currency_id = self
            .cache
            .currency(code)
            .await
            .map_or_else(|| code.to_string(), |c| c.id.clone());
        let mut params = vec![
            ("coinId".to_string(), currency_id),
            ("address".to_string(), address.to_string()),
            (
                "quantity".to_string(),
                coinbridge_core::precise::number_to_string(amount),
            ),
        ];
        if let Some(tag) = tag {
            params.push(("addressExt".to_string(), tag.to_string()));
        }
        let network = network
            .map(str::to_string)
            .or_else(|| self.config.default_network.clone())
            .or_else(|| self.config.option_str("defaultNetwork"));
        if let Some(network) = network {
            let chain = self
                .spec
                .networks
                .get(&network)
                .cloned()
                .unwrap_or(network);
            params.push(("chainType".to_string(), chain));
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
        self.load_markets(false).await?;
        let currency_id = self
            .cache
            .currency(code)
            .await
            .map_or_else(|| code.to_string(), |c| c.id.clone());
        let params = vec![
            ("coinId".to_string(), currency_id),
            (
                "quantity".to_string(),
                coinbridge_core::precise::number_to_string(amount),
            ),
            ("fromAccountId".to_string(), from_account.to_string()),
            ("toAccountId".to_string(), to_account.to_string()),
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

    async fn fetch_accounts(&self) -> Result<Vec<Account>> {
        let response = self.request("fetchAccounts", Vec::new()).await?;
        Ok(response
            .as_array()
            .map(|list| list.iter().map(parser::parse_account).collect())
            .unwrap_or_else(|| vec![parser::parse_account(&response)]))
    }

    async fn fetch_deposit_address(
        &self,
        code: &str,
        network: Option<&str>,
    ) -> Result<DepositAddress> {
        self.load_markets(false).await?;
        let currency_id = self
            .cache
            .currency(code)
            .await
            .map_or_else(|| code.to_string(), |c| c.id.clone());
        let network = network
            .map(str::to_string)
            .or_else(|| self.config.default_network.clone())
            .or_else(|| self.config.option_str("defaultNetwork"))
            .ok_or_else(|| {
                Error::arguments_required(
                    "hashkey fetchDepositAddress() requires a network parameter",
                )
            })?;
        let chain = self
            .spec
            .networks
            .get(&network)
            .cloned()
            .unwrap_or_else(|| network.clone());
        let params = vec![
            ("coin".to_string(), currency_id),
            ("chainType".to_string(), chain),
        ];
        let response = self.request("fetchDepositAddress", params).await?;
        parser::parse_deposit_address(&response, Some(code.to_string()), Some(network))
    }
}
