//! End-to-end HashKey adapter tests against a mock HTTP server.
//!
//! These drive the full pipeline (endpoint resolution, signing,
//! dispatch, error classification, parsing) with recorded venue
//! payloads.

use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coinbridge_core::config::ExchangeConfig;
use coinbridge_core::error::Error;
use coinbridge_core::exchange::Exchange;
use coinbridge_core::types::{OrderRequest, OrderSide, OrderStatus};
use coinbridge_exchanges::HashKey;

fn config_for(server: &MockServer, with_credentials: bool) -> ExchangeConfig {
    let mut builder = ExchangeConfig::builder()
        .url_override("public", server.uri())
        .url_override("private", server.uri());
    if with_credentials {
        builder = builder.api_key("test-key").secret("test-secret");
    }
    builder.build()
}

fn exchange_info() -> serde_json::Value {
    json!({
        "timezone": "UTC",
        "serverTime": "1721661653952",
        "symbols": [
            {
                "symbol": "ETHUSDT",
                "status": "TRADING",
                "baseAsset": "ETH",
                "quoteAsset": "USDT",
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "0.01", "tickSize": "0.01"},
                    {"filterType": "LOT_SIZE", "minQty": "0.0001", "maxQty": "100", "stepSize": "0.0001"}
                ]
            }
        ],
        "contracts": [
            {
                "symbol": "BTCUSDT-PERPETUAL",
                "status": "TRADING",
                "baseAsset": "BTCUSDT-PERPETUAL",
                "quoteAsset": "USDT",
                "inverse": false,
                "marginToken": "USDT",
                "contractMultiplier": "0.001",
                "underlying": "BTC",
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "0.1", "tickSize": "0.1"},
                    {"filterType": "LOT_SIZE", "minQty": "0.001", "maxQty": "10", "stepSize": "0.001"}
                ],
                "riskLimits": [
                    {"riskLimitId": "200000722", "quantity": "1000.00", "initialMargin": "0.10", "maintMargin": "0.005"}
                ]
            }
        ],
        "coins": [
            {
                "coinId": "USDT",
                "coinFullName": "TetherUS",
                "allowWithdraw": true,
                "allowDeposit": true,
                "chainTypes": [
                    {"chainType": "ERC20", "withdrawFee": "5", "minWithdrawQuantity": "10",
                     "allowDeposit": true, "allowWithdraw": true}
                ]
            }
        ]
    })
}

async fn mount_exchange_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/exchangeInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(exchange_info()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"serverTime": 1721661553214i64})))
        .mount(&server)
        .await;

    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    assert_eq!(exchange.fetch_time().await.unwrap(), 1721661553214);
}

#[tokio::test]
async fn test_load_markets_and_symbol_resolution() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;

    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    let markets = exchange.load_markets(false).await.unwrap();
    assert_eq!(markets.len(), 2);
    assert!(markets.contains_key("BTC/USDT:USDT"));
    assert!(markets.contains_key("ETH/USDT"));

    let swap = &markets["BTC/USDT:USDT"];
    assert_eq!(swap.id, "BTCUSDT-PERPETUAL");
    assert!(swap.contract);
}

#[tokio::test]
async fn test_fetch_ticker_concrete_payload() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;
    Mock::given(method("GET"))
        .and(path("/quote/v1/ticker/24hr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "t": 1721685896846i64,
                "s": "BTCUSDT-PERPETUAL",
                "c": "67756.7",
                "h": "68479.9",
                "l": "66594.3",
                "o": "68279.7",
                "b": "67756.6",
                "a": "67756.7",
                "v": "1604722",
                "qv": "108827258.7761"
            }
        ])))
        .mount(&server)
        .await;

    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    let ticker = exchange.fetch_ticker("BTC/USDT:USDT").await.unwrap();

    assert_eq!(ticker.symbol.as_deref(), Some("BTC/USDT:USDT"));
    assert_eq!(ticker.timestamp, Some(1721685896846));
    assert_eq!(ticker.last.unwrap().to_string(), "67756.7");
    assert_eq!(ticker.close.unwrap().to_string(), "67756.7");
    assert_eq!(ticker.high.unwrap().to_string(), "68479.9");
    assert_eq!(ticker.low.unwrap().to_string(), "66594.3");
}

#[tokio::test]
async fn test_create_order_signed_request() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1.1/spot/order"))
        .and(header("X-HK-APIKEY", "test-key"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("symbol=ETHUSDT"))
        .and(body_string_contains("side=BUY"))
        .and(body_string_contains("type=LIMIT"))
        .and(body_string_contains("timestamp="))
        .and(body_string_contains("signature="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orderId": "1739352552762301440",
            "clientOrderId": "cb-77",
            "symbol": "ETHUSDT",
            "status": "NEW",
            "side": "BUY",
            "type": "LIMIT",
            "price": "3200.00",
            "origQty": "0.5",
            "executedQty": "0",
            "timeInForce": "GTC",
            "transactTime": 1722082982097i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let exchange = HashKey::new(config_for(&server, true)).unwrap();
    let request = OrderRequest::limit("ETH/USDT", OrderSide::Buy, dec!(0.5), dec!(3200))
        .client_order_id("cb-77");
    let order = exchange.create_order(&request).await.unwrap();

    assert_eq!(order.id.as_deref(), Some("1739352552762301440"));
    assert_eq!(order.status, Some(OrderStatus::Open));
    assert_eq!(order.remaining, Some(dec!(0.5)));
}

#[tokio::test]
async fn test_create_order_without_credentials_fails_before_network() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;

    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    let request = OrderRequest::limit("ETH/USDT", OrderSide::Buy, dec!(0.5), dec!(3200));
    assert!(matches!(
        exchange.create_order(&request).await,
        Err(Error::Authentication(_))
    ));
    // only the market load hit the wire
    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|r| r.url.path() != "/api/v1.1/spot/order"));
}

#[tokio::test]
async fn test_type_param_guard_rejects_before_network() {
    let server = MockServer::start().await;

    let exchange = HashKey::new(config_for(&server, true)).unwrap();
    let request = OrderRequest::limit("ETH/USDT", OrderSide::Buy, dec!(0.5), dec!(3200))
        .param("type", json!("STOP"));
    assert!(matches!(
        exchange.create_order(&request).await,
        Err(Error::BadRequest(_))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_embedded_error_code_classified() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/v1.1/spot/order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "-1141",
            "msg": "Duplicate order"
        })))
        .mount(&server)
        .await;

    let exchange = HashKey::new(config_for(&server, true)).unwrap();
    let request = OrderRequest::limit("ETH/USDT", OrderSide::Buy, dec!(0.5), dec!(3200));
    let err = exchange.create_order(&request).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateOrderId(_)));
    // the raw body is attached for diagnosability
    assert!(err.to_string().contains("Duplicate order"));
}

#[tokio::test]
async fn test_batch_cancel_partial_failure_visibility() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/spot/cancelOrderByIds"))
        .and(header_exists("X-HK-APIKEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "0000",
            "result": [
                {"orderId": "1001", "code": "0000"},
                {"orderId": "1002", "code": "0211"}
            ]
        })))
        .mount(&server)
        .await;

    let exchange = HashKey::new(config_for(&server, true)).unwrap();
    let outcomes = exchange
        .cancel_orders(&["1001", "1002"], Some("ETH/USDT"))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    let ok = outcomes[0].as_ref().unwrap();
    assert_eq!(ok.id.as_deref(), Some("1001"));
    assert_eq!(ok.status, Some(OrderStatus::Canceled));
    assert!(matches!(
        outcomes[1].as_ref().unwrap_err(),
        Error::OrderNotFound(_)
    ));
}

#[tokio::test]
async fn test_fetch_my_trades_requires_symbol_for_swap() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;

    let mut config = config_for(&server, true);
    config.options.insert("type".to_string(), json!("swap"));
    let exchange = HashKey::new(config).unwrap();

    // derivative trade history is per-contract on this venue; the
    // missing symbol is a caller error caught before any request signs
    assert!(matches!(
        exchange.fetch_my_trades(None, None, None).await,
        Err(Error::ArgumentsRequired(_))
    ));
    let received = server.received_requests().await.unwrap();
    assert!(
        received
            .iter()
            .all(|r| r.url.path() != "/api/v1/futures/userTrades")
    );
}

#[tokio::test]
async fn test_fetch_balance_parses_entries() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/account"))
        .and(header("X-HK-APIKEY", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balances": [
                {"asset": "USDT", "assetId": "USDT", "total": "40", "free": "30", "locked": "10"}
            ],
            "userId": "1732885739572845312"
        })))
        .mount(&server)
        .await;

    let exchange = HashKey::new(config_for(&server, true)).unwrap();
    let balance = exchange.fetch_balance().await.unwrap();
    let usdt = balance.get("USDT").unwrap();
    assert_eq!(usdt.free, Some(dec!(30)));
    assert_eq!(usdt.used, Some(dec!(10)));
    assert_eq!(usdt.total, Some(dec!(40)));
}

#[tokio::test]
async fn test_leverage_tiers_from_risk_limits() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;

    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    let tiers = exchange.fetch_leverage_tiers(None).await.unwrap();
    let btc_tiers = tiers.get("BTC/USDT:USDT").unwrap();
    assert_eq!(btc_tiers.len(), 1);
    assert_eq!(btc_tiers[0].max_notional, Some(dec!(1000.00)));
    assert_eq!(btc_tiers[0].max_leverage, Some(dec!(10)));
}

#[tokio::test]
async fn test_unknown_symbol_fails_resolution() {
    let server = MockServer::start().await;
    mount_exchange_info(&server).await;

    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    assert!(matches!(
        exchange.fetch_ticker("DOGE/USDT").await,
        Err(Error::BadSymbol(_))
    ));
}

#[tokio::test]
async fn test_capability_declaration() {
    let server = MockServer::start().await;
    let exchange = HashKey::new(config_for(&server, false)).unwrap();
    assert_eq!(exchange.has("fetchTicker"), Some(true));
    assert_eq!(exchange.has("cancelOrders"), Some(true));
    assert_eq!(exchange.has("fetchTradingFees"), Some(false));
    assert_eq!(exchange.has("notAMethod"), None);
}
