//! HashKey Global venue description.

use std::collections::HashMap;

use coinbridge_core::capability::Capabilities;
use coinbridge_core::describe::{FeeSchedule, RequiredCredentials, VenueSpec};
use coinbridge_core::endpoint::{Endpoint, EndpointRegistry, HttpVerb};
use coinbridge_core::error::{ErrorKind, ExceptionTable};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

/// Builds the immutable HashKey venue record.
pub fn spec() -> VenueSpec {
    VenueSpec {
        id: "hashkey".to_string(),
        name: "HashKey Global".to_string(),
        countries: vec!["BM".to_string()],
        version: "v1".to_string(),
        rate_limit_ms: 100,
        capabilities: capabilities(),
        urls: HashMap::from([
            (
                "public".to_string(),
                "https://api-glb.hashkey.com".to_string(),
            ),
            (
                "private".to_string(),
                "https://api-glb.hashkey.com".to_string(),
            ),
            (
                "sandbox".to_string(),
                "https://api-glb.sim.hashkeydev.com".to_string(),
            ),
            (
                "www".to_string(),
                "https://global.hashkey.com".to_string(),
            ),
            (
                "doc".to_string(),
                "https://hashkeyglobal-apidoc.readme.io".to_string(),
            ),
        ]),
        endpoints: endpoints(),
        timeframes: timeframes(),
        options: HashMap::from([
            ("recvWindow".to_string(), json!(null)),
            ("defaultNetwork".to_string(), json!("ERC20")),
            ("broker".to_string(), json!("10000700011")),
        ]),
        exceptions: exceptions(),
        common_currencies: HashMap::new(),
        networks_by_id: networks_by_id(),
        networks: networks(),
        required_credentials: RequiredCredentials {
            api_key: true,
            secret: true,
            password: false,
        },
        fees: FeeSchedule {
            maker: Decimal::from_str("0.0012").ok(),
            taker: Decimal::from_str("0.0012").ok(),
            percentage: true,
            tier_based: true,
        },
    }
}

fn capabilities() -> Capabilities {
    Capabilities::market_data()
        | Capabilities::trading()
        | Capabilities::FETCH_CURRENCIES
        | Capabilities::CANCEL_ORDERS
        | Capabilities::FETCH_POSITIONS
        | Capabilities::FETCH_FUNDING_RATE
        | Capabilities::FETCH_FUNDING_RATES
        | Capabilities::SET_LEVERAGE
        | Capabilities::FETCH_LEVERAGE_TIERS
        | Capabilities::FETCH_LEDGER
        | Capabilities::FETCH_DEPOSITS
        | Capabilities::FETCH_WITHDRAWALS
        | Capabilities::WITHDRAW
        | Capabilities::TRANSFER
        | Capabilities::FETCH_ACCOUNTS
        | Capabilities::FETCH_DEPOSIT_ADDRESS
}

fn endpoints() -> EndpointRegistry {
    EndpointRegistry::new()
        // public
        .register("fetchTime", Endpoint::public_get("/api/v1/time"))
        .register(
            "fetchMarkets",
            Endpoint::public_get("/api/v1/exchangeInfo").weight(5),
        )
        .register("fetchOrderBook", Endpoint::public_get("/quote/v1/depth"))
        .register("fetchTrades", Endpoint::public_get("/quote/v1/trades"))
        .register("fetchOHLCV", Endpoint::public_get("/quote/v1/klines"))
        .register(
            "fetchTickers",
            Endpoint::public_get("/quote/v1/ticker/24hr"),
        )
        .register(
            "fetchFundingRates",
            Endpoint::public_get("/api/v1/futures/fundingRate"),
        )
        // private: account
        .register(
            "fetchBalance",
            Endpoint::private(HttpVerb::Get, "/api/v1/account"),
        )
        .register(
            "fetchAccounts",
            Endpoint::private(HttpVerb::Get, "/api/v1/account/type").weight(5),
        )
        .register(
            "fetchLedger",
            Endpoint::private(HttpVerb::Get, "/api/v1/account/balanceFlow").weight(5),
        )
        .register(
            "fetchDepositAddress",
            Endpoint::private(HttpVerb::Get, "/api/v1/account/deposit/address"),
        )
        .register(
            "fetchDeposits",
            Endpoint::private(HttpVerb::Get, "/api/v1/account/depositOrders"),
        )
        .register(
            "fetchWithdrawals",
            Endpoint::private(HttpVerb::Get, "/api/v1/account/withdrawOrders"),
        )
        .register(
            "withdraw",
            Endpoint::private(HttpVerb::Post, "/api/v1/account/withdraw"),
        )
        .register(
            "transfer",
            Endpoint::private(HttpVerb::Post, "/api/v1/account/assetTransfer"),
        )
        // private: spot trading
        .register(
            "createSpotOrder",
            Endpoint::private(HttpVerb::Post, "/api/v1.1/spot/order"),
        )
        .register(
            "cancelSpotOrder",
            Endpoint::private(HttpVerb::Delete, "/api/v1/spot/order"),
        )
        .register(
            "cancelSpotOrdersByIds",
            Endpoint::private(HttpVerb::Delete, "/api/v1/spot/cancelOrderByIds").weight(5),
        )
        .register(
            "fetchSpotOrder",
            Endpoint::private(HttpVerb::Get, "/api/v1/spot/order"),
        )
        .register(
            "fetchSpotOpenOrders",
            Endpoint::private(HttpVerb::Get, "/api/v1/spot/openOrders"),
        )
        .register(
            "fetchSpotTradeOrders",
            Endpoint::private(HttpVerb::Get, "/api/v1/spot/tradeOrders").weight(5),
        )
        .register(
            "fetchSpotMyTrades",
            Endpoint::private(HttpVerb::Get, "/api/v1/account/trades").weight(5),
        )
        // private: swap trading
        .register(
            "createSwapOrder",
            Endpoint::private(HttpVerb::Post, "/api/v1/futures/order"),
        )
        .register(
            "cancelSwapOrder",
            Endpoint::private(HttpVerb::Delete, "/api/v1/futures/order"),
        )
        .register(
            "fetchSwapOrder",
            Endpoint::private(HttpVerb::Get, "/api/v1/futures/order"),
        )
        .register(
            "fetchSwapOpenOrders",
            Endpoint::private(HttpVerb::Get, "/api/v1/futures/openOrders"),
        )
        .register(
            "fetchSwapHistoryOrders",
            Endpoint::private(HttpVerb::Get, "/api/v1/futures/historyOrders"),
        )
        .register(
            "fetchSwapMyTrades",
            Endpoint::private(HttpVerb::Get, "/api/v1/futures/userTrades"),
        )
        .register(
            "fetchPositions",
            Endpoint::private(HttpVerb::Get, "/api/v1/futures/positions"),
        )
        .register(
            "setLeverage",
            Endpoint::private(HttpVerb::Post, "/api/v1/futures/leverage"),
        )
}

fn timeframes() -> HashMap<String, String> {
    [
        "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "1w", "1M",
    ]
    .iter()
    .map(|tf| ((*tf).to_string(), (*tf).to_string()))
    .collect()
}

fn exceptions() -> ExceptionTable {
    ExceptionTable::new()
        .exact("0001", ErrorKind::BadRequest)
        .exact("0002", ErrorKind::Authentication)
        .exact("0211", ErrorKind::OrderNotFound)
        .exact("-1002", ErrorKind::Authentication)
        .exact("-1004", ErrorKind::BadRequest)
        .exact("-1133", ErrorKind::InvalidOrder)
        .exact("-1141", ErrorKind::DuplicateOrderId)
        .exact("-1142", ErrorKind::OrderNotFound)
        .exact("-100010", ErrorKind::BadSymbol)
        .exact("-100012", ErrorKind::ArgumentsRequired)
        .broad("Order not found", ErrorKind::OrderNotFound)
        .broad("Duplicate order", ErrorKind::DuplicateOrderId)
        .broad("Unauthorized", ErrorKind::Authentication)
        .broad("insufficient", ErrorKind::InsufficientFunds)
        .broad("Too many requests", ErrorKind::RateLimitExceeded)
}

fn networks_by_id() -> HashMap<String, String> {
    [
        ("Bitcoin", "BTC"),
        ("BTC", "BTC"),
        ("ERC20", "ERC20"),
        ("TRC20", "TRC20"),
        ("BSC(BEP20)", "BSC"),
        ("Solana", "SOL"),
        ("Arbitrum", "ARB"),
        ("Polygon", "MATIC"),
        ("Optimism", "OPTIMISM"),
        ("AVAX C-Chain", "AVAX"),
        ("Polkadot", "DOT"),
        ("Litecoin", "LTC"),
        ("Dogecoin", "DOGE"),
        ("TON", "TON"),
    ]
    .iter()
    .map(|(id, code)| ((*id).to_string(), (*code).to_string()))
    .collect()
}

fn networks() -> HashMap<String, String> {
    [
        ("BTC", "Bitcoin"),
        ("ERC20", "ERC20"),
        ("TRC20", "TRC20"),
        ("BSC", "BSC(BEP20)"),
        ("SOL", "Solana"),
        ("ARB", "Arbitrum"),
        ("MATIC", "Polygon"),
        ("OPTIMISM", "Optimism"),
        ("AVAX", "AVAX C-Chain"),
        ("DOT", "Polkadot"),
        ("LTC", "Litecoin"),
        ("DOGE", "Dogecoin"),
        ("TON", "TON"),
    ]
    .iter()
    .map(|(code, id)| ((*code).to_string(), (*id).to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_identity() {
        let spec = spec();
        assert_eq!(spec.id, "hashkey");
        assert!(spec.capabilities.has("fetchTicker").unwrap());
        assert!(spec.capabilities.has("createOrder").unwrap());
        assert!(!spec.capabilities.has("fetchTradingFees").unwrap());
    }

    #[test]
    fn test_endpoint_table() {
        let spec = spec();
        let endpoint = spec.endpoints.resolve("fetchMarkets").unwrap();
        assert_eq!(endpoint.weight, 5);
        assert!(spec.endpoints.resolve("createSpotOrder").is_ok());
        assert!(spec.endpoints.resolve("bogus").is_err());
    }

    #[test]
    fn test_exception_table() {
        let spec = spec();
        assert_eq!(
            spec.exceptions.classify(Some("-1141"), None),
            Some(ErrorKind::DuplicateOrderId)
        );
        assert_eq!(
            spec.exceptions.classify(Some("99"), Some("Order not found")),
            Some(ErrorKind::OrderNotFound)
        );
    }
}
