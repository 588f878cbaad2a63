//! Binance venue description (spot API).

use std::collections::HashMap;

use coinbridge_core::capability::Capabilities;
use coinbridge_core::describe::{FeeSchedule, RequiredCredentials, VenueSpec};
use coinbridge_core::endpoint::{Endpoint, EndpointRegistry, HttpVerb};
use coinbridge_core::error::{ErrorKind, ExceptionTable};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

/// Builds the immutable Binance venue record.
pub fn spec() -> VenueSpec {
    VenueSpec {
        id: "binance".to_string(),
        name: "Binance".to_string(),
        countries: vec!["JP".to_string(), "MT".to_string()],
        version: "v3".to_string(),
        rate_limit_ms: 50,
        capabilities: capabilities(),
        urls: HashMap::from([
            (
                "public".to_string(),
                "https://api.binance.com".to_string(),
            ),
            (
                "private".to_string(),
                "https://api.binance.com".to_string(),
            ),
            (
                "sandbox".to_string(),
                "https://testnet.binance.vision".to_string(),
            ),
            ("www".to_string(), "https://www.binance.com".to_string()),
            (
                "doc".to_string(),
                "https://developers.binance.com/docs".to_string(),
            ),
        ]),
        endpoints: endpoints(),
        timeframes: timeframes(),
        options: HashMap::from([
            ("recvWindow".to_string(), json!(5000)),
            ("defaultNetwork".to_string(), json!(null)),
        ]),
        exceptions: exceptions(),
        common_currencies: HashMap::from([("YOYO".to_string(), "YOYOW".to_string())]),
        networks_by_id: HashMap::from([
            ("ETH".to_string(), "ERC20".to_string()),
            ("TRX".to_string(), "TRC20".to_string()),
            ("BSC".to_string(), "BSC".to_string()),
            ("BTC".to_string(), "BTC".to_string()),
            ("SOL".to_string(), "SOL".to_string()),
            ("MATIC".to_string(), "MATIC".to_string()),
            ("ARBITRUM".to_string(), "ARB".to_string()),
            ("OPTIMISM".to_string(), "OPTIMISM".to_string()),
        ]),
        networks: HashMap::from([
            ("ERC20".to_string(), "ETH".to_string()),
            ("TRC20".to_string(), "TRX".to_string()),
            ("BSC".to_string(), "BSC".to_string()),
            ("BTC".to_string(), "BTC".to_string()),
            ("SOL".to_string(), "SOL".to_string()),
            ("MATIC".to_string(), "MATIC".to_string()),
            ("ARB".to_string(), "ARBITRUM".to_string()),
            ("OPTIMISM".to_string(), "OPTIMISM".to_string()),
        ]),
        required_credentials: RequiredCredentials {
            api_key: true,
            secret: true,
            password: false,
        },
        fees: FeeSchedule {
            maker: Decimal::from_str("0.001").ok(),
            taker: Decimal::from_str("0.001").ok(),
            percentage: true,
            tier_based: true,
        },
    }
}

fn capabilities() -> Capabilities {
    Capabilities::market_data()
        | Capabilities::trading()
        | Capabilities::FETCH_CURRENCIES
        | Capabilities::FETCH_ORDERS
        | Capabilities::FETCH_DEPOSITS
        | Capabilities::FETCH_WITHDRAWALS
        | Capabilities::WITHDRAW
        | Capabilities::TRANSFER
        | Capabilities::FETCH_DEPOSIT_ADDRESS
        | Capabilities::FETCH_TRADING_FEES
}

fn endpoints() -> EndpointRegistry {
    EndpointRegistry::new()
        // public
        .register("fetchTime", Endpoint::public_get("/api/v3/time"))
        .register(
            "fetchMarkets",
            Endpoint::public_get("/api/v3/exchangeInfo").weight(20),
        )
        .register(
            "fetchOrderBook",
            Endpoint::public_get("/api/v3/depth").weight(5),
        )
        .register(
            "fetchTrades",
            Endpoint::public_get("/api/v3/trades").weight(10),
        )
        .register(
            "fetchOHLCV",
            Endpoint::public_get("/api/v3/klines").weight(2),
        )
        .register(
            "fetchTickers",
            Endpoint::public_get("/api/v3/ticker/24hr").weight(40),
        )
        // private
        .register(
            "fetchBalance",
            Endpoint::private(HttpVerb::Get, "/api/v3/account").weight(20),
        )
        .register(
            "createOrder",
            Endpoint::private(HttpVerb::Post, "/api/v3/order"),
        )
        .register(
            "cancelOrder",
            Endpoint::private(HttpVerb::Delete, "/api/v3/order"),
        )
        .register(
            "fetchOrder",
            Endpoint::private(HttpVerb::Get, "/api/v3/order").weight(4),
        )
        .register(
            "fetchOpenOrders",
            Endpoint::private(HttpVerb::Get, "/api/v3/openOrders").weight(6),
        )
        .register(
            "fetchOrders",
            Endpoint::private(HttpVerb::Get, "/api/v3/allOrders").weight(20),
        )
        .register(
            "fetchMyTrades",
            Endpoint::private(HttpVerb::Get, "/api/v3/myTrades").weight(20),
        )
        .register(
            "fetchCurrencies",
            Endpoint::private(HttpVerb::Get, "/sapi/v1/capital/config/getall").weight(10),
        )
        .register(
            "fetchDeposits",
            Endpoint::private(HttpVerb::Get, "/sapi/v1/capital/deposit/hisrec"),
        )
        .register(
            "fetchWithdrawals",
            Endpoint::private(HttpVerb::Get, "/sapi/v1/capital/withdraw/history").weight(18),
        )
        .register(
            "withdraw",
            Endpoint::private(HttpVerb::Post, "/sapi/v1/capital/withdraw/apply").weight(600),
        )
        .register(
            "transfer",
            Endpoint::private(HttpVerb::Post, "/sapi/v1/asset/transfer"),
        )
        .register(
            "fetchDepositAddress",
            Endpoint::private(HttpVerb::Get, "/sapi/v1/capital/deposit/address").weight(10),
        )
        .register(
            "fetchTradingFees",
            Endpoint::private(HttpVerb::Get, "/sapi/v1/asset/tradeFee"),
        )
}

fn timeframes() -> HashMap<String, String> {
    [
        "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w",
        "1M",
    ]
    .iter()
    .map(|tf| ((*tf).to_string(), (*tf).to_string()))
    .collect()
}

fn exceptions() -> ExceptionTable {
    ExceptionTable::new()
        .exact("-1000", ErrorKind::ExchangeNotAvailable)
        .exact("-1001", ErrorKind::ExchangeNotAvailable)
        .exact("-1002", ErrorKind::Authentication)
        .exact("-1003", ErrorKind::RateLimitExceeded)
        .exact("-1013", ErrorKind::InvalidOrder)
        .exact("-1015", ErrorKind::RateLimitExceeded)
        .exact("-1021", ErrorKind::InvalidNonce)
        .exact("-1022", ErrorKind::Authentication)
        .exact("-1100", ErrorKind::BadRequest)
        .exact("-1101", ErrorKind::BadRequest)
        .exact("-1102", ErrorKind::BadRequest)
        .exact("-1121", ErrorKind::BadSymbol)
        .exact("-1131", ErrorKind::BadRequest)
        .exact("-2010", ErrorKind::InvalidOrder)
        .exact("-2011", ErrorKind::OrderNotFound)
        .exact("-2013", ErrorKind::OrderNotFound)
        .exact("-2014", ErrorKind::Authentication)
        .exact("-2015", ErrorKind::Authentication)
        .exact("-3008", ErrorKind::InsufficientFunds)
        .broad("Account has insufficient balance", ErrorKind::InsufficientFunds)
        .broad("Order does not exist", ErrorKind::OrderNotFound)
        .broad("Order would trigger immediately", ErrorKind::OperationRejected)
        .broad("Too many requests", ErrorKind::RateLimitExceeded)
        .broad(
            "This action is disabled on this account",
            ErrorKind::AccountSuspended,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_identity() {
        let spec = spec();
        assert_eq!(spec.id, "binance");
        assert!(spec.capabilities.has("createOrder").unwrap());
        assert!(!spec.capabilities.has("fetchPositions").unwrap());
    }

    #[test]
    fn test_exceptions_exact_then_broad() {
        let spec = spec();
        assert_eq!(
            spec.exceptions.classify(Some("-1021"), None),
            Some(ErrorKind::InvalidNonce)
        );
        assert_eq!(
            spec.exceptions
                .classify(Some("-9999"), Some("Order does not exist.")),
            Some(ErrorKind::OrderNotFound)
        );
        assert_eq!(spec.exceptions.classify(Some("-9999"), Some("???")), None);
    }

    #[test]
    fn test_currency_alias_table() {
        let spec = spec();
        assert_eq!(spec.common_currencies.get("YOYO").unwrap(), "YOYOW");
    }
}
