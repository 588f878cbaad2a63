//! Parsers for Binance spot REST payloads.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use coinbridge_core::describe::VenueSpec;
use coinbridge_core::error::{Error, ParseError, Result};
use coinbridge_core::extract::{
    safe_bool, safe_decimal, safe_integer, safe_integer_n, safe_list, safe_string, safe_string_2,
    value_to_hashmap,
};
use coinbridge_core::normalize::{
    safe_balance, safe_currency_code, safe_deposit_address, safe_market, safe_order, safe_ticker,
    safe_trade, safe_transaction,
};
use coinbridge_core::types::{
    Balance, BalanceEntry, Currency, CurrencyNetwork, DepositAddress, Fee, Market, MarketLimits,
    MarketPrecision, MarketType, MinMax, Ohlcv, Order, OrderBook, OrderBookEntry, OrderSide,
    OrderStatus, OrderType, TakerOrMaker, Ticker, TimeInForce, Trade, TradingFee, Transaction,
    TransactionType, TransferEntry,
};

/// Context the parsers resolve market ids against.
pub(crate) struct ParseContext<'a> {
    pub spec: &'a VenueSpec,
    pub markets_by_id: &'a HashMap<String, Arc<Market>>,
}

impl ParseContext<'_> {
    fn market(&self, market_id: Option<&str>, market: Option<&Market>) -> Market {
        safe_market(market_id, market, self.markets_by_id, None)
    }

    fn currency_code(&self, currency_id: Option<&str>) -> Option<String> {
        safe_currency_code(currency_id, &self.spec.common_currencies)
    }
}

fn symbol_of(market: &Market) -> Option<String> {
    if market.symbol.is_empty() {
        None
    } else {
        Some(market.symbol.clone())
    }
}

/// Parses one `exchangeInfo` symbol entry.
pub(crate) fn parse_market(data: &Value, spec: &VenueSpec) -> Result<Market> {
    let market_id = safe_string(data, "symbol")
        .ok_or_else(|| Error::from(ParseError::missing_field("symbol")))?;
    let base_id = safe_string(data, "baseAsset");
    let quote_id = safe_string(data, "quoteAsset");
    let base =
        safe_currency_code(base_id.as_deref(), &spec.common_currencies).unwrap_or_default();
    let quote =
        safe_currency_code(quote_id.as_deref(), &spec.common_currencies).unwrap_or_default();

    let filters: HashMap<String, &Value> = safe_list(data, "filters")
        .unwrap_or_default()
        .iter()
        .filter_map(|f| safe_string(f, "filterType").map(|t| (t, f)))
        .collect();
    let price_filter = filters.get("PRICE_FILTER");
    let amount_filter = filters.get("LOT_SIZE");
    let notional_filter = filters.get("NOTIONAL").or_else(|| filters.get("MIN_NOTIONAL"));

    Ok(Market {
        id: market_id,
        symbol: format!("{base}/{quote}"),
        base,
        quote,
        base_id,
        quote_id,
        market_type: MarketType::Spot,
        active: safe_string(data, "status").as_deref() == Some("TRADING"),
        margin: safe_bool(data, "isMarginTradingAllowed").unwrap_or(false),
        maker: spec.fees.maker,
        taker: spec.fees.taker,
        percentage: Some(spec.fees.percentage),
        tier_based: Some(spec.fees.tier_based),
        precision: MarketPrecision {
            amount: amount_filter.and_then(|f| safe_decimal(f, "stepSize")),
            price: price_filter.and_then(|f| safe_decimal(f, "tickSize")),
            base: safe_integer(data, "baseAssetPrecision").and_then(|p| u32::try_from(p).ok()),
            quote: safe_integer(data, "quotePrecision").and_then(|p| u32::try_from(p).ok()),
        },
        limits: MarketLimits {
            amount: Some(MinMax {
                min: amount_filter.and_then(|f| safe_decimal(f, "minQty")),
                max: amount_filter.and_then(|f| safe_decimal(f, "maxQty")),
            }),
            price: Some(MinMax {
                min: price_filter.and_then(|f| safe_decimal(f, "minPrice")),
                max: price_filter.and_then(|f| safe_decimal(f, "maxPrice")),
            }),
            cost: Some(MinMax {
                min: notional_filter.and_then(|f| safe_decimal(f, "minNotional")),
                max: notional_filter.and_then(|f| safe_decimal(f, "maxNotional")),
            }),
            leverage: None,
        },
        info: value_to_hashmap(data),
        ..Market::default()
    })
}

/// Parses one `capital/config/getall` entry.
pub(crate) fn parse_currency(data: &Value, spec: &VenueSpec) -> Result<Currency> {
    let currency_id = safe_string(data, "coin")
        .ok_or_else(|| Error::from(ParseError::missing_field("coin")))?;
    let code = safe_currency_code(Some(&currency_id), &spec.common_currencies)
        .unwrap_or_else(|| currency_id.clone());

    let deposit = safe_bool(data, "depositAllEnable");
    let withdraw = safe_bool(data, "withdrawAllEnable");

    let mut networks = HashMap::new();
    for entry in safe_list(data, "networkList").unwrap_or_default() {
        let Some(network_id) = safe_string(entry, "network") else {
            continue;
        };
        let network_code = spec
            .networks_by_id
            .get(&network_id)
            .cloned()
            .unwrap_or_else(|| network_id.clone());
        let net_deposit = safe_bool(entry, "depositEnable");
        let net_withdraw = safe_bool(entry, "withdrawEnable");
        networks.insert(
            network_code.clone(),
            CurrencyNetwork {
                network: network_code,
                id: network_id,
                active: match (net_deposit, net_withdraw) {
                    (Some(d), Some(w)) => Some(d && w),
                    _ => None,
                },
                deposit: net_deposit,
                withdraw: net_withdraw,
                fee: safe_decimal(entry, "withdrawFee"),
                precision: None,
                limits: Some(MinMax {
                    min: safe_decimal(entry, "withdrawMin"),
                    max: safe_decimal(entry, "withdrawMax"),
                }),
                info: value_to_hashmap(entry),
            },
        );
    }

    Ok(Currency {
        code,
        id: currency_id,
        name: safe_string(data, "name"),
        active: match (deposit, withdraw) {
            (Some(d), Some(w)) => Some(d && w),
            _ => None,
        },
        deposit,
        withdraw,
        fee: None,
        precision: None,
        limits: None,
        networks,
        info: value_to_hashmap(data),
    })
}

/// Parses a 24hr ticker entry.
pub(crate) fn parse_ticker(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> Ticker {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), market);
    let last = safe_decimal(data, "lastPrice");

    safe_ticker(
        Ticker {
            symbol: symbol_of(&market),
            timestamp: safe_integer(data, "closeTime"),
            high: safe_decimal(data, "highPrice"),
            low: safe_decimal(data, "lowPrice"),
            bid: safe_decimal(data, "bidPrice"),
            bid_volume: safe_decimal(data, "bidQty"),
            ask: safe_decimal(data, "askPrice"),
            ask_volume: safe_decimal(data, "askQty"),
            vwap: safe_decimal(data, "weightedAvgPrice"),
            open: safe_decimal(data, "openPrice"),
            close: last,
            last,
            previous_close: safe_decimal(data, "prevClosePrice"),
            change: safe_decimal(data, "priceChange"),
            percentage: safe_decimal(data, "priceChangePercent"),
            base_volume: safe_decimal(data, "volume"),
            quote_volume: safe_decimal(data, "quoteVolume"),
            info: value_to_hashmap(data),
            ..Ticker::default()
        },
        Some(&market),
    )
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    use rust_decimal::prelude::FromPrimitive;
    use std::str::FromStr;
    match value {
        Value::String(s) if !s.is_empty() => Decimal::from_str(s).ok(),
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        _ => None,
    }
}

/// Parses a depth snapshot (`{"lastUpdateId": ..., "bids": [...], "asks": [...]}`).
pub(crate) fn parse_order_book(data: &Value, symbol: String, timestamp: i64) -> OrderBook {
    let parse_side = |key: &str| -> Vec<OrderBookEntry> {
        safe_list(data, key)
            .unwrap_or_default()
            .iter()
            .filter_map(|level| {
                let level = level.as_array()?;
                let price = level.first().and_then(decimal_from_value)?;
                let amount = level.get(1).and_then(decimal_from_value)?;
                Some(OrderBookEntry { price, amount })
            })
            .collect()
    };

    OrderBook {
        symbol: Some(symbol),
        timestamp: Some(timestamp),
        datetime: coinbridge_core::time::iso8601(timestamp),
        nonce: safe_integer(data, "lastUpdateId"),
        bids: parse_side("bids"),
        asks: parse_side("asks"),
        info: value_to_hashmap(data),
    }
}

/// Parses one kline row (array form).
pub(crate) fn parse_ohlcv(data: &Value) -> Option<Ohlcv> {
    let row = data.as_array()?;
    Some(Ohlcv {
        timestamp: row.first()?.as_i64()?,
        open: row.get(1).and_then(decimal_from_value),
        high: row.get(2).and_then(decimal_from_value),
        low: row.get(3).and_then(decimal_from_value),
        close: row.get(4).and_then(decimal_from_value),
        volume: row.get(5).and_then(decimal_from_value),
    })
}

/// Maps the venue status vocabulary onto the canonical one.
///
/// Unmapped statuses pass through verbatim.
pub(crate) fn parse_order_status(raw: &str) -> OrderStatus {
    match raw {
        "NEW" | "PARTIALLY_FILLED" | "PENDING_NEW" => OrderStatus::Open,
        "FILLED" => OrderStatus::Closed,
        "CANCELED" | "PENDING_CANCEL" => OrderStatus::Canceled,
        "REJECTED" => OrderStatus::Rejected,
        "EXPIRED" | "EXPIRED_IN_MATCH" => OrderStatus::Expired,
        _ => OrderStatus::Other(raw.to_string()),
    }
}

/// Maps the venue order-type vocabulary onto the canonical one.
pub(crate) fn parse_order_type(raw: &str) -> OrderType {
    match raw {
        "MARKET" | "STOP_LOSS" | "TAKE_PROFIT" => OrderType::Market,
        "LIMIT" | "LIMIT_MAKER" | "STOP_LOSS_LIMIT" | "TAKE_PROFIT_LIMIT" => OrderType::Limit,
        _ => OrderType::Other(raw.to_string()),
    }
}

/// Parses an order payload.
pub(crate) fn parse_order(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> Order {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), market);

    let raw_type = safe_string(data, "type");
    let side = match safe_string(data, "side").as_deref() {
        Some("BUY") => Some(OrderSide::Buy),
        Some("SELL") => Some(OrderSide::Sell),
        _ => None,
    };
    let time_in_force = match safe_string(data, "timeInForce").as_deref() {
        Some("GTC") => Some(TimeInForce::Gtc),
        Some("IOC") => Some(TimeInForce::Ioc),
        Some("FOK") => Some(TimeInForce::Fok),
        Some("GTX") => Some(TimeInForce::Po),
        _ => None,
    };

    safe_order(
        Order {
            id: safe_string(data, "orderId"),
            client_order_id: safe_string_2(data, "clientOrderId", "origClientOrderId"),
            timestamp: safe_integer_n(data, &["time", "transactTime", "workingTime"]),
            last_update_timestamp: safe_integer(data, "updateTime"),
            status: safe_string(data, "status").map(|s| parse_order_status(&s)),
            symbol: symbol_of(&market),
            order_type: raw_type.as_deref().map(parse_order_type),
            time_in_force,
            side,
            price: safe_decimal(data, "price"),
            amount: safe_decimal(data, "origQty"),
            filled: safe_decimal(data, "executedQty"),
            cost: safe_decimal(data, "cummulativeQuoteQty"),
            trigger_price: safe_decimal(data, "stopPrice"),
            post_only: Some(raw_type.as_deref() == Some("LIMIT_MAKER")),
            info: value_to_hashmap(data),
            ..Order::default()
        },
        Some(&market),
    )
}

/// Parses a public or private trade payload.
pub(crate) fn parse_trade(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> Trade {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), market);

    // Public trades report the maker side; private trades report the
    // account's own side.
    let side = match (safe_bool(data, "isBuyer"), safe_bool(data, "isBuyerMaker")) {
        (Some(is_buyer), _) => Some(if is_buyer {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }),
        (None, Some(buyer_is_maker)) => Some(if buyer_is_maker {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }),
        _ => None,
    };

    let taker_or_maker = safe_bool(data, "isMaker").map(|maker| {
        if maker {
            TakerOrMaker::Maker
        } else {
            TakerOrMaker::Taker
        }
    });

    let fee = safe_decimal(data, "commission").map(|cost| Fee {
        currency: ctx.currency_code(safe_string(data, "commissionAsset").as_deref()),
        cost: Some(cost),
        rate: None,
    });

    safe_trade(
        Trade {
            id: safe_string(data, "id"),
            order: safe_string(data, "orderId"),
            timestamp: safe_integer(data, "time"),
            symbol: symbol_of(&market),
            side,
            taker_or_maker,
            price: safe_decimal(data, "price"),
            amount: safe_decimal(data, "qty"),
            cost: safe_decimal(data, "quoteQty"),
            fee,
            info: value_to_hashmap(data),
            ..Trade::default()
        },
        Some(&market),
    )
}

/// Parses the spot account balance envelope.
pub(crate) fn parse_balance(data: &Value, ctx: &ParseContext<'_>) -> Balance {
    let mut balance = Balance {
        timestamp: safe_integer(data, "updateTime"),
        info: value_to_hashmap(data),
        ..Balance::default()
    };
    for entry in safe_list(data, "balances").unwrap_or_default() {
        let Some(code) = ctx.currency_code(safe_string(entry, "asset").as_deref()) else {
            continue;
        };
        balance.currencies.insert(
            code,
            BalanceEntry {
                free: safe_decimal(entry, "free"),
                used: safe_decimal(entry, "locked"),
                total: None,
            },
        );
    }
    safe_balance(balance)
}

fn parse_deposit_status(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let mapped = match raw.as_str() {
        "0" | "6" => "pending",
        "1" => "ok",
        other => other,
    };
    Some(mapped.to_string())
}

fn parse_withdrawal_status(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let mapped = match raw.as_str() {
        "0" | "2" | "4" => "pending",
        "1" => "canceled",
        "3" | "5" => "failed",
        "6" => "ok",
        other => other,
    };
    Some(mapped.to_string())
}

/// Parses one deposit/withdrawal record.
pub(crate) fn parse_transaction(
    data: &Value,
    transaction_type: TransactionType,
    ctx: &ParseContext<'_>,
) -> Transaction {
    let status = match transaction_type {
        TransactionType::Deposit => parse_deposit_status(safe_string(data, "status")),
        TransactionType::Withdrawal => parse_withdrawal_status(safe_string(data, "status")),
    };
    let network_id = safe_string(data, "network");
    let network = network_id
        .as_ref()
        .and_then(|id| ctx.spec.networks_by_id.get(id).cloned())
        .or(network_id);

    let fee = safe_decimal(data, "transactionFee").map(|cost| Fee {
        currency: ctx.currency_code(safe_string(data, "coin").as_deref()),
        cost: Some(cost),
        rate: None,
    });

    safe_transaction(Transaction {
        id: safe_string_2(data, "id", "withdrawOrderId"),
        txid: safe_string(data, "txId"),
        timestamp: safe_integer_n(data, &["insertTime", "applyTime"]),
        transaction_type: Some(transaction_type),
        currency: ctx.currency_code(safe_string(data, "coin").as_deref()),
        amount: safe_decimal(data, "amount"),
        network,
        address: safe_string(data, "address"),
        tag: safe_string(data, "addressTag").filter(|t| !t.is_empty()),
        status,
        fee,
        info: value_to_hashmap(data),
        ..Transaction::default()
    })
}

/// Parses a deposit-address response, failing when no address came back.
pub(crate) fn parse_deposit_address(
    data: &Value,
    code: Option<String>,
    network: Option<String>,
) -> Result<DepositAddress> {
    safe_deposit_address(
        code,
        network,
        safe_string(data, "address"),
        safe_string(data, "tag"),
        value_to_hashmap(data),
    )
}

/// Parses one `asset/tradeFee` entry.
pub(crate) fn parse_trading_fee(data: &Value, ctx: &ParseContext<'_>) -> TradingFee {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), None);
    TradingFee {
        symbol: symbol_of(&market),
        maker: safe_decimal(data, "makerCommission"),
        taker: safe_decimal(data, "takerCommission"),
        percentage: Some(true),
        tier_based: Some(true),
        info: value_to_hashmap(data),
    }
}

/// Parses an asset-transfer response (`{"tranId": 13526853623}`).
pub(crate) fn parse_transfer(
    data: &Value,
    code: Option<String>,
    amount: Option<Decimal>,
    from_account: Option<String>,
    to_account: Option<String>,
) -> TransferEntry {
    TransferEntry {
        id: safe_string(data, "tranId"),
        currency: code,
        amount,
        from_account,
        to_account,
        status: Some("ok".to_string()),
        info: value_to_hashmap(data),
        ..TransferEntry::default()
    }
}
