//! Parsers for HashKey Global REST payloads.

use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use coinbridge_core::describe::VenueSpec;
use coinbridge_core::error::{Error, ParseError, Result};
use coinbridge_core::extract::{
    safe_bool, safe_decimal, safe_decimal_2, safe_decimal_n, safe_integer, safe_integer_2,
    safe_list, safe_string, safe_string_2, safe_string_lower, safe_string_n, value_to_hashmap,
};
use coinbridge_core::normalize::{
    safe_currency_code, safe_deposit_address, safe_ledger_entry, safe_market, safe_order,
    safe_position, safe_ticker, safe_trade, safe_transaction,
};
use coinbridge_core::types::{
    Account, Balance, BalanceEntry, Currency, CurrencyNetwork, DepositAddress, Fee, FundingRate,
    LeverageTier, LedgerEntry, Market, MarketLimits, MarketPrecision, MarketType, MinMax, Ohlcv,
    Order, OrderBook, OrderBookEntry, OrderSide, OrderStatus, OrderType, Position, PositionSide,
    TakerOrMaker, Ticker, TimeInForce, Trade, Transaction, TransactionType, TransferEntry,
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
///
///     {
///         "symbol": "BTCUSDT-PERPETUAL",
///         "status": "TRADING",
///         "baseAsset": "BTCUSDT-PERPETUAL",
///         "quoteAsset": "USDT",
///         "inverse": false,
///         "marginToken": "USDT",
///         "contractMultiplier": "0.001",
///         "underlying": "BTC",
///         "filters": [ { "tickSize": "0.1", "filterType": "PRICE_FILTER" }, ... ]
///     }
pub(crate) fn parse_market(data: &Value, spec: &VenueSpec) -> Result<Market> {
    let market_id = safe_string(data, "symbol")
        .ok_or_else(|| Error::from(ParseError::missing_field("symbol")))?;

    let quote_id = safe_string(data, "quoteAsset");
    let quote = safe_currency_code(quote_id.as_deref(), &spec.common_currencies)
        .unwrap_or_default();

    let is_swap = market_id
        .split('-')
        .nth(1)
        .is_some_and(|part| part == "PERPETUAL");

    let (base_id, settle_id) = if is_swap {
        (safe_string(data, "underlying"), safe_string(data, "marginToken"))
    } else {
        (safe_string(data, "baseAsset"), None)
    };
    let base = safe_currency_code(base_id.as_deref(), &spec.common_currencies)
        .unwrap_or_default();
    let settle = safe_currency_code(settle_id.as_deref(), &spec.common_currencies);

    let symbol = match &settle {
        Some(settle) => format!("{base}/{quote}:{settle}"),
        None => format!("{base}/{quote}"),
    };

    let inverse = safe_bool(data, "inverse");
    let linear = inverse.map(|inv| !inv);

    // Filters arrive as a list; index them by filterType.
    let filters: HashMap<String, &Value> = safe_list(data, "filters")
        .unwrap_or_default()
        .iter()
        .filter_map(|f| safe_string(f, "filterType").map(|t| (t, f)))
        .collect();
    let price_filter = filters.get("PRICE_FILTER");
    let amount_filter = filters.get("LOT_SIZE");
    let cost_filter = filters.get("MIN_NOTIONAL");

    let contract_size = safe_decimal(data, "contractMultiplier");
    let mut amount_step = amount_filter.and_then(|f| safe_decimal(f, "stepSize"));
    let mut amount_min = amount_filter.and_then(|f| safe_decimal(f, "minQty"));
    let mut amount_max = amount_filter.and_then(|f| safe_decimal(f, "maxQty"));
    if is_swap {
        // Swap amounts are denominated in contracts.
        if let Some(size) = contract_size.filter(|s| !s.is_zero()) {
            amount_step = amount_step.and_then(|v| v.checked_div(size));
            amount_min = amount_min.and_then(|v| v.checked_div(size));
            amount_max = amount_max.and_then(|v| v.checked_div(size));
        }
    }

    Ok(Market {
        id: market_id,
        symbol,
        base,
        quote,
        settle,
        base_id,
        quote_id,
        settle_id,
        market_type: if is_swap {
            MarketType::Swap
        } else {
            MarketType::Spot
        },
        active: safe_string(data, "status").as_deref() == Some("TRADING"),
        margin: safe_bool(data, "allowMargin").unwrap_or(false),
        contract: is_swap,
        linear,
        inverse,
        contract_size,
        expiry: None,
        expiry_datetime: None,
        strike: None,
        option_type: None,
        maker: spec.fees.maker,
        taker: spec.fees.taker,
        percentage: Some(spec.fees.percentage),
        tier_based: Some(spec.fees.tier_based),
        fee_side: None,
        precision: MarketPrecision {
            amount: amount_step,
            price: price_filter.and_then(|f| safe_decimal(f, "tickSize")),
            base: None,
            quote: None,
        },
        limits: MarketLimits {
            amount: Some(MinMax {
                min: amount_min,
                max: amount_max,
            }),
            price: Some(MinMax {
                min: price_filter.and_then(|f| safe_decimal(f, "minPrice")),
                max: price_filter.and_then(|f| safe_decimal(f, "maxPrice")),
            }),
            cost: Some(MinMax {
                min: cost_filter
                    .and_then(|f| safe_decimal(f, "minNotional"))
                    .filter(|v| !v.is_zero()),
                max: None,
            }),
            leverage: None,
        },
        created: None,
        info: value_to_hashmap(data),
    })
}

/// Parses one `exchangeInfo` coin entry into a currency.
pub(crate) fn parse_currency(data: &Value, spec: &VenueSpec) -> Result<Currency> {
    let currency_id = safe_string(data, "coinId")
        .ok_or_else(|| Error::from(ParseError::missing_field("coinId")))?;
    let code = safe_currency_code(Some(&currency_id), &spec.common_currencies)
        .unwrap_or_else(|| currency_id.clone());

    let deposit = safe_bool(data, "allowDeposit");
    let withdraw = safe_bool(data, "allowWithdraw");

    let mut networks = HashMap::new();
    for chain in safe_list(data, "chainTypes").unwrap_or_default() {
        let Some(network_id) = safe_string(chain, "chainType") else {
            continue;
        };
        let network_code = spec
            .networks_by_id
            .get(&network_id)
            .cloned()
            .unwrap_or_else(|| network_id.clone());
        let chain_deposit = safe_bool(chain, "allowDeposit");
        let chain_withdraw = safe_bool(chain, "allowWithdraw");
        networks.insert(
            network_code.clone(),
            CurrencyNetwork {
                network: network_code,
                id: network_id,
                active: match (chain_deposit, chain_withdraw) {
                    (Some(d), Some(w)) => Some(d && w),
                    _ => None,
                },
                deposit: chain_deposit,
                withdraw: chain_withdraw,
                fee: safe_decimal(chain, "withdrawFee"),
                precision: None,
                limits: Some(MinMax {
                    min: safe_decimal(chain, "minWithdrawQuantity"),
                    max: safe_decimal(chain, "maxWithdrawQuantity").filter(|v| !v.is_zero()),
                }),
                info: value_to_hashmap(chain),
            },
        );
    }

    Ok(Currency {
        code,
        id: currency_id,
        name: safe_string(data, "coinFullName"),
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
///
///     {
///         "t": 1721685896846,
///         "s": "BTCUSDT-PERPETUAL",
///         "c": "67756.7",
///         "h": "68479.9",
///         "l": "66594.3",
///         "o": "68279.7",
///         "b": "67756.6",
///         "a": "67756.7",
///         "v": "1604722",
///         "qv": "108827258.7761"
///     }
pub(crate) fn parse_ticker(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> Ticker {
    let market_id = safe_string(data, "s");
    let market = ctx.market(market_id.as_deref(), market);
    let last = safe_decimal(data, "c");

    safe_ticker(
        Ticker {
            symbol: symbol_of(&market),
            timestamp: safe_integer(data, "t"),
            high: safe_decimal(data, "h"),
            low: safe_decimal(data, "l"),
            bid: safe_decimal(data, "b"),
            ask: safe_decimal(data, "a"),
            open: safe_decimal(data, "o"),
            close: last,
            last,
            base_volume: safe_decimal(data, "v"),
            quote_volume: safe_decimal(data, "qv"),
            info: value_to_hashmap(data),
            ..Ticker::default()
        },
        Some(&market),
    )
}

/// Parses a depth snapshot (`{"t": ..., "b": [[price, qty]...], "a": [...]}`).
pub(crate) fn parse_order_book(data: &Value, symbol: String) -> OrderBook {
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

    let timestamp = safe_integer(data, "t");
    OrderBook {
        symbol: Some(symbol),
        timestamp,
        datetime: timestamp.and_then(coinbridge_core::time::iso8601),
        nonce: None,
        bids: parse_side("b"),
        asks: parse_side("a"),
        info: value_to_hashmap(data),
    }
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

/// Parses one kline entry (array form).
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

/// Splits a venue side like `BUY_CLOSE` into side + reduce-only flag.
pub(crate) fn parse_side(raw: &str) -> (Option<OrderSide>, Option<bool>) {
    let lower = raw.to_lowercase();
    let mut parts = lower.split('_');
    let side = match parts.next() {
        Some("buy") => Some(OrderSide::Buy),
        Some("sell") => Some(OrderSide::Sell),
        _ => None,
    };
    let reduce_only = match parts.next() {
        Some("open") => Some(false),
        Some("close") => Some(true),
        _ => None,
    };
    (side, reduce_only)
}

/// Maps the venue status vocabulary onto the canonical one.
///
/// Unmapped statuses pass through verbatim.
pub(crate) fn parse_order_status(raw: &str) -> OrderStatus {
    match raw {
        "NEW" | "ORDER_NEW" | "PARTIALLY_FILLED" => OrderStatus::Open,
        "FILLED" => OrderStatus::Closed,
        "CANCELED" | "ORDER_CANCELED" | "PARTIALLY_CANCELED" | "PENDING_CANCEL" => {
            OrderStatus::Canceled
        }
        "REJECTED" => OrderStatus::Rejected,
        _ => OrderStatus::Other(raw.to_string()),
    }
}

/// Maps the venue order-type vocabulary onto the canonical one.
pub(crate) fn parse_order_type(raw: &str) -> OrderType {
    match raw {
        "MARKET" | "MARKET_OF_BASE" => OrderType::Market,
        "LIMIT" | "LIMIT_MAKER" => OrderType::Limit,
        _ => OrderType::Other(raw.to_string()),
    }
}

/// Parses a spot or swap order payload.
pub(crate) fn parse_order(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> Order {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), market);

    let raw_type = safe_string(data, "type");
    let price = safe_decimal(data, "price").filter(|p| !p.is_zero());
    let order_type = raw_type.as_deref().map(|raw| {
        // A swap STOP order encodes its subtype ambiguously: a price
        // means a stop-limit, no price means a stop-market.
        if raw == "STOP" {
            if price.is_some() {
                OrderType::Limit
            } else {
                OrderType::Market
            }
        } else if safe_string(data, "priceType").as_deref() == Some("MARKET") {
            OrderType::Market
        } else {
            parse_order_type(raw)
        }
    });

    let (side, reduce_only) = safe_string(data, "side")
        .map(|raw| parse_side(&raw))
        .unwrap_or((None, None));

    let mut post_only = raw_type.as_deref() == Some("LIMIT_MAKER");
    let time_in_force = match safe_string(data, "timeInForce").as_deref() {
        Some("GTC") => Some(TimeInForce::Gtc),
        Some("IOC") => Some(TimeInForce::Ioc),
        Some("FOK") => Some(TimeInForce::Fok),
        // Swap markets report post-only through timeInForce.
        Some("LIMIT_MAKER" | "PO") => {
            post_only = true;
            Some(TimeInForce::Po)
        }
        _ => None,
    };

    let fee_currency_id = safe_string(data, "feeCoin").filter(|id| !id.is_empty());
    let fee_amount = safe_decimal(data, "feeAmount").filter(|f| !f.is_zero());
    let fee = fee_amount.map(|cost| Fee {
        currency: ctx.currency_code(fee_currency_id.as_deref()),
        cost: Some(cost),
        rate: None,
    });

    let timestamp = safe_integer_2(data, "transactTime", "time");

    safe_order(
        Order {
            id: safe_string(data, "orderId"),
            client_order_id: safe_string(data, "clientOrderId"),
            timestamp,
            last_update_timestamp: safe_integer(data, "updateTime"),
            status: safe_string(data, "status").map(|s| parse_order_status(&s)),
            symbol: symbol_of(&market),
            order_type,
            time_in_force,
            side,
            price,
            average: safe_decimal(data, "avgPrice"),
            amount: safe_decimal(data, "origQty").filter(|q| !q.is_zero()),
            filled: safe_decimal(data, "executedQty"),
            cost: safe_decimal_2(data, "cumulativeQuoteQty", "cummulativeQuoteQty"),
            trigger_price: safe_decimal(data, "stopPrice").filter(|p| !p.is_zero()),
            reduce_only,
            post_only: Some(post_only),
            fee,
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

    let (mut side, _) = safe_string(data, "side")
        .map(|raw| parse_side(&raw))
        .unwrap_or((None, None));
    if side.is_none() {
        side = safe_bool(data, "isBuyer").map(|buyer| {
            if buyer {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            }
        });
    }

    let taker_or_maker = safe_bool(data, "isMaker").map(|maker| {
        if maker {
            TakerOrMaker::Maker
        } else {
            TakerOrMaker::Taker
        }
    });

    let fee_cost = safe_decimal(data, "commission");
    let fee = fee_cost.map(|cost| Fee {
        currency: ctx.currency_code(safe_string(data, "commissionAsset").as_deref()),
        cost: Some(cost),
        rate: None,
    });

    safe_trade(
        Trade {
            id: safe_string_n(data, &["id", "tradeId", "ticketId"]),
            order: safe_string(data, "orderId"),
            timestamp: safe_integer_2(data, "t", "time"),
            symbol: symbol_of(&market),
            side,
            taker_or_maker,
            price: safe_decimal_2(data, "p", "price"),
            amount: safe_decimal_n(data, &["q", "qty", "quantity"]),
            fee,
            info: value_to_hashmap(data),
            ..Trade::default()
        },
        Some(&market),
    )
}

/// Parses the account-information balance envelope.
///
///     {
///         "balances": [
///             { "asset": "USDT", "total": "40", "free": "40", "locked": "0" }
///         ],
///         "userId": "1732885739572845312"
///     }
pub(crate) fn parse_balance(data: &Value, ctx: &ParseContext<'_>) -> Balance {
    let mut balance = Balance {
        info: value_to_hashmap(data),
        ..Balance::default()
    };
    for entry in safe_list(data, "balances").unwrap_or_default() {
        let Some(code) = ctx.currency_code(safe_string_2(entry, "asset", "assetId").as_deref())
        else {
            continue;
        };
        balance.currencies.insert(
            code,
            BalanceEntry {
                free: safe_decimal_2(entry, "free", "availableMargin"),
                used: safe_decimal(entry, "locked"),
                total: safe_decimal(entry, "total"),
            },
        );
    }
    coinbridge_core::normalize::safe_balance(balance)
}

/// Parses one swap position.
pub(crate) fn parse_position(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> Position {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), market);

    safe_position(
        Position {
            symbol: symbol_of(&market),
            side: match safe_string_lower(data, "side").as_deref() {
                Some("long") => Some(PositionSide::Long),
                Some("short") => Some(PositionSide::Short),
                _ => None,
            },
            contracts: safe_decimal(data, "position"),
            notional: safe_decimal(data, "positionValue"),
            entry_price: safe_decimal(data, "avgPrice"),
            mark_price: safe_decimal(data, "markPrice"),
            liquidation_price: safe_decimal(data, "liquidationPrice"),
            leverage: safe_decimal(data, "leverage"),
            margin_mode: Some(coinbridge_core::config::MarginMode::Cross),
            initial_margin: safe_decimal(data, "margin"),
            maintenance_margin: safe_decimal(data, "minMargin"),
            unrealized_pnl: safe_decimal(data, "unrealizedPnL"),
            realized_pnl: safe_decimal(data, "realizedPnL"),
            info: value_to_hashmap(data),
            ..Position::default()
        },
        Some(&market),
    )
}

/// Parses one funding-rate entry
/// (`{"symbol": "...", "rate": "0.0001", "nextSettleTime": "1722297600000"}`).
pub(crate) fn parse_funding_rate(
    data: &Value,
    market: Option<&Market>,
    ctx: &ParseContext<'_>,
) -> FundingRate {
    let market_id = safe_string(data, "symbol");
    let market = ctx.market(market_id.as_deref(), market);
    let next_ts = safe_integer(data, "nextSettleTime");

    FundingRate {
        symbol: symbol_of(&market),
        funding_rate: safe_decimal(data, "rate"),
        next_funding_timestamp: next_ts,
        next_funding_datetime: next_ts.and_then(coinbridge_core::time::iso8601),
        info: value_to_hashmap(data),
        ..FundingRate::default()
    }
}

/// Builds leverage tiers from a swap market's `riskLimits` table.
pub(crate) fn parse_leverage_tiers(data: &Value, market: &Market) -> Vec<LeverageTier> {
    let settle = market.settle.clone();
    safe_list(data, "riskLimits")
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, tier)| {
            let maintenance = safe_decimal(tier, "maintMargin");
            let initial = safe_decimal(tier, "initialMargin");
            LeverageTier {
                tier: Some(index as u32 + 1),
                symbol: symbol_of(&market),
                currency: settle.clone(),
                min_notional: None,
                max_notional: safe_decimal(tier, "quantity"),
                maintenance_margin_rate: maintenance,
                max_leverage: initial
                    .filter(|im| !im.is_zero())
                    .and_then(|im| Decimal::ONE.checked_div(im)),
                info: value_to_hashmap(tier),
            }
        })
        .collect()
}

/// Maps a `balanceFlow` flow-type code onto the shared ledger vocabulary.
fn parse_ledger_entry_type(flow_type_value: Option<&str>) -> Option<String> {
    let raw = flow_type_value?;
    let mapped = match raw {
        "1" => "trade",
        "2" => "fee",
        "51" => "transfer",
        "900" => "deposit",
        "904" => "withdrawal",
        other => other,
    };
    Some(mapped.to_string())
}

/// Parses one `balanceFlow` entry.
pub(crate) fn parse_ledger_entry(data: &Value, ctx: &ParseContext<'_>) -> LedgerEntry {
    safe_ledger_entry(LedgerEntry {
        id: safe_string(data, "id"),
        timestamp: safe_integer(data, "created"),
        account: safe_string(data, "accountId"),
        entry_type: parse_ledger_entry_type(safe_string(data, "flowTypeValue").as_deref()),
        currency: ctx.currency_code(safe_string_2(data, "coin", "coinId").as_deref()),
        amount: safe_decimal(data, "change"),
        after: safe_decimal(data, "total"),
        status: Some("ok".to_string()),
        info: value_to_hashmap(data),
        ..LedgerEntry::default()
    })
}

fn parse_transaction_status(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let mapped = match raw.as_str() {
        "1" | "2" | "5" => "pending",
        "4" | "6" | "successful" => "ok",
        "3" | "7" | "9" | "10" => "failed",
        "8" => "canceled",
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
    let fee = safe_decimal(data, "fee").map(|cost| Fee {
        currency: ctx.currency_code(safe_string(data, "feeCoinId").as_deref()),
        cost: Some(cost),
        rate: None,
    });

    safe_transaction(Transaction {
        id: safe_string(data, "id"),
        txid: safe_string(data, "txId"),
        timestamp: safe_integer(data, "time"),
        transaction_type: Some(transaction_type),
        currency: ctx.currency_code(safe_string_2(data, "coinId", "coin").as_deref()),
        amount: safe_decimal(data, "quantity"),
        address: safe_string(data, "address"),
        tag: safe_string(data, "addressExt").filter(|t| !t.is_empty()),
        status: parse_transaction_status(
            safe_string_2(data, "statusCode", "status").or(safe_string(data, "withdrawStatus")),
        ),
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
        safe_string(data, "addressExt"),
        value_to_hashmap(data),
    )
}

fn parse_account_type(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let mapped = match raw.as_str() {
        "1" => "spot",
        "3" => "swap",
        "5" => "custody",
        "6" => "fiat",
        other => other,
    };
    Some(mapped.to_string())
}

/// Parses one account entry.
pub(crate) fn parse_account(data: &Value) -> Account {
    Account {
        id: safe_string(data, "accountId"),
        account_type: parse_account_type(safe_string(data, "accountType")),
        code: None,
        info: value_to_hashmap(data),
    }
}

/// Parses an asset-transfer response.
pub(crate) fn parse_transfer(
    data: &Value,
    code: Option<String>,
    amount: Option<Decimal>,
    from_account: Option<String>,
    to_account: Option<String>,
) -> TransferEntry {
    let timestamp = safe_integer(data, "timestamp");
    TransferEntry {
        id: safe_string_2(data, "transferId", "id"),
        timestamp,
        datetime: timestamp.and_then(coinbridge_core::time::iso8601),
        currency: code,
        amount,
        from_account,
        to_account,
        status: Some(
            if safe_bool(data, "success").unwrap_or(true) {
                "ok"
            } else {
                "failed"
            }
            .to_string(),
        ),
        info: value_to_hashmap(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbridge_core::types::MarketType;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn spec() -> VenueSpec {
        super::super::describe::spec()
    }

    fn swap_market() -> Market {
        Market {
            settle: Some("USDT".to_string()),
            settle_id: Some("USDT".to_string()),
            market_type: MarketType::Swap,
            contract: true,
            linear: Some(true),
            contract_size: Some(dec!(0.001)),
            ..Market::new_spot("BTCUSDT-PERPETUAL", "BTC/USDT:USDT", "BTC", "USDT")
        }
    }

    #[test]
    fn test_parse_swap_market() {
        let spec = spec();
        let data = json!({
            "symbol": "BTCUSDT-PERPETUAL",
            "symbolName": "BTCUSDT-PERPETUAL",
            "status": "TRADING",
            "baseAsset": "BTCUSDT-PERPETUAL",
            "baseAssetPrecision": "0.001",
            "quoteAsset": "USDT",
            "inverse": false,
            "marginToken": "USDT",
            "contractMultiplier": "0.001",
            "underlying": "BTC",
            "filters": [
                {"minPrice": "0.1", "maxPrice": "100000.00000000", "tickSize": "0.1", "filterType": "PRICE_FILTER"},
                {"minQty": "0.001", "maxQty": "10", "stepSize": "0.001", "filterType": "LOT_SIZE"},
                {"minNotional": "0", "filterType": "MIN_NOTIONAL"}
            ]
        });
        let market = parse_market(&data, &spec).unwrap();
        assert_eq!(market.symbol, "BTC/USDT:USDT");
        assert_eq!(market.market_type, MarketType::Swap);
        assert_eq!(market.linear, Some(true));
        assert_eq!(market.contract_size, Some(dec!(0.001)));
        // amounts are converted to contract counts
        assert_eq!(market.precision.amount, Some(dec!(1)));
        assert_eq!(market.limits.amount.unwrap().max, Some(dec!(10000)));
        assert_eq!(market.precision.price, Some(dec!(0.1)));
        assert!(market.active);
        // zero minNotional is dropped, not reported as zero
        assert_eq!(market.limits.cost.unwrap().min, None);
    }

    #[test]
    fn test_parse_spot_market() {
        let spec = spec();
        let data = json!({
            "symbol": "BTCUSDT",
            "status": "HALT",
            "baseAsset": "BTC",
            "quoteAsset": "USDT",
            "allowMargin": false,
            "filters": [
                {"minPrice": "0.01", "tickSize": "0.01", "filterType": "PRICE_FILTER"},
                {"minQty": "0.00001", "maxQty": "8", "stepSize": "0.00001", "filterType": "LOT_SIZE"},
                {"minNotional": "1", "filterType": "MIN_NOTIONAL"}
            ]
        });
        let market = parse_market(&data, &spec).unwrap();
        assert_eq!(market.symbol, "BTC/USDT");
        assert_eq!(market.market_type, MarketType::Spot);
        assert!(!market.active);
        assert_eq!(market.limits.cost.unwrap().min, Some(dec!(1)));
    }

    #[test]
    fn test_parse_ticker_concrete_scenario() {
        let spec = spec();
        let market = swap_market();
        let markets_by_id = HashMap::from([(
            market.id.clone(),
            Arc::new(market),
        )]);
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
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
        });
        let ticker = parse_ticker(&data, None, &ctx);
        assert_eq!(ticker.symbol.as_deref(), Some("BTC/USDT:USDT"));
        assert_eq!(ticker.timestamp, Some(1721685896846));
        assert_eq!(ticker.last.unwrap().to_string(), "67756.7");
        assert_eq!(ticker.close.unwrap().to_string(), "67756.7");
        assert_eq!(ticker.high.unwrap().to_string(), "68479.9");
        assert_eq!(ticker.low.unwrap().to_string(), "66594.3");
        assert_eq!(ticker.bid.unwrap().to_string(), "67756.6");
        assert_eq!(ticker.quote_volume.unwrap().to_string(), "108827258.7761");
    }

    #[test]
    fn test_parse_order_canceled_reduce_only() {
        let spec = spec();
        let markets_by_id = HashMap::from([(
            "BTCUSDT-PERPETUAL".to_string(),
            Arc::new(swap_market()),
        )]);
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "orderId": "1742263144028363776",
            "symbol": "BTCUSDT-PERPETUAL",
            "status": "PARTIALLY_CANCELED",
            "side": "BUY_CLOSE",
            "type": "LIMIT",
            "price": "67000",
            "origQty": "4",
            "executedQty": "1",
            "timeInForce": "GTC",
            "time": 1722429951648i64
        });
        let order = parse_order(&data, None, &ctx);
        assert_eq!(order.status, Some(OrderStatus::Canceled));
        assert_eq!(order.side, Some(OrderSide::Buy));
        assert_eq!(order.reduce_only, Some(true));
        assert_eq!(order.remaining, Some(dec!(3)));
        assert_eq!(order.symbol.as_deref(), Some("BTC/USDT:USDT"));
    }

    #[test]
    fn test_parse_order_stop_type_disambiguation() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };

        let with_price = json!({"orderId": "1", "symbol": "X", "type": "STOP", "price": "100"});
        let order = parse_order(&with_price, None, &ctx);
        assert_eq!(order.order_type, Some(OrderType::Limit));

        let without_price = json!({"orderId": "2", "symbol": "X", "type": "STOP", "price": "0"});
        let order = parse_order(&without_price, None, &ctx);
        assert_eq!(order.order_type, Some(OrderType::Market));
    }

    #[test]
    fn test_parse_order_status_totality() {
        let documented = [
            "NEW",
            "PARTIALLY_FILLED",
            "PARTIALLY_CANCELED",
            "FILLED",
            "CANCELED",
            "ORDER_CANCELED",
            "PENDING_CANCEL",
            "REJECTED",
            "ORDER_NEW",
        ];
        for raw in documented {
            let status = parse_order_status(raw);
            assert!(
                !matches!(status, OrderStatus::Other(_)),
                "documented status {raw} must map to a canonical value"
            );
        }
        // Pass-through is the explicit contract for unknown vocabulary.
        assert_eq!(
            parse_order_status("SOMETHING_NEW"),
            OrderStatus::Other("SOMETHING_NEW".to_string())
        );
    }

    #[test]
    fn test_parse_order_minimal_payload_is_fully_keyed() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let order = parse_order(&json!({}), None, &ctx);
        assert_eq!(order.id, None);
        assert_eq!(order.status, None);
        assert_eq!(order.price, None);
        assert_eq!(order.amount, None);
        assert_eq!(order.remaining, None);
        assert_eq!(order.cost, None);
    }

    #[test]
    fn test_parse_trade_derives_cost() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "t": 1721682745779i64,
            "p": "67835.99",
            "q": "0.00017",
            "ibm": true
        });
        let trade = parse_trade(&data, None, &ctx);
        assert_eq!(trade.cost.unwrap().to_string(), "11.5321183");
        assert_eq!(trade.side, None);
    }

    #[test]
    fn test_parse_my_trade() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "id": "1739352552862964736",
            "orderId": "1739352552762301440",
            "symbol": "ETHUSDT",
            "price": "3289.96",
            "qty": "0.001",
            "commission": "0.0000012",
            "commissionAsset": "ETH",
            "time": "1722082982097",
            "isBuyer": true,
            "isMaker": false
        });
        let trade = parse_trade(&data, None, &ctx);
        assert_eq!(trade.side, Some(OrderSide::Buy));
        assert_eq!(trade.taker_or_maker, Some(TakerOrMaker::Taker));
        assert_eq!(trade.fee.as_ref().unwrap().currency.as_deref(), Some("ETH"));
        assert_eq!(trade.timestamp, Some(1722082982097));
    }

    #[test]
    fn test_parse_balance() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "balances": [
                {"asset": "USDT", "assetId": "USDT", "total": "40", "free": "30", "locked": "10"}
            ],
            "userId": "1732885739572845312"
        });
        let balance = parse_balance(&data, &ctx);
        let usdt = balance.get("USDT").unwrap();
        assert_eq!(usdt.free, Some(dec!(30)));
        assert_eq!(usdt.used, Some(dec!(10)));
        assert_eq!(usdt.total, Some(dec!(40)));
    }

    #[test]
    fn test_parse_ledger_entry() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "id": "1740844413612065537",
            "accountId": "1732885739589466112",
            "coin": "USDT",
            "coinId": "USDT",
            "flowTypeValue": 51,
            "flowType": "USER_ACCOUNT_TRANSFER",
            "change": "-1",
            "total": "8.015680088",
            "created": "1722260825765"
        });
        let entry = parse_ledger_entry(&data, &ctx);
        assert_eq!(entry.entry_type.as_deref(), Some("transfer"));
        assert_eq!(entry.amount, Some(dec!(1)));
        assert_eq!(
            entry.direction,
            Some(coinbridge_core::types::LedgerDirection::Out)
        );
        assert_eq!(entry.currency.as_deref(), Some("USDT"));
    }

    #[test]
    fn test_parse_transaction() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "time": "1719499716079",
            "id": "W594298131448512512",
            "coin": "USDT",
            "coinId": "USDT",
            "address": "0xA9648A0f44956AFA90A16F5Fe470d34C85fb983B",
            "quantity": "1.00000000",
            "txId": "0x4fc00f8d053bcd24cd052130e051e4587c4f5c19efb73ddc6c8da77cb0040e93",
            "feeCoinId": "USDT",
            "fee": "0.00100000"
        });
        let tx = parse_transaction(&data, TransactionType::Withdrawal, &ctx);
        assert_eq!(tx.transaction_type, Some(TransactionType::Withdrawal));
        assert_eq!(tx.amount.unwrap().to_string(), "1.00000000");
        assert_eq!(tx.fee.as_ref().unwrap().cost, Some(dec!(0.001)));
        assert_eq!(tx.address_to.as_deref(), tx.address.as_deref());
    }

    #[test]
    fn test_parse_deposit_address_requires_address() {
        let ok = parse_deposit_address(
            &json!({"address": "0x61AAd7F763e2C7fF1CC996918740F67f9dC8BF4e", "addressExt": ""}),
            Some("ETH".to_string()),
            Some("ERC20".to_string()),
        )
        .unwrap();
        assert_eq!(ok.tag, None);

        assert!(parse_deposit_address(&json!({"addressExt": "x"}), None, None).is_err());
    }

    #[test]
    fn test_parse_ohlcv_row() {
        let row = json!([1721684280000i64, "67832.49", "67862.5", "67832.49", "67861.51", "0.045"]);
        let candle = parse_ohlcv(&row).unwrap();
        assert_eq!(candle.timestamp, 1721684280000);
        assert_eq!(candle.close.unwrap().to_string(), "67861.51");
    }

    #[test]
    fn test_parse_order_book() {
        let data = json!({
            "t": 1721681436393i64,
            "b": [["67756.6", "0.1"], ["67756.5", "0.2"]],
            "a": [["67756.7", "0.3"]]
        });
        let book = parse_order_book(&data, "BTC/USDT:USDT".to_string());
        assert_eq!(book.bids.len(), 2);
        assert_eq!(book.best_bid().unwrap().price, dec!(67756.6));
        assert_eq!(book.best_ask().unwrap().amount, dec!(0.3));
    }

    #[test]
    fn test_parse_idempotence() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({
            "orderId": "77",
            "symbol": "ETHUSDT",
            "status": "NEW",
            "side": "BUY",
            "type": "LIMIT",
            "price": "3200",
            "origQty": "1",
            "executedQty": "0.5",
            "time": 1722429951648i64
        });
        let first = parse_order(&data, None, &ctx);
        let second = parse_order(&data, None, &ctx);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_parse_funding_rate() {
        let spec = spec();
        let markets_by_id = HashMap::new();
        let ctx = ParseContext {
            spec: &spec,
            markets_by_id: &markets_by_id,
        };
        let data = json!({"symbol": "ETHUSDT-PERPETUAL", "rate": "0.0001", "nextSettleTime": "1722297600000"});
        let rate = parse_funding_rate(&data, None, &ctx);
        assert_eq!(rate.funding_rate, Some(dec!(0.0001)));
        assert_eq!(rate.next_funding_timestamp, Some(1722297600000));
    }
}
