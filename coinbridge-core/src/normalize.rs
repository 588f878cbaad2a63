//! Unified normalizers.
//!
//! Each `safe_*` function takes a partially-filled canonical structure
//! (produced by a venue parser) plus optional context and returns the
//! fully-populated form: every documented key present, redundant values
//! re-derived with exact arithmetic where safely possible, and `None`
//! everywhere the venue reported nothing. Normalizers are best-effort:
//! they never fail on missing optional data. The one exception is
//! [`safe_deposit_address`]: a credential-bearing structure without its
//! address is worse than a loud failure.
//!
//! Idempotence is a contract: normalizing an already-normalized value is
//! the identity.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::precise::omit_zero;
use crate::time::iso8601;
use crate::types::{
    Balance, DepositAddress, LedgerEntry, Market, Order, Position, Ticker, Trade, Transaction,
};

/// Resolves a raw venue market id to a [`Market`].
///
/// Resolution order: the directly supplied market, then the
/// markets-by-id index, then synthesis. An unrecognized id never fails:
/// it synthesizes a best-effort inactive market so a single delisted
/// instrument cannot abort a whole batch parse. With a `delimiter` the
/// id splits into base/quote (`"ETH-BTC"` becomes `ETH/BTC`); without
/// one the id doubles as the symbol.
pub fn safe_market(
    market_id: Option<&str>,
    market: Option<&Market>,
    markets_by_id: &HashMap<String, Arc<Market>>,
    delimiter: Option<&str>,
) -> Market {
    if let Some(market) = market {
        return market.clone();
    }
    let Some(id) = market_id else {
        return Market::default();
    };
    if let Some(market) = markets_by_id.get(id) {
        return (**market).clone();
    }

    // Unknown id: synthesize an inactive placeholder market.
    let mut synthesized = Market {
        id: id.to_string(),
        symbol: id.to_string(),
        active: false,
        ..Market::default()
    };
    if let Some(delimiter) = delimiter {
        let mut parts = id.splitn(2, delimiter);
        if let (Some(base), Some(quote)) = (parts.next(), parts.next()) {
            if !base.is_empty() && !quote.is_empty() {
                synthesized.base = base.to_uppercase();
                synthesized.quote = quote.to_uppercase();
                synthesized.symbol = format!("{}/{}", synthesized.base, synthesized.quote);
            }
        }
    }
    synthesized
}

/// Maps a venue currency id to the unified currency code.
///
/// Codes are uppercased and corrected through the venue's
/// common-currencies table, so the same underlying asset carries one
/// code across venues with divergent tickers (`XBT` → `BTC`).
pub fn safe_currency_code(
    currency_id: Option<&str>,
    common_currencies: &HashMap<String, String>,
) -> Option<String> {
    let id = currency_id?;
    if id.is_empty() {
        return None;
    }
    let upper = id.to_uppercase();
    Some(common_currencies.get(&upper).cloned().unwrap_or(upper))
}

fn fill_datetime(datetime: &mut Option<String>, timestamp: Option<i64>) {
    if datetime.is_none() {
        *datetime = timestamp.and_then(iso8601);
    }
}

/// Completes a [`Ticker`].
///
/// `last` and `close` mirror each other; `change`, `percentage`,
/// `average` and `vwap` are derived from open/close/volumes when absent.
pub fn safe_ticker(mut ticker: Ticker, market: Option<&Market>) -> Ticker {
    if ticker.symbol.is_none() {
        ticker.symbol = market.map(|m| m.symbol.clone());
    }
    fill_datetime(&mut ticker.datetime, ticker.timestamp);

    // last and close are the same quantity under two names.
    match (ticker.last, ticker.close) {
        (Some(last), None) => ticker.close = Some(last),
        (None, Some(close)) => ticker.last = Some(close),
        _ => {}
    }

    if ticker.vwap.is_none() {
        ticker.vwap = match (ticker.quote_volume, ticker.base_volume) {
            (Some(qv), Some(bv)) if !bv.is_zero() => qv.checked_div(bv),
            _ => None,
        };
    }

    if let (Some(open), Some(last)) = (ticker.open, ticker.last) {
        if ticker.change.is_none() {
            ticker.change = last.checked_sub(open);
        }
        if ticker.average.is_none() {
            ticker.average = last
                .checked_add(open)
                .and_then(|sum| sum.checked_div(Decimal::TWO));
        }
        if ticker.percentage.is_none() && !open.is_zero() {
            ticker.percentage = ticker
                .change
                .and_then(|change| change.checked_div(open))
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
        }
    }

    ticker
}

/// Completes an [`Order`].
///
/// Derivations, all with exact arithmetic and only when the venue did
/// not already provide the value:
/// - `remaining = amount - filled` (clamped at zero) when both legs are
///   present, never fabricated from one leg alone;
/// - `filled = amount - remaining` symmetrically;
/// - `cost = filled × average` (falling back to `price`);
/// - `average = cost / filled` for nonzero fills.
///
/// Status is venue-authoritative and never touched here.
pub fn safe_order(mut order: Order, market: Option<&Market>) -> Order {
    if order.symbol.is_none() {
        order.symbol = market.map(|m| m.symbol.clone());
    }
    fill_datetime(&mut order.datetime, order.timestamp);

    order.price = omit_zero(order.price);
    order.average = omit_zero(order.average);
    order.trigger_price = omit_zero(order.trigger_price);
    order.stop_loss_price = omit_zero(order.stop_loss_price);
    order.take_profit_price = omit_zero(order.take_profit_price);

    match (order.amount, order.filled, order.remaining) {
        (Some(amount), Some(filled), None) => {
            order.remaining = amount.checked_sub(filled).map(|r| r.max(Decimal::ZERO));
        }
        (Some(amount), None, Some(remaining)) => {
            order.filled = amount.checked_sub(remaining).map(|f| f.max(Decimal::ZERO));
        }
        _ => {}
    }

    if order.cost.is_none() {
        let fill_price = order.average.or(order.price);
        order.cost = match (order.filled, fill_price) {
            (Some(filled), Some(price)) if !filled.is_zero() => filled.checked_mul(price),
            _ => None,
        };
    }

    if order.average.is_none() {
        order.average = match (order.cost, order.filled) {
            (Some(cost), Some(filled)) if !filled.is_zero() => cost.checked_div(filled),
            _ => None,
        };
    }

    order
}

/// Completes a [`Trade`], deriving `cost = price × amount` when absent.
pub fn safe_trade(mut trade: Trade, market: Option<&Market>) -> Trade {
    if trade.symbol.is_none() {
        trade.symbol = market.map(|m| m.symbol.clone());
    }
    fill_datetime(&mut trade.datetime, trade.timestamp);

    if trade.cost.is_none() {
        trade.cost = match (trade.price, trade.amount) {
            (Some(price), Some(amount)) => price.checked_mul(amount),
            _ => None,
        };
    }

    trade
}

/// Completes a [`Balance`], filling each missing leg of
/// `total = free + used` per currency.
pub fn safe_balance(mut balance: Balance) -> Balance {
    fill_datetime(&mut balance.datetime, balance.timestamp);

    for entry in balance.currencies.values_mut() {
        match (entry.free, entry.used, entry.total) {
            (Some(free), Some(used), None) => entry.total = free.checked_add(used),
            (Some(free), None, Some(total)) => entry.used = total.checked_sub(free),
            (None, Some(used), Some(total)) => entry.free = total.checked_sub(used),
            _ => {}
        }
    }

    balance
}

/// Completes a [`LedgerEntry`].
pub fn safe_ledger_entry(mut entry: LedgerEntry) -> LedgerEntry {
    fill_datetime(&mut entry.datetime, entry.timestamp);

    // A signed amount encodes the direction; the unified form keeps the
    // amount positive and the direction explicit.
    if let Some(amount) = entry.amount {
        if amount.is_sign_negative() {
            entry.amount = Some(amount.abs());
            if entry.direction.is_none() {
                entry.direction = Some(crate::types::LedgerDirection::Out);
            }
        }
    }

    if entry.before.is_none() {
        if let (Some(after), Some(amount)) = (entry.after, entry.amount) {
            let delta = match entry.direction {
                Some(crate::types::LedgerDirection::Out) => amount,
                _ => -amount,
            };
            entry.before = after.checked_add(delta);
        }
    }

    entry
}

/// Completes a [`Position`].
pub fn safe_position(mut position: Position, market: Option<&Market>) -> Position {
    if position.symbol.is_none() {
        position.symbol = market.map(|m| m.symbol.clone());
    }
    if position.contract_size.is_none() {
        position.contract_size = market.and_then(|m| m.contract_size);
    }
    fill_datetime(&mut position.datetime, position.timestamp);

    if position.notional.is_none() {
        position.notional = match (
            position.contracts,
            position.contract_size,
            position.mark_price,
        ) {
            (Some(contracts), Some(size), Some(mark)) => {
                contracts.checked_mul(size).and_then(|b| b.checked_mul(mark))
            }
            _ => None,
        };
    }

    if let Some(notional) = position.notional {
        if !notional.is_zero() {
            if position.initial_margin_percentage.is_none() {
                position.initial_margin_percentage = position
                    .initial_margin
                    .and_then(|im| im.checked_div(notional));
            }
            if position.maintenance_margin_percentage.is_none() {
                position.maintenance_margin_percentage = position
                    .maintenance_margin
                    .and_then(|mm| mm.checked_div(notional));
            }
        }
    }

    position
}

/// Completes a [`Transaction`].
pub fn safe_transaction(mut transaction: Transaction) -> Transaction {
    fill_datetime(&mut transaction.datetime, transaction.timestamp);
    if transaction.address_to.is_none() {
        transaction.address_to = transaction.address.clone();
    }
    transaction
}

/// Builds a [`DepositAddress`], failing loudly when the address itself
/// is missing.
///
/// # Errors
///
/// Returns `InvalidAddress` for an absent or empty address.
pub fn safe_deposit_address(
    currency: Option<String>,
    network: Option<String>,
    address: Option<String>,
    tag: Option<String>,
    info: HashMap<String, serde_json::Value>,
) -> Result<DepositAddress> {
    let address = address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| Error::invalid_address("venue returned no deposit address"))?;
    Ok(DepositAddress {
        currency,
        network,
        address,
        tag: tag.filter(|t| !t.is_empty()),
        info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BalanceEntry, LedgerDirection};
    use rust_decimal_macros::dec;

    fn markets_by_id(markets: Vec<Market>) -> HashMap<String, Arc<Market>> {
        markets
            .into_iter()
            .map(|m| (m.id.clone(), Arc::new(m)))
            .collect()
    }

    #[test]
    fn test_safe_market_prefers_provided() {
        let provided = Market::new_spot("X", "X/Y", "X", "Y");
        let index = markets_by_id(vec![Market::new_spot("X", "OTHER/Y", "OTHER", "Y")]);
        let resolved = safe_market(Some("X"), Some(&provided), &index, None);
        assert_eq!(resolved.symbol, "X/Y");
    }

    #[test]
    fn test_safe_market_resolves_by_id() {
        let index = markets_by_id(vec![Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT")]);
        let resolved = safe_market(Some("BTCUSDT"), None, &index, None);
        assert_eq!(resolved.symbol, "BTC/USDT");
        assert!(resolved.active);
    }

    #[test]
    fn test_safe_market_synthesizes_unknown_id() {
        let index = HashMap::new();
        let resolved = safe_market(Some("ETH-BTC"), None, &index, Some("-"));
        assert_eq!(resolved.symbol, "ETH/BTC");
        assert_eq!(resolved.base, "ETH");
        assert!(!resolved.active);

        let opaque = safe_market(Some("WEIRDID"), None, &index, Some("-"));
        assert_eq!(opaque.symbol, "WEIRDID");
        assert!(!opaque.active);
    }

    #[test]
    fn test_safe_currency_code_aliases() {
        let mut table = HashMap::new();
        table.insert("XBT".to_string(), "BTC".to_string());
        assert_eq!(
            safe_currency_code(Some("xbt"), &table),
            Some("BTC".to_string())
        );
        assert_eq!(
            safe_currency_code(Some("eth"), &table),
            Some("ETH".to_string())
        );
        assert_eq!(safe_currency_code(None, &table), None);
        assert_eq!(safe_currency_code(Some(""), &table), None);
    }

    #[test]
    fn test_safe_ticker_mirrors_last_close() {
        let ticker = safe_ticker(
            Ticker {
                last: Some(dec!(67756.7)),
                ..Ticker::default()
            },
            None,
        );
        assert_eq!(ticker.close, Some(dec!(67756.7)));

        let ticker = safe_ticker(
            Ticker {
                close: Some(dec!(100)),
                ..Ticker::default()
            },
            None,
        );
        assert_eq!(ticker.last, Some(dec!(100)));
    }

    #[test]
    fn test_safe_ticker_derivations() {
        let ticker = safe_ticker(
            Ticker {
                open: Some(dec!(100)),
                last: Some(dec!(110)),
                base_volume: Some(dec!(2)),
                quote_volume: Some(dec!(210)),
                ..Ticker::default()
            },
            None,
        );
        assert_eq!(ticker.change, Some(dec!(10)));
        assert_eq!(ticker.percentage, Some(dec!(10)));
        assert_eq!(ticker.average, Some(dec!(105)));
        assert_eq!(ticker.vwap, Some(dec!(105)));
    }

    #[test]
    fn test_safe_ticker_idempotent() {
        let once = safe_ticker(
            Ticker {
                open: Some(dec!(100)),
                last: Some(dec!(110)),
                timestamp: Some(1721685896846),
                ..Ticker::default()
            },
            None,
        );
        let twice = safe_ticker(once.clone(), None);
        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn test_safe_order_remaining_derivation() {
        let order = safe_order(
            Order {
                amount: Some(dec!(10)),
                filled: Some(dec!(4)),
                ..Order::default()
            },
            None,
        );
        assert_eq!(order.remaining, Some(dec!(6)));
    }

    #[test]
    fn test_safe_order_never_fabricates_remaining() {
        let order = safe_order(
            Order {
                amount: Some(dec!(10)),
                ..Order::default()
            },
            None,
        );
        assert_eq!(order.remaining, None);

        let order = safe_order(
            Order {
                filled: Some(dec!(4)),
                ..Order::default()
            },
            None,
        );
        assert_eq!(order.remaining, None);
    }

    #[test]
    fn test_safe_order_cost_prefers_average() {
        let order = safe_order(
            Order {
                filled: Some(dec!(2)),
                price: Some(dec!(100)),
                average: Some(dec!(99)),
                ..Order::default()
            },
            None,
        );
        assert_eq!(order.cost, Some(dec!(198)));
    }

    #[test]
    fn test_safe_order_drops_zero_prices() {
        let order = safe_order(
            Order {
                price: Some(dec!(0)),
                trigger_price: Some(dec!(0.00)),
                ..Order::default()
            },
            None,
        );
        assert_eq!(order.price, None);
        assert_eq!(order.trigger_price, None);
    }

    #[test]
    fn test_safe_trade_cost() {
        let trade = safe_trade(
            Trade {
                price: Some(dec!(67756.7)),
                amount: Some(dec!(0.001)),
                ..Trade::default()
            },
            None,
        );
        assert_eq!(trade.cost, Some(dec!(67.7567)));
    }

    #[test]
    fn test_safe_balance_completes_legs() {
        let mut balance = Balance::default();
        balance.currencies.insert(
            "BTC".to_string(),
            BalanceEntry {
                free: Some(dec!(1.5)),
                used: Some(dec!(0.5)),
                total: None,
            },
        );
        balance.currencies.insert(
            "ETH".to_string(),
            BalanceEntry {
                free: Some(dec!(10)),
                used: None,
                total: Some(dec!(12)),
            },
        );
        let balance = safe_balance(balance);
        assert_eq!(balance.get("BTC").unwrap().total, Some(dec!(2.0)));
        assert_eq!(balance.get("ETH").unwrap().used, Some(dec!(2)));
    }

    #[test]
    fn test_safe_ledger_entry_signs() {
        let entry = safe_ledger_entry(LedgerEntry {
            amount: Some(dec!(-5)),
            after: Some(dec!(95)),
            ..LedgerEntry::default()
        });
        assert_eq!(entry.amount, Some(dec!(5)));
        assert_eq!(entry.direction, Some(LedgerDirection::Out));
        assert_eq!(entry.before, Some(dec!(100)));
    }

    #[test]
    fn test_safe_position_margin_percentages() {
        let position = safe_position(
            Position {
                notional: Some(dec!(1000)),
                initial_margin: Some(dec!(100)),
                maintenance_margin: Some(dec!(5)),
                ..Position::default()
            },
            None,
        );
        assert_eq!(position.initial_margin_percentage, Some(dec!(0.1)));
        assert_eq!(position.maintenance_margin_percentage, Some(dec!(0.005)));
    }

    #[test]
    fn test_safe_deposit_address_requires_address() {
        assert!(matches!(
            safe_deposit_address(Some("BTC".into()), None, None, None, HashMap::new()),
            Err(Error::InvalidAddress(_))
        ));
        assert!(
            safe_deposit_address(
                Some("BTC".into()),
                None,
                Some(String::new()),
                None,
                HashMap::new()
            )
            .is_err()
        );
        let address = safe_deposit_address(
            Some("BTC".into()),
            Some("BTC".into()),
            Some("bc1qxyz".into()),
            None,
            HashMap::new(),
        )
        .unwrap();
        assert_eq!(address.address, "bc1qxyz");
    }
}
