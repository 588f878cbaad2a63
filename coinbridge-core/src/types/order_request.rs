//! Order creation request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::{OrderSide, OrderType, Symbol, TimeInForce};
use crate::config::MarginMode;

/// Parameters for `create_order`.
///
/// Venue-specific extras travel in `params` and are interpreted by the
/// individual adapter; everything typed here is part of the unified
/// contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Unified symbol.
    pub symbol: Symbol,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Side.
    pub side: OrderSide,
    /// Amount in base units.
    pub amount: Decimal,
    /// Limit price; required for limit orders.
    pub price: Option<Decimal>,
    /// Caller-supplied client order id.
    pub client_order_id: Option<String>,
    /// Validity duration.
    pub time_in_force: Option<TimeInForce>,
    /// Maker only.
    pub post_only: Option<bool>,
    /// Position-reducing only.
    pub reduce_only: Option<bool>,
    /// Price that activates a conditional order.
    pub trigger_price: Option<Decimal>,
    /// Attached stop-loss price.
    pub stop_loss_price: Option<Decimal>,
    /// Attached take-profit price.
    pub take_profit_price: Option<Decimal>,
    /// Collateral mode for derivative orders.
    pub margin_mode: Option<MarginMode>,
    /// Venue-specific extra parameters.
    pub params: HashMap<String, Value>,
}

impl OrderRequest {
    /// A plain market order.
    pub fn market(symbol: impl Into<Symbol>, side: OrderSide, amount: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: OrderType::Market,
            side,
            amount,
            price: None,
            client_order_id: None,
            time_in_force: None,
            post_only: None,
            reduce_only: None,
            trigger_price: None,
            stop_loss_price: None,
            take_profit_price: None,
            margin_mode: None,
            params: HashMap::new(),
        }
    }

    /// A plain limit order.
    pub fn limit(
        symbol: impl Into<Symbol>,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            price: Some(price),
            order_type: OrderType::Limit,
            ..Self::market(symbol, side, amount)
        }
    }

    /// Sets the client order id.
    #[must_use]
    pub fn client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Sets the trigger price, making this a conditional order.
    #[must_use]
    pub fn trigger_price(mut self, price: Decimal) -> Self {
        self.trigger_price = Some(price);
        self
    }

    /// Marks the order post-only.
    #[must_use]
    pub fn post_only(mut self) -> Self {
        self.post_only = Some(true);
        self
    }

    /// Marks the order reduce-only.
    #[must_use]
    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = Some(true);
        self
    }

    /// Sets the time in force.
    #[must_use]
    pub fn time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Adds one venue-specific parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_builder() {
        let request = OrderRequest::limit("BTC/USDT", OrderSide::Buy, dec!(0.1), dec!(50000))
            .post_only()
            .client_order_id("cb-1");
        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.price, Some(dec!(50000)));
        assert_eq!(request.post_only, Some(true));
        assert_eq!(request.client_order_id.as_deref(), Some("cb-1"));
    }

    #[test]
    fn test_market_has_no_price() {
        let request = OrderRequest::market("BTC/USDT", OrderSide::Sell, dec!(1));
        assert_eq!(request.price, None);
        assert_eq!(request.order_type, OrderType::Market);
    }
}
