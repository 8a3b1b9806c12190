//! Order-related types and identifiers.
//!
//! Provides order side, type, time-in-force, and client order ID types.
//! Enum serialization matches the exchange wire format (SCREAMING_CASE).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for position calculations).
    pub fn sign(&self) -> i8 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type.
///
/// The exchange calls a futures stop-limit order `STOP`; `wire_name()`
/// returns the exact string the order endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order, executed at the current price.
    Market,
    /// Limit order, rests until filled or cancelled.
    Limit,
    /// Stop-limit order: becomes a limit order once the stop price is crossed.
    StopLimit,
}

impl OrderType {
    /// Name of the type on the order endpoint.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopLimit => "STOP",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
        }
    }
}

/// Time-in-force for resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[default]
    #[serde(rename = "GTC")]
    GoodTilCancelled,
    /// Immediate-or-cancel.
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Fill-or-kill.
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoodTilCancelled => write!(f, "GTC"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
            Self::FillOrKill => write!(f, "FOK"),
        }
    }
}

/// Client order ID for idempotency.
///
/// Every submission run carries exactly one cloid; retries after a network
/// failure resubmit the same value so the exchange de-duplicates instead of
/// creating a second order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `ordex_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().to_string()[..8];
        Self(format!("ordex_{ts}_{uuid_short}"))
    }

    /// Create from an existing string (for parsing responses).
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientOrderId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for ClientOrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One logical order to be placed.
///
/// Shape invariants (price present iff the type requires it, positive
/// quantity) are enforced by the engine's validator before any network call,
/// not by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Instrument identifier (e.g., "BTCUSDT").
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Base-asset quantity. Must be positive.
    pub quantity: Decimal,
    /// Limit price. Required for Limit and StopLimit.
    pub price: Option<Decimal>,
    /// Trigger price. Required for StopLimit.
    pub stop_price: Option<Decimal>,
    /// Required for Limit and StopLimit.
    pub time_in_force: Option<TimeInForce>,
    /// Idempotency token, constant across retries of this intent.
    pub client_order_id: ClientOrderId,
}

impl OrderIntent {
    /// Market order intent.
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: None,
            client_order_id: ClientOrderId::new(),
        }
    }

    /// Limit order intent (GTC).
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: Some(TimeInForce::GoodTilCancelled),
            client_order_id: ClientOrderId::new(),
        }
    }

    /// Stop-limit order intent (GTC).
    pub fn stop_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        stop_price: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::StopLimit,
            quantity,
            price: Some(price),
            stop_price: Some(stop_price),
            time_in_force: Some(TimeInForce::GoodTilCancelled),
            client_order_id: ClientOrderId::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn test_order_side_sign() {
        assert_eq!(OrderSide::Buy.sign(), 1);
        assert_eq!(OrderSide::Sell.sign(), -1);
    }

    #[test]
    fn test_stop_limit_wire_name() {
        assert_eq!(OrderType::StopLimit.wire_name(), "STOP");
        assert_eq!(OrderType::Market.wire_name(), "MARKET");
    }

    #[test]
    fn test_client_order_id_unique() {
        let id1 = ClientOrderId::new();
        let id2 = ClientOrderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_client_order_id_format() {
        let id = ClientOrderId::new();
        assert!(id.as_str().starts_with("ordex_"));
    }

    #[test]
    fn test_market_intent_shape() {
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(0.001));
        assert_eq!(intent.order_type, OrderType::Market);
        assert!(intent.price.is_none());
        assert!(intent.stop_price.is_none());
        assert!(intent.time_in_force.is_none());
    }

    #[test]
    fn test_stop_limit_intent_shape() {
        let intent =
            OrderIntent::stop_limit("BTCUSDT", OrderSide::Buy, dec!(0.001), dec!(109000), dec!(108500));
        assert_eq!(intent.price, Some(dec!(108500)));
        assert_eq!(intent.stop_price, Some(dec!(109000)));
        assert_eq!(intent.time_in_force, Some(TimeInForce::GoodTilCancelled));
    }
}
