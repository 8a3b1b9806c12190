//! Open position snapshot.

use crate::order::OrderSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of one futures position, fetched on demand.
///
/// `quantity` is signed: positive = long, negative = short, zero = flat.
/// Never cached across invocations; the closer acts on the snapshot it read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
}

impl Position {
    pub fn new(symbol: impl Into<String>, quantity: Decimal, entry_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            entry_price,
        }
    }

    /// Whether there is nothing to close.
    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Direction of the position, if any.
    pub fn side(&self) -> Option<OrderSide> {
        if self.quantity.is_zero() {
            None
        } else if self.quantity > Decimal::ZERO {
            Some(OrderSide::Buy)
        } else {
            Some(OrderSide::Sell)
        }
    }

    /// Side of the order that offsets this position (long -> SELL, short -> BUY).
    pub fn closing_side(&self) -> Option<OrderSide> {
        self.side().map(|s| s.opposite())
    }

    /// Unsigned position size.
    pub fn size(&self) -> Decimal {
        self.quantity.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_long_position_closes_with_sell() {
        let pos = Position::new("BTCUSDT", dec!(0.5), dec!(100000));
        assert_eq!(pos.side(), Some(OrderSide::Buy));
        assert_eq!(pos.closing_side(), Some(OrderSide::Sell));
        assert_eq!(pos.size(), dec!(0.5));
    }

    #[test]
    fn test_short_position_closes_with_buy() {
        let pos = Position::new("BTCUSDT", dec!(-0.5), dec!(100000));
        assert_eq!(pos.side(), Some(OrderSide::Sell));
        assert_eq!(pos.closing_side(), Some(OrderSide::Buy));
        assert_eq!(pos.size(), dec!(0.5));
    }

    #[test]
    fn test_flat_position() {
        let pos = Position::new("BTCUSDT", Decimal::ZERO, Decimal::ZERO);
        assert!(pos.is_flat());
        assert_eq!(pos.side(), None);
        assert_eq!(pos.closing_side(), None);
    }
}
