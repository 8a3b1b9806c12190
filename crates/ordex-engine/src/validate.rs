//! Structural order validation.
//!
//! Purely local checks, evaluated in a fixed order with the first failure
//! winning. This gate exists to avoid spending a rate-limited API call on a
//! request the exchange would reject deterministically.
//!
//! The numeric relationship between `stopPrice` and `price` on stop-limit
//! orders is exchange-defined and differs by side and working type, so only
//! presence and positivity are checked here; the exchange's own rejection
//! covers the inequality.

use ordex_core::{OrderIntent, OrderType};
use rust_decimal::Decimal;
use thiserror::Error;

/// Why an intent failed the structural gate.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("symbol must be non-empty")]
    InvalidSymbol,

    #[error("market orders must not carry price or stopPrice")]
    UnexpectedPrice,

    #[error("price is required and must be positive")]
    MissingPrice,

    #[error("stopPrice is required and must be positive")]
    MissingStopPrice,

    #[error("timeInForce is required")]
    MissingTimeInForce,
}

fn positive(value: Option<Decimal>) -> bool {
    matches!(value, Some(v) if v > Decimal::ZERO)
}

/// Validates an order intent. Rules are evaluated in order; the first
/// failure wins.
pub fn validate(intent: &OrderIntent) -> Result<(), ValidationError> {
    if intent.quantity <= Decimal::ZERO {
        return Err(ValidationError::InvalidQuantity);
    }
    if intent.symbol.is_empty() {
        return Err(ValidationError::InvalidSymbol);
    }

    match intent.order_type {
        OrderType::Market => {
            if intent.price.is_some() || intent.stop_price.is_some() {
                return Err(ValidationError::UnexpectedPrice);
            }
        }
        OrderType::Limit => {
            if !positive(intent.price) {
                return Err(ValidationError::MissingPrice);
            }
            if intent.time_in_force.is_none() {
                return Err(ValidationError::MissingTimeInForce);
            }
        }
        OrderType::StopLimit => {
            if !positive(intent.price) {
                return Err(ValidationError::MissingPrice);
            }
            if !positive(intent.stop_price) {
                return Err(ValidationError::MissingStopPrice);
            }
            if intent.time_in_force.is_none() {
                return Err(ValidationError::MissingTimeInForce);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordex_core::{OrderSide, TimeInForce};
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_market_intent() {
        let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(0.001));
        assert_eq!(validate(&intent), Ok(()));
    }

    #[test]
    fn test_zero_and_negative_quantity() {
        for quantity in [Decimal::ZERO, dec!(-1)] {
            let intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, quantity);
            assert_eq!(validate(&intent), Err(ValidationError::InvalidQuantity));
        }
    }

    #[test]
    fn test_quantity_checked_before_symbol() {
        let intent = OrderIntent::market("", OrderSide::Buy, Decimal::ZERO);
        assert_eq!(validate(&intent), Err(ValidationError::InvalidQuantity));
    }

    #[test]
    fn test_empty_symbol() {
        let intent = OrderIntent::market("", OrderSide::Buy, dec!(1));
        assert_eq!(validate(&intent), Err(ValidationError::InvalidSymbol));
    }

    #[test]
    fn test_market_rejects_any_price() {
        let mut intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(1));
        intent.price = Some(dec!(50000));
        assert_eq!(validate(&intent), Err(ValidationError::UnexpectedPrice));

        let mut intent = OrderIntent::market("BTCUSDT", OrderSide::Buy, dec!(1));
        intent.stop_price = Some(dec!(50000));
        assert_eq!(validate(&intent), Err(ValidationError::UnexpectedPrice));
    }

    #[test]
    fn test_limit_missing_price() {
        let mut intent = OrderIntent::limit("BTCUSDT", OrderSide::Buy, dec!(1), dec!(50000));
        intent.price = None;
        assert_eq!(validate(&intent), Err(ValidationError::MissingPrice));

        intent.price = Some(Decimal::ZERO);
        assert_eq!(validate(&intent), Err(ValidationError::MissingPrice));
    }

    #[test]
    fn test_limit_missing_time_in_force() {
        let mut intent = OrderIntent::limit("BTCUSDT", OrderSide::Buy, dec!(1), dec!(50000));
        intent.time_in_force = None;
        assert_eq!(validate(&intent), Err(ValidationError::MissingTimeInForce));
    }

    #[test]
    fn test_stop_limit_missing_stop_price() {
        let mut intent = OrderIntent::stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            dec!(0.001),
            dec!(109000),
            dec!(108500),
        );
        intent.stop_price = None;
        assert_eq!(validate(&intent), Err(ValidationError::MissingStopPrice));
    }

    #[test]
    fn test_stop_limit_price_reported_before_stop_price() {
        let mut intent = OrderIntent::stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            dec!(0.001),
            dec!(109000),
            dec!(108500),
        );
        intent.price = None;
        intent.stop_price = None;
        assert_eq!(validate(&intent), Err(ValidationError::MissingPrice));
    }

    #[test]
    fn test_valid_stop_limit() {
        let intent = OrderIntent::stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            dec!(0.001),
            dec!(109000),
            dec!(108500),
        );
        assert_eq!(validate(&intent), Ok(()));
        assert_eq!(intent.time_in_force, Some(TimeInForce::GoodTilCancelled));
    }

    #[test]
    fn test_stop_inequality_not_enforced() {
        // stop above or below the limit price both pass the structural gate;
        // the exchange decides which shapes it accepts.
        let inverted = OrderIntent::stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            dec!(0.001),
            dec!(108000),
            dec!(109000),
        );
        assert_eq!(validate(&inverted), Ok(()));
    }
}
