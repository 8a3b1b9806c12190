//! Command-line argument parsing.

use crate::error::{AppError, AppResult};
use clap::{ArgGroup, Parser};
use ordex_core::{OrderIntent, OrderSide};
use ordex_exchange::Credentials;
use rust_decimal::Decimal;

/// Order execution against the exchange futures API.
///
/// Exactly one action per invocation: --market, --limit, --stop-limit, or
/// --close.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group = ArgGroup::new("action").required(true))]
pub struct Args {
    /// API key (falls back to ORDEX_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// API secret (falls back to ORDEX_API_SECRET)
    #[arg(long)]
    pub api_secret: Option<String>,

    /// Trading symbol, e.g. BTCUSDT
    #[arg(long)]
    pub symbol: String,

    /// Order side: BUY or SELL (ignored by --close)
    #[arg(long, value_parser = parse_side)]
    pub side: Option<OrderSide>,

    /// Order quantity in base asset units (ignored by --close)
    #[arg(long)]
    pub quantity: Option<Decimal>,

    /// Place a market order
    #[arg(long, group = "action")]
    pub market: bool,

    /// Place a limit order at the given price
    #[arg(long, group = "action", value_name = "PRICE")]
    pub limit: Option<Decimal>,

    /// Place a stop-limit order: trigger price, then limit price
    #[arg(long, group = "action", num_args = 2, value_names = ["STOP_PRICE", "PRICE"])]
    pub stop_limit: Option<Vec<Decimal>>,

    /// Close the open position on the symbol with a market order
    #[arg(long, group = "action")]
    pub close: bool,

    /// Configuration file path (can also be set via ORDEX_CONFIG env var)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Target the testnet endpoint
    #[arg(long)]
    pub testnet: bool,
}

/// What one invocation does.
#[derive(Debug, Clone)]
pub enum Action {
    Place(OrderIntent),
    Close { symbol: String },
}

fn parse_side(value: &str) -> Result<OrderSide, String> {
    match value.to_ascii_uppercase().as_str() {
        "BUY" => Ok(OrderSide::Buy),
        "SELL" => Ok(OrderSide::Sell),
        other => Err(format!("invalid side {other:?}, expected BUY or SELL")),
    }
}

impl Args {
    /// Resolves the action, building the order intent for placement paths.
    pub fn action(&self) -> AppResult<Action> {
        if self.close {
            return Ok(Action::Close {
                symbol: self.symbol.clone(),
            });
        }

        let side = self
            .side
            .ok_or_else(|| AppError::Config("--side is required to place an order".to_string()))?;
        let quantity = self.quantity.ok_or_else(|| {
            AppError::Config("--quantity is required to place an order".to_string())
        })?;

        let intent = if self.market {
            OrderIntent::market(&self.symbol, side, quantity)
        } else if let Some(price) = self.limit {
            OrderIntent::limit(&self.symbol, side, quantity, price)
        } else if let Some(prices) = &self.stop_limit {
            OrderIntent::stop_limit(&self.symbol, side, quantity, prices[0], prices[1])
        } else {
            // clap's action group guarantees one flag is present.
            return Err(AppError::Config("no action specified".to_string()));
        };

        Ok(Action::Place(intent))
    }

    /// Resolves credentials: flags first, environment second.
    pub fn credentials(&self) -> AppResult<Credentials> {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("ORDEX_API_KEY").ok())
            .ok_or_else(|| {
                AppError::Config("API key missing: pass --api-key or set ORDEX_API_KEY".to_string())
            })?;
        let api_secret = self
            .api_secret
            .clone()
            .or_else(|| std::env::var("ORDEX_API_SECRET").ok())
            .ok_or_else(|| {
                AppError::Config(
                    "API secret missing: pass --api-secret or set ORDEX_API_SECRET".to_string(),
                )
            })?;

        Ok(Credentials::new(api_key, api_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordex_core::OrderType;
    use rust_decimal_macros::dec;

    fn base_args() -> Vec<&'static str> {
        vec!["ordex", "--symbol", "BTCUSDT", "--side", "BUY", "--quantity", "0.001"]
    }

    #[test]
    fn test_market_action() {
        let mut argv = base_args();
        argv.push("--market");
        let args = Args::try_parse_from(argv).unwrap();

        match args.action().unwrap() {
            Action::Place(intent) => {
                assert_eq!(intent.order_type, OrderType::Market);
                assert_eq!(intent.quantity, dec!(0.001));
                assert!(intent.price.is_none());
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_stop_limit_takes_trigger_then_price() {
        let mut argv = base_args();
        argv.extend(["--stop-limit", "109000", "108500"]);
        let args = Args::try_parse_from(argv).unwrap();

        match args.action().unwrap() {
            Action::Place(intent) => {
                assert_eq!(intent.order_type, OrderType::StopLimit);
                assert_eq!(intent.stop_price, Some(dec!(109000)));
                assert_eq!(intent.price, Some(dec!(108500)));
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_close_needs_no_side_or_quantity() {
        let args =
            Args::try_parse_from(["ordex", "--symbol", "ETHUSDT", "--close"]).unwrap();
        match args.action().unwrap() {
            Action::Close { symbol } => assert_eq!(symbol, "ETHUSDT"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_exactly_one_action_enforced() {
        let mut argv = base_args();
        argv.extend(["--market", "--close"]);
        assert!(Args::try_parse_from(argv).is_err());

        assert!(Args::try_parse_from(["ordex", "--symbol", "BTCUSDT"]).is_err());
    }

    #[test]
    fn test_placement_without_side_is_rejected() {
        let args = Args::try_parse_from([
            "ordex", "--symbol", "BTCUSDT", "--quantity", "1", "--market",
        ])
        .unwrap();
        assert!(matches!(args.action(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_side_is_case_insensitive() {
        assert_eq!(parse_side("sell").unwrap(), OrderSide::Sell);
        assert_eq!(parse_side("BUY").unwrap(), OrderSide::Buy);
        assert!(parse_side("HOLD").is_err());
    }
}
