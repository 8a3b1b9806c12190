//! Command-line order execution.
//!
//! One invocation performs one action against the exchange futures API:
//! place a market, limit, or stop-limit order, or close the open position on
//! a symbol. Credentials come from flags or the environment, never from the
//! config file.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;

pub use app::Application;
pub use cli::{Action, Args};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
