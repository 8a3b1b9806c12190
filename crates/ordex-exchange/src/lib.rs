//! Exchange REST contract for the ordex engine.
//!
//! # Key Components
//!
//! - [`ClockSync`]: Local-to-server clock offset state, safe for concurrent reads
//! - [`RequestSigner`]: Canonical query string construction and HMAC-SHA256 signing
//! - [`ExchangeApi`]: Dyn-compatible trait over the three endpoints the engine
//!   consumes (server time, place order, position risk)
//! - [`BinanceFuturesClient`]: reqwest-based implementation of [`ExchangeApi`]
//! - [`ExchangeError`]: Failure taxonomy with retry classification

pub mod client;
pub mod clock;
pub mod error;
pub mod signer;

pub use client::{
    BinanceFuturesClient, BoxFuture, ExchangeApi, OrderAck, PositionRisk, ScriptedExchangeApi,
    ServerTimeResponse, SignedRequest,
};
pub use clock::{Clock, ClockSync, SystemClock};
pub use error::{ExchangeError, FailureClass};
pub use signer::{canonical_query, order_params, position_risk_params, Credentials, RequestSigner};
