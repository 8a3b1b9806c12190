//! Engine error taxonomy.

use crate::validate::ValidationError;
use ordex_exchange::ExchangeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Structural order-shape violation, caught before any network call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Server time unavailable and no cached offset to fall back on.
    #[error("time sync failed: {0}")]
    TimeSync(String),

    /// Close requested on a flat position. Reported, not retried.
    #[error("no open position for {0}")]
    NoPosition(String),

    /// Exchange-layer failure that escaped the retry loop
    /// (configuration, signing, malformed responses).
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
}

pub type EngineResult<T> = Result<T, EngineError>;
