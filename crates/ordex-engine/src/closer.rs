//! Position closing.
//!
//! Reads the open position for a symbol and feeds an opposite-side market
//! intent through the normal submission pipeline, so closes get the same
//! signing, retry, and audit treatment as any other order.

use crate::error::{EngineError, EngineResult};
use crate::submit::OrderSubmitter;
use ordex_core::{OrderIntent, SubmissionResult};
use ordex_exchange::{canonical_query, position_risk_params, Clock, SystemClock};
use tracing::info;

/// Closes the open position on a symbol with a market order.
pub struct PositionCloser<C: Clock = SystemClock> {
    submitter: OrderSubmitter<C>,
}

impl<C: Clock> PositionCloser<C> {
    pub fn new(submitter: OrderSubmitter<C>) -> Self {
        Self { submitter }
    }

    /// Looks up the position and submits the flattening market order.
    ///
    /// A long position closes with a sell, a short with a buy, sized to the
    /// absolute open quantity. A flat or absent position is an error: there
    /// is nothing to close and sending a market order anyway would open one.
    pub async fn close(&self, symbol: &str) -> EngineResult<SubmissionResult> {
        self.submitter.ensure_fresh_clock().await?;

        let params = position_risk_params(
            symbol,
            self.submitter.clock.timestamp_ms(),
            self.submitter.config.recv_window_ms,
        );
        let request = self.submitter.signed_request(canonical_query(&params))?;

        let entries = self.submitter.api.position_risk(request).await?;
        let position = entries
            .into_iter()
            .map(|entry| entry.into_position())
            .find(|position| position.symbol == symbol && !position.is_flat())
            .ok_or_else(|| EngineError::NoPosition(symbol.to_string()))?;

        let side = position
            .closing_side()
            .ok_or_else(|| EngineError::NoPosition(symbol.to_string()))?;
        info!(
            symbol,
            quantity = %position.quantity,
            entry_price = %position.entry_price,
            closing_side = %side,
            "closing position"
        );

        let intent = OrderIntent::market(symbol, side, position.size());
        self.submitter.submit(&intent).await
    }
}
