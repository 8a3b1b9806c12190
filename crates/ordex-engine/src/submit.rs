//! Retrying, idempotent order submission.
//!
//! Per attempt: ensure the clock offset is fresh, rebuild the canonical
//! request with a new timestamp but the same client order ID, sign, send,
//! classify. Fatal rejections terminate immediately; timestamp-window
//! rejections force a clock resync; transient and ambiguous failures retry
//! under exponential backoff with jitter until the attempt budget or the
//! overall deadline runs out. Ambiguous failures (response lost) are safe to
//! retry only because the client order ID is identical, so the exchange
//! de-duplicates.

use crate::error::{EngineError, EngineResult};
use crate::validate::validate;
use ordex_audit::{AttemptRecord, AuditSink};
use ordex_core::{OrderIntent, SubmissionResult};
use ordex_exchange::{
    canonical_query, order_params, Clock, ClockSync, ExchangeApi, FailureClass, RequestSigner,
    SignedRequest, SystemClock,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Retry and timing knobs for one submission run.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    /// Backoff base delay; doubles per retry.
    pub base_delay: Duration,
    /// Backoff cap.
    pub max_delay: Duration,
    /// Hard ceiling on the whole run, backoff sleeps included.
    pub overall_deadline: Duration,
    /// recvWindow sent with every signed request.
    pub recv_window_ms: u64,
    /// Resync the clock offset when older than this.
    pub clock_max_age: Duration,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            overall_deadline: Duration::from_secs(60),
            recv_window_ms: 5000,
            clock_max_age: Duration::from_secs(30),
        }
    }
}

enum RetryWait {
    Continue,
    DeadlineExpired,
    Cancelled,
}

/// Drives one order intent to a terminal outcome.
pub struct OrderSubmitter<C: Clock = SystemClock> {
    pub(crate) api: Arc<dyn ExchangeApi>,
    pub(crate) signer: Arc<RequestSigner>,
    pub(crate) clock: Arc<ClockSync<C>>,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) config: SubmitConfig,
    cancel: CancellationToken,
}

impl<C: Clock> Clone for OrderSubmitter<C> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            signer: Arc::clone(&self.signer),
            clock: Arc::clone(&self.clock),
            audit: Arc::clone(&self.audit),
            config: self.config.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<C: Clock> OrderSubmitter<C> {
    pub fn new(
        api: Arc<dyn ExchangeApi>,
        signer: Arc<RequestSigner>,
        clock: Arc<ClockSync<C>>,
        audit: Arc<dyn AuditSink>,
        config: SubmitConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            signer,
            clock,
            audit,
            config,
            cancel,
        }
    }

    /// Fetches server time and records the offset.
    ///
    /// When the fetch fails but an offset is already cached, degrades to the
    /// stale offset with a warning; with no cache the failure is fatal.
    pub async fn sync_clock(&self) -> EngineResult<i64> {
        match self.api.server_time().await {
            Ok(server_ms) => Ok(self.clock.record_server_time(server_ms)),
            Err(e) if self.clock.has_synced() => {
                warn!(%e, offset_ms = self.clock.offset_ms(), "time sync failed, using stale offset");
                Ok(self.clock.offset_ms())
            }
            Err(e) => Err(EngineError::TimeSync(e.to_string())),
        }
    }

    pub(crate) async fn ensure_fresh_clock(&self) -> EngineResult<()> {
        if self.clock.is_stale(self.config.clock_max_age) {
            let offset = self.sync_clock().await?;
            debug!(offset_ms = offset, "clock offset refreshed");
        }
        Ok(())
    }

    pub(crate) fn signed_request(&self, query: String) -> EngineResult<SignedRequest> {
        let signature = self.signer.sign(&query)?;
        Ok(SignedRequest { query, signature })
    }

    /// Validates and submits one intent, returning its terminal outcome.
    ///
    /// Validation and configuration problems surface as errors before any
    /// order reaches the wire; everything past that point is folded into the
    /// returned [`SubmissionResult`].
    pub async fn submit(&self, intent: &OrderIntent) -> EngineResult<SubmissionResult> {
        validate(intent)?;

        let cloid = intent.client_order_id.as_str();
        let deadline = Instant::now() + self.config.overall_deadline;
        let mut last_error = String::new();
        let mut attempt = 0;

        while attempt < self.config.max_attempts {
            attempt += 1;
            self.ensure_fresh_clock().await?;

            // Re-timestamped every attempt; the client order ID never changes.
            let params = order_params(intent, self.clock.timestamp_ms(), self.config.recv_window_ms);
            let request = self.signed_request(canonical_query(&params))?;

            self.audit.record(&AttemptRecord::attempt_started(cloid, attempt));
            debug!(cloid, attempt, "sending order");

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    warn!(cloid, attempt, "submission cancelled by operator");
                    self.audit.record(&AttemptRecord::terminal(cloid, attempt, "CANCELLED"));
                    return Ok(SubmissionResult::cancelled(attempt));
                }
                _ = tokio::time::sleep_until(deadline) => {
                    warn!(cloid, attempt, "overall deadline expired mid-flight");
                    self.audit.record(&AttemptRecord::terminal(cloid, attempt, "EXHAUSTED deadline"));
                    return Ok(SubmissionResult::exhausted(attempt, "overall deadline exceeded"));
                }
                result = self.api.place_order(request) => result,
            };

            let err = match outcome {
                Ok(ack) => {
                    info!(cloid, order_id = ack.order_id, attempts = attempt, "order acknowledged");
                    self.audit.record(&AttemptRecord::terminal(cloid, attempt, "ACKNOWLEDGED"));
                    return Ok(SubmissionResult::acknowledged(ack.order_id, attempt));
                }
                Err(err) => err,
            };

            last_error = err.to_string();
            match err.class() {
                FailureClass::Fatal => {
                    warn!(cloid, attempt, %err, "order rejected, not retrying");
                    self.audit
                        .record(&AttemptRecord::terminal(cloid, attempt, format!("REJECTED {err}")));
                    return Ok(SubmissionResult::rejected(attempt, last_error));
                }
                FailureClass::TimestampWindow => {
                    // The fix is a resync, not elapsed time; skip the backoff.
                    warn!(cloid, attempt, "timestamp outside acceptance window, resyncing");
                    self.audit
                        .record(&AttemptRecord::retrying(cloid, attempt, 0, &last_error));
                    self.sync_clock().await?;
                }
                FailureClass::Transient | FailureClass::Ambiguous => {
                    if attempt >= self.config.max_attempts {
                        break;
                    }
                    let delay = self.backoff_delay(attempt);
                    warn!(cloid, attempt, %err, delay_ms = delay.as_millis() as u64, "retrying after backoff");
                    self.audit.record(&AttemptRecord::retrying(
                        cloid,
                        attempt,
                        delay.as_millis() as u64,
                        &last_error,
                    ));

                    match self.wait_before_retry(delay, deadline).await {
                        RetryWait::Continue => {}
                        RetryWait::DeadlineExpired => {
                            self.audit
                                .record(&AttemptRecord::terminal(cloid, attempt, "EXHAUSTED deadline"));
                            return Ok(SubmissionResult::exhausted(attempt, "overall deadline exceeded"));
                        }
                        RetryWait::Cancelled => {
                            self.audit.record(&AttemptRecord::terminal(cloid, attempt, "CANCELLED"));
                            return Ok(SubmissionResult::cancelled(attempt));
                        }
                    }
                }
            }
        }

        warn!(cloid, attempts = attempt, last_error = %last_error, "retry budget exhausted");
        self.audit
            .record(&AttemptRecord::terminal(cloid, attempt, format!("EXHAUSTED {last_error}")));
        Ok(SubmissionResult::exhausted(attempt, last_error))
    }

    /// Exponential backoff, capped, with up to +25% random jitter.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .config
            .base_delay
            .saturating_mul(1u32 << (attempt - 1).min(16))
            .min(self.config.max_delay);
        let jitter = rand::thread_rng().gen_range(0.0..0.25);
        exp.mul_f64(1.0 + jitter)
    }

    async fn wait_before_retry(&self, delay: Duration, deadline: Instant) -> RetryWait {
        tokio::select! {
            _ = self.cancel.cancelled() => RetryWait::Cancelled,
            _ = tokio::time::sleep_until(deadline) => RetryWait::DeadlineExpired,
            _ = tokio::time::sleep(delay) => RetryWait::Continue,
        }
    }
}
