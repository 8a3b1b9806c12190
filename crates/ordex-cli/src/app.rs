//! Application wiring.
//!
//! Builds the client, signer, clock, and audit sink from config plus
//! credentials, hooks Ctrl-C into a cancellation token, and drives the chosen
//! action to its outcome.

use crate::cli::Action;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use ordex_audit::{AuditSink, JsonLinesAuditSink, NullAuditSink};
use ordex_core::{SubmissionResult, SubmissionStatus};
use ordex_engine::{OrderSubmitter, PositionCloser};
use ordex_exchange::{BinanceFuturesClient, ClockSync, Credentials, ExchangeApi, RequestSigner};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main application.
pub struct Application {
    submitter: OrderSubmitter,
    cancel: CancellationToken,
}

impl Application {
    /// Wire up the execution pipeline against the chosen endpoint.
    pub fn new(config: &AppConfig, credentials: Credentials, testnet: bool) -> AppResult<Self> {
        let endpoint = config.endpoint(testnet);
        info!(endpoint, testnet, "connecting");

        let api: Arc<dyn ExchangeApi> = Arc::new(BinanceFuturesClient::new(
            endpoint,
            credentials.api_key(),
            config.request_timeout(),
        )?);
        let signer = Arc::new(RequestSigner::new(credentials));
        let clock = Arc::new(ClockSync::with_system_clock());

        let audit: Arc<dyn AuditSink> = match &config.audit_dir {
            Some(dir) => Arc::new(JsonLinesAuditSink::new(dir.as_str())),
            None => Arc::new(NullAuditSink),
        };

        let cancel = CancellationToken::new();
        let submitter = OrderSubmitter::new(
            api,
            signer,
            clock,
            audit,
            config.submit_config(),
            cancel.clone(),
        );

        Ok(Self { submitter, cancel })
    }

    /// Cancel the run on Ctrl-C. In-flight attempts stop at the next await.
    pub fn install_signal_handler(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    warn!("interrupt received, cancelling");
                    cancel.cancel();
                }
                Err(e) => error!(%e, "failed to listen for interrupt"),
            }
        });
    }

    /// Syncs the clock once before any order leaves the process.
    pub async fn startup(&self) -> AppResult<()> {
        let offset = self.submitter.sync_clock().await?;
        info!(offset_ms = offset, "clock synchronized with server");
        Ok(())
    }

    /// Runs the action to its terminal outcome.
    pub async fn run(&self, action: Action) -> AppResult<SubmissionResult> {
        let result = match action {
            Action::Place(intent) => {
                info!(
                    symbol = %intent.symbol,
                    side = %intent.side,
                    order_type = ?intent.order_type,
                    quantity = %intent.quantity,
                    cloid = intent.client_order_id.as_str(),
                    "placing order"
                );
                self.submitter.submit(&intent).await?
            }
            Action::Close { symbol } => {
                let closer = PositionCloser::new(self.submitter.clone());
                closer.close(&symbol).await?
            }
        };

        report(&result);
        Ok(result)
    }
}

fn report(result: &SubmissionResult) {
    match result.status {
        SubmissionStatus::Acknowledged => {
            info!(
                order_id = result.order_id,
                attempts = result.attempts,
                "order acknowledged"
            );
        }
        SubmissionStatus::Rejected => {
            error!(
                attempts = result.attempts,
                last_error = result.last_error.as_deref().unwrap_or(""),
                "order rejected"
            );
        }
        SubmissionStatus::ExhaustedRetries => {
            error!(
                attempts = result.attempts,
                last_error = result.last_error.as_deref().unwrap_or(""),
                "retries exhausted"
            );
        }
        SubmissionStatus::Cancelled => {
            warn!(attempts = result.attempts, "submission cancelled");
        }
    }
}

/// Non-success outcomes exit non-zero for scripting.
pub fn exit_error(result: &SubmissionResult) -> Option<AppError> {
    if result.status.is_success() {
        None
    } else {
        Some(AppError::OrderFailed(format!(
            "{:?} after {} attempt(s): {}",
            result.status,
            result.attempts,
            result.last_error.as_deref().unwrap_or("interrupted")
        )))
    }
}
