//! Terminal outcome of one submission run.

use serde::{Deserialize, Serialize};

/// Terminal status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Exchange acknowledged the order.
    Acknowledged,
    /// Exchange rejected the order for a non-retryable cause.
    Rejected,
    /// Retry budget or overall deadline exhausted on transient failures.
    ExhaustedRetries,
    /// Operator interrupt aborted the run.
    Cancelled,
}

impl SubmissionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Acknowledged)
    }
}

/// What one submission run ended with.
///
/// Carries enough detail (last error, attempt count) to diagnose a failure
/// without re-running at elevated log levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    /// Exchange order ID, present when acknowledged.
    pub order_id: Option<u64>,
    /// Number of attempts performed (including the successful one).
    pub attempts: u32,
    /// Last error code/message when not acknowledged.
    pub last_error: Option<String>,
}

impl SubmissionResult {
    pub fn acknowledged(order_id: u64, attempts: u32) -> Self {
        Self {
            status: SubmissionStatus::Acknowledged,
            order_id: Some(order_id),
            attempts,
            last_error: None,
        }
    }

    pub fn rejected(attempts: u32, last_error: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Rejected,
            order_id: None,
            attempts,
            last_error: Some(last_error.into()),
        }
    }

    pub fn exhausted(attempts: u32, last_error: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::ExhaustedRetries,
            order_id: None,
            attempts,
            last_error: Some(last_error.into()),
        }
    }

    pub fn cancelled(attempts: u32) -> Self {
        Self {
            status: SubmissionStatus::Cancelled,
            order_id: None,
            attempts,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledged_is_success() {
        let result = SubmissionResult::acknowledged(42, 1);
        assert!(result.status.is_success());
        assert_eq!(result.order_id, Some(42));
        assert!(result.last_error.is_none());
    }

    #[test]
    fn test_exhausted_keeps_last_error() {
        let result = SubmissionResult::exhausted(3, "HTTP 503");
        assert!(!result.status.is_success());
        assert_eq!(result.attempts, 3);
        assert_eq!(result.last_error.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&SubmissionStatus::ExhaustedRetries).unwrap();
        assert_eq!(json, r#""EXHAUSTED_RETRIES""#);
    }
}
