//! Audit record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle point an audit record marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptEvent {
    /// An attempt is about to be sent.
    AttemptStarted,
    /// The attempt failed retryably; another follows after the given delay.
    Retrying,
    /// The run reached a terminal status.
    Terminal,
}

/// One line of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub client_order_id: String,
    pub attempt: u32,
    pub event: AttemptEvent,
    /// Free-form context: outcome, error detail, backoff delay.
    pub detail: String,
}

impl AttemptRecord {
    fn new(client_order_id: &str, attempt: u32, event: AttemptEvent, detail: String) -> Self {
        Self {
            timestamp: Utc::now(),
            client_order_id: client_order_id.to_string(),
            attempt,
            event,
            detail,
        }
    }

    pub fn attempt_started(client_order_id: &str, attempt: u32) -> Self {
        Self::new(
            client_order_id,
            attempt,
            AttemptEvent::AttemptStarted,
            String::new(),
        )
    }

    pub fn retrying(client_order_id: &str, attempt: u32, delay_ms: u64, error: &str) -> Self {
        Self::new(
            client_order_id,
            attempt,
            AttemptEvent::Retrying,
            format!("delay_ms={delay_ms} error={error}"),
        )
    }

    pub fn terminal(client_order_id: &str, attempt: u32, detail: impl Into<String>) -> Self {
        Self::new(client_order_id, attempt, AttemptEvent::Terminal, detail.into())
    }
}
