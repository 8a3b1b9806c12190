//! Exchange error types and retry classification.

use thiserror::Error;

/// What the retry loop should do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Not retryable: bad signature, unknown symbol, insufficient balance,
    /// structural rejection.
    Fatal,
    /// Retryable after backoff: connect failure, throttling, server error.
    Transient,
    /// Retryable after a clock resync: signed timestamp fell outside the
    /// exchange's acceptance window.
    TimestampWindow,
    /// Request may have reached the exchange but the response was lost.
    /// Retryable only with the identical client order ID.
    Ambiguous,
}

/// Errors from the exchange contract layer.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Missing or empty credentials, unusable client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Could not reach the exchange (DNS, connect, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// Request sent but no response within the per-request timeout.
    #[error("request timed out")]
    Timeout,

    /// Request-rate throttling (HTTP 429, or 418 after repeated violations).
    #[error("rate limited (HTTP {status})")]
    RateLimited { status: u16 },

    /// Server-side failure (HTTP 5xx).
    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// Exchange rejected the request with a coded error body.
    #[error("exchange rejection {code}: {message}")]
    Rejected { code: i64, message: String },

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Parse(String),

    /// Anything else on the HTTP path (client build failure, unexpected status).
    #[error("http error: {0}")]
    Http(String),
}

/// Exchange error codes the retry loop dispatches on.
mod codes {
    /// Timestamp outside the recvWindow acceptance window.
    pub const TIMESTAMP_OUT_OF_WINDOW: i64 = -1021;
    /// Internal disconnect between gateway and engine.
    pub const DISCONNECTED: i64 = -1001;
    /// Request weight exceeded.
    pub const TOO_MANY_REQUESTS: i64 = -1003;
    /// Matching engine overloaded.
    pub const SERVER_BUSY: i64 = -1008;
}

impl ExchangeError {
    /// Classify this failure for the retry state machine.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Network(_) | Self::RateLimited { .. } | Self::Server { .. } => {
                FailureClass::Transient
            }
            Self::Timeout => FailureClass::Ambiguous,
            Self::Rejected { code, .. } => match *code {
                codes::TIMESTAMP_OUT_OF_WINDOW => FailureClass::TimestampWindow,
                codes::DISCONNECTED | codes::TOO_MANY_REQUESTS | codes::SERVER_BUSY => {
                    FailureClass::Transient
                }
                _ => FailureClass::Fatal,
            },
            Self::Config(_) | Self::Parse(_) | Self::Http(_) => FailureClass::Fatal,
        }
    }
}
