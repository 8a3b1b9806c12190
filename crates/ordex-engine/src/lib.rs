//! Order execution engine.
//!
//! One invocation carries one logical order intent to a terminal outcome:
//!
//! 1. [`validate`] gates the intent structurally, before any network call
//! 2. [`OrderSubmitter`] signs with a drift-compensated timestamp and drives
//!    the retry state machine (fatal / transient / timestamp-window /
//!    ambiguous), reusing the intent's client order ID across retries so the
//!    exchange de-duplicates instead of double-filling
//! 3. [`PositionCloser`] is the alternate entry path: it reads the open
//!    position and feeds an opposite-side market intent through the same
//!    pipeline
//!
//! The engine owns no I/O formatting; attempt lifecycle goes to an injected
//! [`ordex_audit::AuditSink`] and the exchange is reached through the
//! injected [`ordex_exchange::ExchangeApi`].

pub mod closer;
pub mod error;
pub mod submit;
pub mod validate;

pub use closer::PositionCloser;
pub use error::{EngineError, EngineResult};
pub use submit::{OrderSubmitter, SubmitConfig};
pub use validate::{validate, ValidationError};
