//! Append-only attempt log for operator audit.
//!
//! Every submission attempt and terminal outcome is recorded as one JSON
//! line. The log is for the operator, never an input to recovery logic.

pub mod error;
pub mod record;
pub mod writer;

pub use error::{AuditError, AuditResult};
pub use record::{AttemptEvent, AttemptRecord};
pub use writer::{AuditSink, JsonLinesAuditSink, NullAuditSink};
