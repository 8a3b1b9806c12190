//! Core domain types for the ordex order execution engine.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `OrderIntent`: One logical order to be placed, with its idempotency token
//! - `OrderSide`, `OrderType`, `TimeInForce`: Trading enums in exchange wire form
//! - `Position`: Read-only snapshot of an open futures position
//! - `SubmissionResult`: Terminal outcome of one submission run

pub mod error;
pub mod execution;
pub mod order;
pub mod position;

pub use error::{CoreError, Result};
pub use execution::{SubmissionResult, SubmissionStatus};
pub use order::{ClientOrderId, OrderIntent, OrderSide, OrderType, TimeInForce};
pub use position::Position;
