//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Contract read:
//!     → client.rs (per-call timeout, failover across RPC endpoints)
//!     → On failure: retries.rs (retry with backoff.rs delays)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Retries only for reads; broadcasts are sent once

pub mod backoff;
pub mod retries;

pub use retries::{retry_async, RetryPolicy};
