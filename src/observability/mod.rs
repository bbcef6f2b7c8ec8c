//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! poller, sell actions, RPC client:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout / stderr
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogTarget};
