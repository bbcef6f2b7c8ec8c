//! RealToken YAM market client library

pub mod blockchain;
pub mod chains;
pub mod config;
pub mod connection;
pub mod contracts;
pub mod lifecycle;
pub mod notifications;
pub mod observability;
pub mod offers;
pub mod permit;
pub mod resilience;
pub mod sell;
pub mod units;

pub use config::schema::MarketConfig;
pub use lifecycle::Shutdown;
