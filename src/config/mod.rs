//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! yam-market.toml (or $YAM_CONFIG, or --config)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MarketConfig (validated, immutable)
//!     → chain registry overrides, poller, connection bootstrap
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; a missing file is a valid configuration
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    BlockchainConfig, ChainOverride, ConnectionConfig, MarketConfig, NetworkConfig,
    ObservabilityConfig, PollerConfig, RetryConfig,
};
