//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from `yam-market.toml`.
//! Every section has defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the market client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MarketConfig {
    /// Network selection and per-chain overrides.
    pub network: NetworkConfig,

    /// RPC timeouts and confirmation policy.
    pub blockchain: BlockchainConfig,

    /// Offer polling settings.
    pub poller: PollerConfig,

    /// Wallet connection settings.
    pub connection: ConnectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Chain used when no previous session exists.
    pub default_chain_id: u64,

    /// Overrides applied on top of the built-in chain table.
    pub chains: Vec<ChainOverride>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            default_chain_id: 100,
            chains: Vec::new(),
        }
    }
}

/// Per-chain override of the built-in registry.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ChainOverride {
    /// Chain to override; must be one of the supported chains.
    pub chain_id: u64,

    /// Replacement primary RPC URL.
    pub rpc_url: Option<String>,

    /// Additional RPC URLs tried when the primary fails.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Address of the exchange contract on this chain.
    pub yam_address: Option<String>,

    /// First block scanned for exchange events.
    pub from_block: Option<u64>,
}

/// Blockchain RPC settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of blocks (including the mined one) before a transaction is confirmed.
    pub confirmation_blocks: u32,

    /// How long to wait for a submitted transaction before giving up, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_ms: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 300,
            receipt_poll_ms: 2000,
        }
    }
}

/// Offer polling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds between two full polls.
    pub interval_secs: u64,

    /// Blocks per `eth_getLogs` request; 0 fetches the whole history in one request.
    /// Public RPC endpoints usually cap the range of a single query.
    pub log_chunk_blocks: u64,

    /// Retry policy for each contract read.
    pub retry: RetryConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            log_chunk_blocks: 0,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 4000,
        }
    }
}

/// Wallet connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Where the last active connector and chain are remembered.
    pub session_path: String,

    /// Try to load the local wallet even when the last session was read-only.
    pub eager_wallet: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            session_path: "yam-session.json".to_string(),
            eager_wallet: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "yam_market=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
