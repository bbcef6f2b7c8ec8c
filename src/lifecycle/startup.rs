//! Startup shared by the daemon and the CLI.
//!
//! Configuration is loaded before logging exists, so its own messages are only
//! visible at the default level.

use std::path::Path;
use thiserror::Error;

use crate::chains::{ChainError, ChainRegistry};
use crate::config::{load_or_default, ConfigError, MarketConfig};
use crate::connection::{connect_eagerly, Connection, ConnectionError, SessionStore};
use crate::observability::{init_logging, LogTarget};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Everything built before connecting.
#[derive(Debug, Clone)]
pub struct Startup {
    pub config: MarketConfig,
    pub registry: ChainRegistry,
    pub session: SessionStore,
}

/// Load configuration, install logging and build the chain registry.
pub fn prepare(config_path: Option<&Path>, target: LogTarget) -> Result<Startup, StartupError> {
    let config = load_or_default(config_path)?;
    init_logging(&config.observability, target);

    let mut registry = ChainRegistry::builtin();
    registry.apply_overrides(&config.network.chains)?;
    let session = SessionStore::new(&config.connection.session_path);

    tracing::debug!(
        default_chain_id = config.network.default_chain_id,
        chains = ?registry.allowed_chains(),
        session = %session.path().display(),
        "Startup prepared"
    );
    Ok(Startup {
        config,
        registry,
        session,
    })
}

impl Startup {
    /// Eager connection, then a switch to `chain` when it differs from the
    /// restored one.
    pub fn connect(&self, chain: Option<u64>) -> Result<Connection, ConnectionError> {
        let mut connection = connect_eagerly(&self.config, &self.registry, &self.session)?;
        if let Some(chain_id) = chain {
            if chain_id != connection.chain.chain_id.as_u64() {
                connection.switch_chain(
                    chain_id,
                    &self.registry,
                    &self.config.blockchain,
                    &self.session,
                )?;
            }
        }
        Ok(connection)
    }
}
