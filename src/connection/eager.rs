//! Startup connection: the network connector always, the wallet when it was
//! used last time.

use alloy::primitives::Address;
use thiserror::Error;

use crate::blockchain::{BlockchainClient, BlockchainConfig, BlockchainError, BlockchainResult, Wallet};
use crate::chains::{Chain, ChainError, ChainRegistry};
use crate::config::MarketConfig;
use crate::connection::session::{Connector, Session, SessionStore};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),
}

/// The active chain, its client and the wallet, if any.
#[derive(Debug, Clone)]
pub struct Connection {
    pub chain: Chain,
    pub client: BlockchainClient,
    pub wallet: Option<Wallet>,
}

impl Connection {
    /// Connected account. `None` in read-only sessions.
    pub fn account(&self) -> Option<Address> {
        self.wallet.as_ref().map(Wallet::address)
    }

    pub fn connector(&self) -> Connector {
        if self.wallet.is_some() {
            Connector::LocalKey
        } else {
            Connector::Network
        }
    }

    /// Activate another supported chain, keeping the wallet, and remember it.
    pub fn switch_chain(
        &mut self,
        chain_id: u64,
        registry: &ChainRegistry,
        config: &BlockchainConfig,
        session: &SessionStore,
    ) -> Result<(), ConnectionError> {
        let chain = registry.get(chain_id)?.clone();
        let client = activate(&chain, config, self.wallet.as_ref())?;
        tracing::info!(from = %self.chain.chain_id, to = %chain.chain_id, "Switched chain");

        self.chain = chain;
        self.client = client;
        persist(session, self.connector(), chain_id);
        Ok(())
    }
}

/// Connect with the wallet from `YAM_PRIVATE_KEY`.
pub fn connect_eagerly(
    config: &MarketConfig,
    registry: &ChainRegistry,
    session: &SessionStore,
) -> Result<Connection, ConnectionError> {
    connect_with(config, registry, session, Wallet::from_env)
}

/// [`connect_eagerly`] with an explicit wallet source.
pub fn connect_with<F>(
    config: &MarketConfig,
    registry: &ChainRegistry,
    session: &SessionStore,
    load_wallet: F,
) -> Result<Connection, ConnectionError>
where
    F: FnOnce() -> BlockchainResult<Wallet>,
{
    let last = match session.load() {
        Ok(last) => last,
        Err(e) => {
            tracing::warn!(path = %session.path().display(), error = %e, "Ignoring unreadable session");
            None
        }
    };

    let chain = match last.map(|s| registry.get(s.chain_id)) {
        Some(Ok(chain)) => chain,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Last session chain unavailable, using default");
            registry.get(config.network.default_chain_id)?
        }
        None => registry.get(config.network.default_chain_id)?,
    };

    let mut connection = Connection {
        client: activate(chain, &config.blockchain, None)?,
        chain: chain.clone(),
        wallet: None,
    };

    let wants_wallet =
        config.connection.eager_wallet || last.map(|s| s.connector) == Some(Connector::LocalKey);
    if wants_wallet {
        match load_wallet() {
            Ok(wallet) => {
                connection.client = connection.client.with_wallet(&wallet);
                connection.wallet = Some(wallet);
                persist(session, Connector::LocalKey, chain.chain_id.as_u64());
            }
            Err(e) => tracing::debug!(error = %e, "Eager wallet connection failed, staying read-only"),
        }
    }

    tracing::info!(
        chain_id = %connection.chain.chain_id,
        chain = connection.chain.chain_name,
        account = ?connection.account(),
        "Connected"
    );
    Ok(connection)
}

fn activate(
    chain: &Chain,
    config: &BlockchainConfig,
    wallet: Option<&Wallet>,
) -> BlockchainResult<BlockchainClient> {
    let client = BlockchainClient::new(
        chain.chain_id.as_u64(),
        &chain.rpc_url,
        &chain.failover_urls,
        config.clone(),
    )?;
    Ok(match wallet {
        Some(wallet) => client.with_wallet(wallet),
        None => client,
    })
}

fn persist(store: &SessionStore, connector: Connector, chain_id: u64) {
    if let Err(e) = store.save(&Session {
        connector,
        chain_id,
    }) {
        tracing::warn!(path = %store.path().display(), error = %e, "Failed to save session");
    }
}
