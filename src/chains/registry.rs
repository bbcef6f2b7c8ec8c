//! Built-in table of supported networks and their exchange deployments.

use alloy::primitives::{address, Address, TxHash};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::chains::currencies::{Currency, DAI, ETH};
use crate::config::schema::ChainOverride;

/// Address used for "no buyer" (public offers) and unset fields.
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Networks the market is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(u64)]
pub enum ChainId {
    Ethereum = 0x01,
    Goerli = 0x05,
    Gnosis = 0x64,
}

impl ChainId {
    pub const ALL: [ChainId; 3] = [ChainId::Ethereum, ChainId::Goerli, ChainId::Gnosis];

    pub fn as_u64(self) -> u64 {
        self as u64
    }
}

impl TryFrom<u64> for ChainId {
    type Error = ChainError;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        ChainId::ALL
            .into_iter()
            .find(|c| c.as_u64() == id)
            .ok_or(ChainError::UnsupportedChain(id))
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),

    #[error("{contract:?} is not deployed on chain {chain}")]
    ContractNotDeployed { contract: ContractId, chain: ChainId },
}

/// Contracts the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ContractId {
    RealTokenYamUpgradeable,
}

/// Deployment of a contract on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractInfo {
    /// `None` until the contract is deployed (or configured) on that chain.
    pub address: Option<Address>,
    /// First block that can hold events of this contract.
    pub from_block: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chain {
    pub chain_id: ChainId,
    pub chain_name: &'static str,
    pub logo: &'static str,
    pub native_currency: Currency,
    pub rpc_url: String,
    pub failover_urls: Vec<String>,
    pub block_explorer_url: String,
    pub contracts: BTreeMap<ContractId, ContractInfo>,
}

impl Chain {
    /// Deployed address and start block of `contract`.
    pub fn contract(&self, contract: ContractId) -> Result<(Address, u64), ChainError> {
        self.contracts
            .get(&contract)
            .and_then(|info| info.address.map(|a| (a, info.from_block)))
            .ok_or(ChainError::ContractNotDeployed {
                contract,
                chain: self.chain_id,
            })
    }

    /// Explorer link for a transaction.
    pub fn tx_url(&self, hash: &TxHash) -> String {
        format!("{}tx/{}", self.block_explorer_url, hash)
    }
}

fn yam(address: Option<Address>, from_block: u64) -> BTreeMap<ContractId, ContractInfo> {
    BTreeMap::from([(
        ContractId::RealTokenYamUpgradeable,
        ContractInfo {
            address,
            from_block,
        },
    )])
}

/// Lookup table of supported chains.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<ChainId, Chain>,
}

impl ChainRegistry {
    /// The deployments known at build time.
    pub fn builtin() -> Self {
        let chains = [
            Chain {
                chain_id: ChainId::Gnosis,
                chain_name: "Gnosis Chain",
                logo: "gnosis.svg",
                native_currency: DAI,
                rpc_url: "https://rpc.ankr.com/gnosis".to_string(),
                failover_urls: Vec::new(),
                block_explorer_url: "https://gnosisscan.io/".to_string(),
                contracts: yam(None, 24_582_116),
            },
            Chain {
                chain_id: ChainId::Ethereum,
                chain_name: "Ethereum",
                logo: "ethereum.svg",
                native_currency: ETH,
                rpc_url: "https://rpc.ankr.com/eth".to_string(),
                failover_urls: Vec::new(),
                block_explorer_url: "https://etherscan.io/".to_string(),
                contracts: yam(None, 15_741_178),
            },
            Chain {
                chain_id: ChainId::Goerli,
                chain_name: "Goerli",
                logo: "ethereum.svg",
                native_currency: ETH,
                rpc_url: "https://rpc.ankr.com/eth_goerli".to_string(),
                failover_urls: Vec::new(),
                block_explorer_url: "https://goerli.etherscan.io/".to_string(),
                // v0.2.0 deployment
                contracts: yam(
                    Some(address!("BDAa060F27D00b9e135C005Ae5Ad0F51C8ba4FD9")),
                    7_385_668,
                ),
            },
        ];

        Self {
            chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
        }
    }

    /// Apply configuration overrides. Unknown chains and unparsable addresses are
    /// rejected by config validation before this is called.
    pub fn apply_overrides(&mut self, overrides: &[ChainOverride]) -> Result<(), ChainError> {
        for o in overrides {
            let id = ChainId::try_from(o.chain_id)?;
            let Some(chain) = self.chains.get_mut(&id) else {
                continue;
            };
            if let Some(url) = &o.rpc_url {
                chain.rpc_url = url.clone();
            }
            chain.failover_urls.extend(o.failover_urls.iter().cloned());

            let info = chain
                .contracts
                .entry(ContractId::RealTokenYamUpgradeable)
                .or_insert(ContractInfo {
                    address: None,
                    from_block: 0,
                });
            if let Some(address) = o.yam_address.as_deref().and_then(|a| a.parse().ok()) {
                info.address = Some(address);
            }
            if let Some(from_block) = o.from_block {
                info.from_block = from_block;
            }
            tracing::debug!(chain_id = %id, "Applied chain override");
        }
        Ok(())
    }

    pub fn get(&self, id: u64) -> Result<&Chain, ChainError> {
        let id = ChainId::try_from(id)?;
        self.chains.get(&id).ok_or(ChainError::UnsupportedChain(id.as_u64()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    /// Chain id → primary RPC URL.
    pub fn urls(&self) -> BTreeMap<u64, String> {
        self.chains
            .iter()
            .map(|(id, c)| (id.as_u64(), c.rpc_url.clone()))
            .collect()
    }

    /// Ids a connector may switch to, ascending.
    pub fn allowed_chains(&self) -> Vec<u64> {
        self.chains.keys().map(|id| id.as_u64()).collect()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
