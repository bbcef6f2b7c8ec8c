//! Supported networks.

pub mod currencies;
pub mod registry;

pub use currencies::{Currency, DAI, ETH};
pub use registry::{
    Chain, ChainError, ChainId, ChainRegistry, ContractId, ContractInfo, ZERO_ADDRESS,
};
