//! Contract bindings.
//!
//! ABIs are declared with `sol!` and encoded by hand into `eth_call` /
//! transaction payloads so every request goes through [`BlockchainClient`]'s
//! timeouts and failover.
//!
//! [`BlockchainClient`]: crate::blockchain::BlockchainClient

pub mod abi;
pub mod yam;

pub use yam::{YamContract, DEFAULT_PERMIT_VERSION};
