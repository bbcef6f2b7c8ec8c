//! Read side of the exchange contract, abstracted for the poller.

use alloy::primitives::Address;
use std::future::Future;

use crate::blockchain::BlockchainResult;
use crate::offers::types::{OnChainOffer, TokenMetadata};

/// Everything a poll pass reads from the chain.
pub trait OfferSource: Send + Sync {
    /// Ids carried by `OfferDeleted` events.
    fn deleted_offer_ids(&self) -> impl Future<Output = BlockchainResult<Vec<u64>>> + Send;

    /// Ids carried by `OfferCreated` events.
    fn created_offer_ids(&self) -> impl Future<Output = BlockchainResult<Vec<u64>>> + Send;

    /// Number of offers ever created; ids run from 0 to count - 1.
    fn offer_count(&self) -> impl Future<Output = BlockchainResult<u64>> + Send;

    fn show_offer(&self, id: u64) -> impl Future<Output = BlockchainResult<OnChainOffer>> + Send;

    fn token_metadata(
        &self,
        token: Address,
    ) -> impl Future<Output = BlockchainResult<TokenMetadata>> + Send;

    /// Whether the source can still reach the chain. Checked after a failed pass.
    fn is_healthy(&self) -> impl Future<Output = bool> + Send {
        async { true }
    }
}
