//! Exchange contract client.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::{BlockNumberOrTag, Filter, Log, TransactionRequest};
use alloy::sol_types::{SolCall, SolEvent};
use dashmap::DashMap;
use std::sync::Arc;

use crate::blockchain::{BlockchainClient, BlockchainError, BlockchainResult};
use crate::chains::{Chain, ChainError, ContractId};
use crate::contracts::abi::{IERC20Permit, IRealTokenYamUpgradeable as Yam, IERC20};
use crate::offers::{OfferSource, OnChainOffer, TokenMetadata};

/// Token permit versions fall back to this when `version()` is not implemented.
pub const DEFAULT_PERMIT_VERSION: &str = "1";

/// Reads and writes against one deployment of the exchange.
#[derive(Clone, Debug)]
pub struct YamContract {
    client: BlockchainClient,
    address: Address,
    from_block: u64,
    /// Blocks per `eth_getLogs` request; 0 queries the whole range at once.
    log_chunk_blocks: u64,
    tokens: Arc<DashMap<Address, TokenMetadata>>,
}

impl YamContract {
    pub fn new(client: BlockchainClient, address: Address, from_block: u64) -> Self {
        Self {
            client,
            address,
            from_block,
            log_chunk_blocks: 0,
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Locate the deployment on `chain`.
    pub fn for_chain(client: BlockchainClient, chain: &Chain) -> Result<Self, ChainError> {
        let (address, from_block) = chain.contract(ContractId::RealTokenYamUpgradeable)?;
        Ok(Self::new(client, address, from_block))
    }

    pub fn with_log_chunk_blocks(mut self, blocks: u64) -> Self {
        self.log_chunk_blocks = blocks;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    async fn read<C: SolCall>(&self, to: Address, call: C) -> BlockchainResult<C::Return> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        let data = self.client.call(&tx).await?;
        C::abi_decode_returns(&data)
            .map_err(|e| BlockchainError::Decode(format!("{}: {}", C::SIGNATURE, e)))
    }

    async fn event_logs<E: SolEvent>(&self) -> BlockchainResult<Vec<Log>> {
        let base = Filter::new()
            .address(self.address)
            .event_signature(E::SIGNATURE_HASH);

        if self.log_chunk_blocks == 0 {
            let filter = base
                .from_block(self.from_block)
                .to_block(BlockNumberOrTag::Latest);
            return self.client.get_logs(&filter).await;
        }

        let latest = self.client.get_block_number().await?;
        let mut logs = Vec::new();
        for (from, to) in block_chunks(self.from_block, latest, self.log_chunk_blocks) {
            let filter = base.clone().from_block(from).to_block(to);
            logs.extend(self.client.get_logs(&filter).await?);
        }
        Ok(logs)
    }

    /// Offer ids carried by logs of event `E`; undecodable logs are skipped.
    async fn event_offer_ids<E, F>(&self, offer_id: F) -> BlockchainResult<Vec<u64>>
    where
        E: SolEvent,
        F: Fn(&E) -> U256,
    {
        let logs = self.event_logs::<E>().await?;
        let ids = logs
            .iter()
            .filter_map(|log| match log.log_decode::<E>() {
                Ok(decoded) => u64::try_from(offer_id(&decoded.inner.data)).ok(),
                Err(e) => {
                    tracing::warn!(event = E::SIGNATURE, error = %e, "Undecodable log");
                    None
                }
            })
            .collect();
        Ok(ids)
    }

    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> BlockchainResult<U256> {
        self.read(token, IERC20::allowanceCall { owner, spender }).await
    }

    pub async fn token_decimals(&self, token: Address) -> BlockchainResult<u8> {
        Ok(self.cached_metadata(token).await?.decimals)
    }

    pub async fn permit_nonce(&self, token: Address, owner: Address) -> BlockchainResult<U256> {
        self.read(token, IERC20Permit::noncesCall { owner }).await
    }

    /// EIP-712 domain version of a permit token.
    pub async fn permit_version(&self, token: Address) -> String {
        match self.read(token, IERC20Permit::versionCall {}).await {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!(token = %token, error = %e, "No version(), using default");
                DEFAULT_PERMIT_VERSION.to_string()
            }
        }
    }

    /// Broadcast `createOfferWithPermit` through the client's signing provider.
    pub async fn submit_offer(
        &self,
        call: Yam::createOfferWithPermitCall,
    ) -> BlockchainResult<TxHash> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(call.abi_encode());
        self.client.send_transaction(tx).await
    }

    async fn cached_metadata(&self, token: Address) -> BlockchainResult<TokenMetadata> {
        if let Some(hit) = self.tokens.get(&token) {
            return Ok(hit.value().clone());
        }
        let name = self.read(token, IERC20::nameCall {}).await?;
        let decimals = self.read(token, IERC20::decimalsCall {}).await?;
        let metadata = TokenMetadata { name, decimals };
        self.tokens.insert(token, metadata.clone());
        Ok(metadata)
    }
}

impl OfferSource for YamContract {
    async fn deleted_offer_ids(&self) -> BlockchainResult<Vec<u64>> {
        self.event_offer_ids::<Yam::OfferDeleted, _>(|e| e.offerId).await
    }

    async fn created_offer_ids(&self) -> BlockchainResult<Vec<u64>> {
        self.event_offer_ids::<Yam::OfferCreated, _>(|e| e.offerId).await
    }

    async fn offer_count(&self) -> BlockchainResult<u64> {
        let count = self.read(self.address, Yam::getOfferCountCall {}).await?;
        u64::try_from(count).map_err(|_| BlockchainError::Decode(format!("offer count {count}")))
    }

    async fn show_offer(&self, id: u64) -> BlockchainResult<OnChainOffer> {
        let offer = self
            .read(self.address, Yam::showOfferCall { offerId: U256::from(id) })
            .await?;
        Ok(OnChainOffer {
            offer_token: offer.offerToken,
            buyer_token: offer.buyerToken,
            seller: offer.seller,
            buyer: offer.buyer,
            price: offer.price,
            amount: offer.amount,
        })
    }

    async fn token_metadata(&self, token: Address) -> BlockchainResult<TokenMetadata> {
        self.cached_metadata(token).await
    }

    async fn is_healthy(&self) -> bool {
        self.client.is_healthy().await
    }
}

/// Inclusive `[from, to]` ranges of at most `size` blocks covering `start..=end`.
fn block_chunks(start: u64, end: u64, size: u64) -> Vec<(u64, u64)> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut from = start;
    while from <= end {
        let to = from.saturating_add(size - 1).min(end);
        chunks.push((from, to));
        if to == u64::MAX {
            break;
        }
        from = to + 1;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::ChainRegistry;
    use crate::config::BlockchainConfig;

    #[test]
    fn test_block_chunks() {
        assert_eq!(block_chunks(10, 25, 10), vec![(10, 19), (20, 25)]);
        assert_eq!(block_chunks(10, 10, 10), vec![(10, 10)]);
        assert!(block_chunks(11, 10, 10).is_empty());
    }

    #[test]
    fn test_for_chain_requires_deployment() {
        let registry = ChainRegistry::builtin();
        let client =
            BlockchainClient::new(100, "http://127.0.0.1:1", &[], BlockchainConfig::default())
                .unwrap();
        let err = YamContract::for_chain(client, registry.get(100).unwrap()).unwrap_err();
        assert!(matches!(err, ChainError::ContractNotDeployed { .. }));

        let client =
            BlockchainClient::new(5, "http://127.0.0.1:1", &[], BlockchainConfig::default())
                .unwrap();
        let yam = YamContract::for_chain(client, registry.get(5).unwrap()).unwrap();
        assert_eq!(yam.from_block, 7_385_668);
    }
}
